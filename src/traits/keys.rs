//! Shared accessors for RSA public/private key components.
//!
//! The teacher crate expressed these as traits generic over a marker
//! `UnsignedModularInt` backend so the same code could run over primitive
//! ints, `crypto-bigint`, or `fixed-bigint`. This crate settles on
//! `num_bigint_dig::BigUint` as its one concrete backend (`../../DESIGN.md`
//! Open Question 1), so these traits are no longer generic over a backend
//! type.

use num_bigint_dig::BigUint;
use zeroize::Zeroize;

/// Components of an RSA public key.
pub trait PublicKeyParts {
    /// Returns the modulus of the key.
    fn n(&self) -> &BigUint;

    /// Returns the public exponent of the key.
    fn e(&self) -> &BigUint;

    /// Returns the modulus size in bytes (`k` in spec.md §3). Raw signatures
    /// and ciphertexts for or by this key have exactly this many bytes.
    fn size(&self) -> usize {
        (self.n().bits() as usize + 7) / 8
    }
}

/// Components of an RSA private key.
pub trait PrivateKeyParts: PublicKeyParts {
    /// Returns the private exponent of the key.
    fn d(&self) -> &BigUint;

    /// Returns the prime factors, `primes[1..u]` in spec.md §3 (`u >= 2`).
    fn primes(&self) -> &[BigUint];

    /// Returns the precomputed `dp` value, `d mod (p - 1)`.
    fn dp(&self) -> Option<&BigUint>;

    /// Returns the precomputed `dq` value, `d mod (q - 1)`.
    fn dq(&self) -> Option<&BigUint>;

    /// Returns the precomputed `qinv` value, `q^-1 mod p`.
    fn qinv(&self) -> Option<&BigUint>;

    /// Returns the CRT values for the third and subsequent primes, if any.
    fn crt_values(&self) -> Option<&[CrtValue]>;
}

/// Precomputed Chinese Remainder Theorem coefficients for the third and
/// subsequent primes (spec.md §3: `coefficients[i]` for `i > 2`).
///
/// The first two primes are handled separately (`qinv`) for historical,
/// interop-driven reasons that PKCS#1 keeps and this crate mirrors.
#[derive(Debug, Clone)]
pub struct CrtValue {
    /// `d mod (prime_i - 1)`.
    pub(crate) exp: BigUint,
    /// `R * coeff === 1 mod prime_i`.
    pub(crate) coeff: BigUint,
    /// Product of primes prior to this one (including the first two).
    pub(crate) r: BigUint,
}

impl Zeroize for CrtValue {
    fn zeroize(&mut self) {
        // `BigUint` itself has no `Zeroize` impl; drop the old heap buffers
        // by replacing them with a fresh owned zero value.
        self.exp = BigUint::default();
        self.coeff = BigUint::default();
        self.r = BigUint::default();
    }
}
