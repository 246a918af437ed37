//! RSA key types: [`RsaPublicKey`], [`RsaPrivateKey`], and their CRT
//! precomputation (spec.md §3, §4.6, §4.7).

use core::hash::{Hash, Hasher};

use num_bigint_dig::{BigUint, ModInverse};
use num_integer::Integer;
use num_traits::{One, Zero};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{Error, Result};
use crate::traits::{CrtValue, PrivateKeyParts, PublicKeyParts};

/// Represents the public part of an RSA key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Modulus: product of the key's prime factors.
    pub(crate) n: BigUint,
    /// Public exponent: typically 0x10001 (65537).
    pub(crate) e: BigUint,
}

impl Hash for RsaPublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.n.to_bytes_be().hash(state);
        self.e.to_bytes_be().hash(state);
    }
}

/// Represents a whole RSA key, public and private parts.
#[derive(Debug, Clone)]
pub struct RsaPrivateKey {
    /// Public components of the private key.
    pubkey_components: RsaPublicKey,
    /// Private exponent.
    pub(crate) d: BigUint,
    /// Prime factors of `n`. Contains 2 or more elements (spec.md §3: `u >= 2`).
    pub(crate) primes: Vec<BigUint>,
    /// Precomputed values that speed up private-key operations.
    pub(crate) precomputed: Option<PrecomputedValues>,
}

impl Eq for RsaPrivateKey {}
impl PartialEq for RsaPrivateKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.pubkey_components == other.pubkey_components
            && self.d == other.d
            && self.primes == other.primes
    }
}

impl AsRef<RsaPublicKey> for RsaPrivateKey {
    fn as_ref(&self) -> &RsaPublicKey {
        &self.pubkey_components
    }
}

impl Drop for RsaPrivateKey {
    fn drop(&mut self) {
        self.d.zeroize();
        for p in self.primes.iter_mut() {
            p.zeroize();
        }
        self.precomputed.zeroize();
    }
}

impl ZeroizeOnDrop for RsaPrivateKey {}

/// CRT precomputation for a private key (spec.md §3's `exponents`/
/// `coefficients`).
#[derive(Debug, Clone)]
pub(crate) struct PrecomputedValues {
    /// `d mod (p - 1)`.
    pub(crate) dp: BigUint,
    /// `d mod (q - 1)`.
    pub(crate) dq: BigUint,
    /// `q^-1 mod p`.
    pub(crate) qinv: BigUint,

    /// CRT values for the 3rd and subsequent primes. Due to a historical
    /// accident, the CRT for the first two primes is handled differently in
    /// PKCS#1, and interoperability requires mirroring that.
    pub(crate) crt_values: Vec<CrtValue>,
}

impl Zeroize for PrecomputedValues {
    fn zeroize(&mut self) {
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
        for val in self.crt_values.iter_mut() {
            val.zeroize();
        }
    }
}

impl Drop for PrecomputedValues {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl PublicKeyParts for RsaPublicKey {
    fn n(&self) -> &BigUint {
        &self.n
    }

    fn e(&self) -> &BigUint {
        &self.e
    }
}

impl RsaPublicKey {
    /// Minimum value of the public exponent `e`.
    pub const MIN_PUB_EXPONENT: u64 = 2;

    /// Maximum value of the public exponent `e`.
    pub const MAX_PUB_EXPONENT: u64 = (1 << 33) - 1;

    /// Maximum size of the modulus `n` in bits.
    pub const MAX_SIZE: usize = 4096;

    /// Create a new public key from its components.
    ///
    /// This function accepts public keys with a modulus size up to 4096-bits,
    /// i.e. [`RsaPublicKey::MAX_SIZE`].
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        Self::new_with_max_size(n, e, Self::MAX_SIZE)
    }

    /// Create a new public key from its components, bounding the modulus to
    /// `max_size` bits.
    pub fn new_with_max_size(n: BigUint, e: BigUint, max_size: usize) -> Result<Self> {
        let k = Self { n, e };
        check_public_with_max_size(&k, max_size)?;
        Ok(k)
    }

    /// Create a new public key, bypassing checks around the modulus and
    /// public exponent size.
    ///
    /// This method is not recommended, and only intended for unusual use
    /// cases. Most applications should use [`RsaPublicKey::new`] or
    /// [`RsaPublicKey::new_with_max_size`] instead.
    pub fn new_unchecked(n: BigUint, e: BigUint) -> Self {
        Self { n, e }
    }
}

impl PublicKeyParts for RsaPrivateKey {
    fn n(&self) -> &BigUint {
        &self.pubkey_components.n
    }

    fn e(&self) -> &BigUint {
        &self.pubkey_components.e
    }
}

impl RsaPrivateKey {
    /// Default exponent for RSA keys.
    pub const EXP: u64 = 65537;

    /// Constructs an RSA key pair from individual components:
    ///
    /// - `n`: RSA modulus
    /// - `e`: public exponent (i.e. encrypting exponent)
    /// - `d`: private exponent (i.e. decrypting exponent)
    /// - `primes`: prime factors of `n`: typically two primes `p` and `q`.
    ///   More than two primes can be provided for multi-prime RSA, though
    ///   that is generally not recommended.
    pub fn from_components(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        primes: Vec<BigUint>,
    ) -> Result<Self> {
        if primes.len() < 2 {
            return Err(Error::NprimesTooSmall);
        }

        let pubkey_components = RsaPublicKey { n, e };
        let mut key = Self {
            pubkey_components,
            d,
            primes,
            precomputed: None,
        };
        key.precompute()?;
        key.validate()?;
        Ok(key)
    }

    /// Constructs an RSA key pair from its two primes `p` and `q`.
    ///
    /// This rebuilds the modulus and the private exponent using Euler's
    /// totient, per [NIST 800-56B §6.2.1].
    ///
    /// [NIST 800-56B §6.2.1]: https://nvlpubs.nist.gov/nistpubs/SpecialPublications/NIST.SP.800-56Br2.pdf#page=47
    pub fn from_p_q(p: BigUint, q: BigUint, public_exponent: BigUint) -> Result<Self> {
        if p == q {
            return Err(Error::InvalidPrime);
        }
        Self::from_primes(vec![p, q], public_exponent)
    }

    /// Constructs an RSA key pair from its primes.
    ///
    /// This rebuilds the modulus and the private exponent.
    pub fn from_primes(primes: Vec<BigUint>, public_exponent: BigUint) -> Result<Self> {
        if primes.len() < 2 {
            return Err(Error::NprimesTooSmall);
        }

        // Makes sure that primes is pairwise unequal.
        for (i, prime1) in primes.iter().enumerate() {
            for prime2 in primes.iter().take(i) {
                if prime1 == prime2 {
                    return Err(Error::InvalidPrime);
                }
            }
        }

        let n = crate::algorithms::rsa::compute_modulus(&primes);
        let d = crate::algorithms::rsa::compute_private_exponent_euler_totient(
            &primes,
            &public_exponent,
        )?;

        let mut key = Self {
            pubkey_components: RsaPublicKey {
                n,
                e: public_exponent,
            },
            d,
            primes,
            precomputed: None,
        };
        key.precompute()?;
        key.validate()?;
        Ok(key)
    }

    /// Get the public key from the private key, cloning `n` and `e`.
    pub fn to_public_key(&self) -> RsaPublicKey {
        self.pubkey_components.clone()
    }

    /// Performs some calculations to speed up private key operations.
    pub fn precompute(&mut self) -> Result<()> {
        if self.precomputed.is_some() {
            return Ok(());
        }

        let p = &self.primes[0];
        let q = &self.primes[1];

        let one = BigUint::one();
        let dp = &self.d % (p - &one);
        let dq = &self.d % (q - &one);
        let qinv = q
            .mod_inverse(p)
            .and_then(|v| v.to_biguint())
            .ok_or(Error::InvalidCoefficient)?;

        let mut crt_values = Vec::with_capacity(self.primes.len().saturating_sub(2));
        if self.primes.len() > 2 {
            let mut r = p * q;
            for prime in &self.primes[2..] {
                let exp = &self.d % (prime - &one);
                let coeff = r
                    .mod_inverse(prime)
                    .and_then(|v| v.to_biguint())
                    .ok_or(Error::InvalidCoefficient)?;
                crt_values.push(CrtValue {
                    exp,
                    coeff,
                    r: r.clone(),
                });
                r *= prime;
            }
        }

        self.precomputed = Some(PrecomputedValues {
            dp,
            dq,
            qinv,
            crt_values,
        });
        Ok(())
    }

    /// Clears precomputed values by setting them to `None`.
    pub fn clear_precomputed(&mut self) {
        self.precomputed = None;
    }

    /// Compute CRT coefficient: `(1/q) mod p`.
    pub fn crt_coefficient(&self) -> Option<BigUint> {
        self.primes[1]
            .mod_inverse(&self.primes[0])
            .and_then(|v| v.to_biguint())
    }

    /// Performs basic sanity checks on the key.
    ///
    /// Returns `Ok(())` if everything is good, otherwise an appropriate
    /// error.
    pub fn validate(&self) -> Result<()> {
        check_public(self)?;

        // Check that Πprimes == n.
        let one = BigUint::one();
        let mut m = BigUint::one();
        for prime in &self.primes {
            // Any primes <= 1 would cause divide-by-zero panics later.
            if *prime < one {
                return Err(Error::InvalidPrime);
            }
            m *= prime;
        }
        if m != self.pubkey_components.n {
            return Err(Error::InvalidModulus);
        }

        // Check that d*e === 1 mod (p_i - 1) for each prime. This implies
        // that e is coprime to each p_i - 1, hence coprime to
        // lcm(p_i - 1) = λ(n). It also implies a^(d*e) === a mod p_i for
        // all a coprime to p_i (by Fermat), hence a^(d*e) === a mod n.
        let de = self.e() * &self.d;
        for prime in &self.primes {
            let congruence = &de % (prime - &one);
            if !congruence.is_one() {
                return Err(Error::InvalidExponent);
            }
        }

        Ok(())
    }
}

impl PrivateKeyParts for RsaPrivateKey {
    fn d(&self) -> &BigUint {
        &self.d
    }

    fn primes(&self) -> &[BigUint] {
        &self.primes
    }

    fn dp(&self) -> Option<&BigUint> {
        self.precomputed.as_ref().map(|p| &p.dp)
    }

    fn dq(&self) -> Option<&BigUint> {
        self.precomputed.as_ref().map(|p| &p.dq)
    }

    fn qinv(&self) -> Option<&BigUint> {
        self.precomputed.as_ref().map(|p| &p.qinv)
    }

    fn crt_values(&self) -> Option<&[CrtValue]> {
        self.precomputed.as_ref().map(|p| p.crt_values.as_slice())
    }
}

/// Check that the public key is well formed and has an exponent within
/// acceptable bounds.
#[inline]
pub fn check_public(public_key: &impl PublicKeyParts) -> Result<()> {
    check_public_with_max_size(public_key, RsaPublicKey::MAX_SIZE)
}

/// Check that the public key is well formed and has an exponent within
/// acceptable bounds, for a caller-supplied maximum modulus size.
#[inline]
fn check_public_with_max_size(public_key: &impl PublicKeyParts, max_size: usize) -> Result<()> {
    if public_key.n().bits() as usize > max_size {
        return Err(Error::ModulusTooLarge);
    }

    if public_key.e() >= public_key.n() || public_key.n().is_even() {
        return Err(Error::InvalidModulus);
    }

    if public_key.e().is_even() {
        return Err(Error::InvalidExponent);
    }

    let e = public_key
        .e()
        .to_u64_digits()
        .first()
        .copied()
        .unwrap_or(0);
    let e_too_large = public_key.e().bits() > 64;

    if e_too_large || e > RsaPublicKey::MAX_PUB_EXPONENT {
        return Err(Error::PublicExponentTooLarge);
    }

    if e < RsaPublicKey::MIN_PUB_EXPONENT {
        return Err(Error::PublicExponentTooSmall);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_key() -> RsaPrivateKey {
        // p=61, q=53, n=3233, e=17, d=2753 (classic RSA textbook example).
        RsaPrivateKey::from_p_q(
            BigUint::from(61u32),
            BigUint::from(53u32),
            BigUint::from(17u32),
        )
        .unwrap()
    }

    #[test]
    fn from_p_q_computes_modulus_and_exponent() {
        let key = small_key();
        assert_eq!(key.n(), &BigUint::from(3233u32));
        assert_eq!(key.d(), &BigUint::from(2753u32));
    }

    #[test]
    fn validate_accepts_well_formed_key() {
        let key = small_key();
        assert!(key.validate().is_ok());
    }

    #[test]
    fn rejects_even_modulus() {
        let pubkey = RsaPublicKey::new_unchecked(BigUint::from(10u32), BigUint::from(3u32));
        assert_eq!(check_public(&pubkey), Err(Error::InvalidModulus));
    }

    #[test]
    fn rejects_even_exponent() {
        let pubkey = RsaPublicKey::new_unchecked(BigUint::from(11u32), BigUint::from(4u32));
        assert_eq!(check_public(&pubkey), Err(Error::InvalidExponent));
    }

    #[test]
    fn precompute_is_idempotent() {
        let mut key = small_key();
        key.precompute().unwrap();
        let dp_before = key.dp().cloned();
        key.precompute().unwrap();
        assert_eq!(key.dp().cloned(), dp_before);
    }
}
