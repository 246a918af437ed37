//! RSA primitives (spec.md §4.7): `RSAEP`/`RSADP`/`RSASP1`/`RSAVP1`, plus the
//! modulus/private-exponent arithmetic `RsaPrivateKey::from_primes` needs.

use num_bigint_dig::{BigUint, ModInverse};
use num_integer::Integer;
use num_traits::One;
use rand_core::CryptoRngCore;

use crate::errors::{Error, Result};
use crate::key::RsaPrivateKey;
use crate::traits::PublicKeyParts;

/// `RSAEP`/`RSAVP1`: `m^e mod n`. Rejects `m` outside `[0, n)` (spec.md §4.7).
#[inline]
pub(crate) fn rsa_encrypt(key: &impl PublicKeyParts, m: &BigUint) -> Result<BigUint> {
    if m >= key.n() {
        return Err(Error::OutOfRange);
    }
    Ok(m.modpow(key.e(), key.n()))
}

/// `RSADP`/`RSASP1`: exponentiates `c` by the private exponent, dispatching
/// to the CRT path when prime factors are available (spec.md §4.6/§4.7).
#[inline]
pub(crate) fn rsa_decrypt<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    key: &RsaPrivateKey,
    c: &BigUint,
) -> Result<BigUint> {
    super::crt::exponentiate(rng, key, c, false)
}

/// Compute the modulus of a key from its primes: `n = prod(primes)`.
pub(crate) fn compute_modulus(primes: &[BigUint]) -> BigUint {
    let mut n = BigUint::one();
    for prime in primes {
        n *= prime;
    }
    n
}

/// Compute the private exponent from its primes and public exponent via
/// Euler's totient `phi(n) = prod(p_i - 1)`.
#[inline]
pub(crate) fn compute_private_exponent_euler_totient(
    primes: &[BigUint],
    exp: &BigUint,
) -> Result<BigUint> {
    if primes.len() < 2 {
        return Err(Error::InvalidPrime);
    }

    let one = BigUint::one();
    let mut totient = BigUint::one();
    for prime in primes {
        totient *= prime - &one;
    }

    exp.mod_inverse(&totient)
        .and_then(|v| v.to_biguint())
        .ok_or(Error::InvalidExponent)
}

/// `lcm(a, b) = a * b / gcd(a, b)`.
pub(crate) fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    let g = a.gcd(b);
    (a / &g) * b
}

/// Carmichael function over an arbitrary set of pairwise-coprime primes:
/// `lambda(n) = lcm(p_i - 1)`.
pub(crate) fn carmichael_lambda(primes: &[BigUint]) -> BigUint {
    let one = BigUint::one();
    let mut lambda = BigUint::one();
    for prime in primes {
        lambda = lcm(&lambda, &(prime - &one));
    }
    lambda
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_modulus_from_primes() {
        let primes = vec![BigUint::from(61u32), BigUint::from(53u32)];
        assert_eq!(compute_modulus(&primes), BigUint::from(3233u32));
    }

    #[test]
    fn euler_totient_matches_textbook_example() {
        let primes = vec![BigUint::from(61u32), BigUint::from(53u32)];
        let d = compute_private_exponent_euler_totient(&primes, &BigUint::from(17u32)).unwrap();
        assert_eq!(d, BigUint::from(2753u32));
    }
}
