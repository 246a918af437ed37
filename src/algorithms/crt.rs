//! `Crt` — CRT exponentiation with RSA blinding (spec.md §4.6).
//!
//! Decrypts/signs with the Chinese Remainder Theorem when prime factors are
//! available, falling back to a direct `x^d mod n` otherwise. Blinding is
//! applied whenever the public exponent is known, since it is the only case
//! in which `r^e` and `r^-1` can both be computed; this matches spec.md's
//! "blinding is skipped only when `publicExponent` is unavailable" rule.

use num_bigint_dig::{BigUint, ModInverse, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;

use crate::errors::{Error, Result};
use crate::key::RsaPrivateKey;
use crate::traits::{CrtValue, PrivateKeyParts, PublicKeyParts};

/// Picks a blinding factor `r` uniformly from `[1, min(primes) - 1]`, along
/// with `r^e mod n` and `r^-1 mod n`, or `None` if no public exponent is
/// available to compute `r^e`.
fn blinding_factors<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    key: &RsaPrivateKey,
) -> Option<(BigUint, BigUint, BigUint)> {
    let n = key.n();
    let e = key.e();
    if e.is_zero() {
        return None;
    }

    let smallest_prime = key.primes().iter().min()?;
    let lower = BigUint::one();
    let upper = smallest_prime - &lower;
    if upper < lower {
        return None;
    }

    let r = loop {
        let candidate = rng.gen_biguint_range(&lower, smallest_prime);
        if candidate.gcd(n).is_one() {
            break candidate;
        }
    };

    let r_inv = r.mod_inverse(n)?.to_biguint()?;
    let r_e = r.modpow(e, n);
    Some((r, r_e, r_inv))
}

/// Exponentiates `x` by the private exponent modulo `n`, per spec.md §4.6.
///
/// `disable_blinding` models the spec's `CRT_DISABLE_BLINDING` signal: when
/// set, step 1-2 blinding is skipped and each `m_i` is computed directly.
pub(crate) fn exponentiate<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    key: &RsaPrivateKey,
    x: &BigUint,
    disable_blinding: bool,
) -> Result<BigUint> {
    let n = key.n();
    if x >= n {
        return Err(Error::OutOfRange);
    }

    let primes = key.primes();
    if primes.len() < 2 {
        // No CRT material: direct exponentiation.
        return Ok(x.modpow(key.d(), n));
    }

    let blind = if disable_blinding {
        None
    } else {
        blinding_factors(rng, key)
    };

    let blinded_x = match &blind {
        Some((_, r_e, _)) => (x * r_e) % n,
        None => x.clone(),
    };

    let p = &primes[0];
    let q = &primes[1];
    let dp = key.dp().ok_or(Error::Internal)?;
    let dq = key.dq().ok_or(Error::Internal)?;
    let qinv = key.qinv().ok_or(Error::Internal)?;

    let m1 = (&blinded_x % p).modpow(dp, p);
    let m2 = (&blinded_x % q).modpow(dq, q);

    // Garner's algorithm, starting from the first two primes.
    let mut m = garner_step(&m1, &m2, qinv, p, q);
    let mut r_running = p * q;

    if let Some(crt_values) = key.crt_values() {
        for (crt, prime) in crt_values.iter().zip(primes[2..].iter()) {
            let mi = (&blinded_x % prime).modpow(&crt.exp, prime);
            let diff = sub_mod(&mi, &(&m % prime), prime);
            let h = (&diff * &crt.coeff) % prime;
            m += &r_running * h;
            r_running *= prime;
        }
    }

    match blind {
        Some((_, _, r_inv)) => Ok((&m * &r_inv) % n),
        None => Ok(m),
    }
}

/// `m2 + ((m1 - m2) * qinv mod p) * q`, computed without relying on signed
/// subtraction underflowing.
fn garner_step(m1: &BigUint, m2: &BigUint, qinv: &BigUint, p: &BigUint, q: &BigUint) -> BigUint {
    let h = (sub_mod(m1, m2, p) * qinv) % p;
    m2 + &h * q
}

/// `(a - b) mod m`, for `a, b < m`, without panicking on unsigned underflow.
fn sub_mod(a: &BigUint, b: &BigUint, m: &BigUint) -> BigUint {
    if a >= b {
        (a - b) % m
    } else {
        (m - (b - a)) % m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn test_key() -> RsaPrivateKey {
        // p=61, q=53, n=3233, e=17, d=2753.
        RsaPrivateKey::from_p_q(
            BigUint::from(61u32),
            BigUint::from(53u32),
            BigUint::from(17u32),
        )
        .unwrap()
    }

    #[test]
    fn crt_matches_direct_exponentiation() {
        let key = test_key();
        let mut rng = ChaCha8Rng::from_seed([1; 32]);

        for m in 0u32..20 {
            let x = BigUint::from(m);
            let direct = x.modpow(key.d(), key.n());
            let crt = exponentiate(&mut rng, &key, &x, true).unwrap();
            assert_eq!(direct, crt, "mismatch at m={m}");
        }
    }

    #[test]
    fn blinding_does_not_change_result() {
        let key = test_key();
        let mut rng = ChaCha8Rng::from_seed([2; 32]);

        let x = BigUint::from(42u32);
        let direct = x.modpow(key.d(), key.n());
        let blinded = exponentiate(&mut rng, &key, &x, false).unwrap();
        assert_eq!(direct, blinded);
    }

    #[test]
    fn rejects_out_of_range_input() {
        let key = test_key();
        let mut rng = ChaCha8Rng::from_seed([3; 32]);
        let x = key.n() + BigUint::one();
        assert_eq!(
            exponentiate(&mut rng, &key, &x, true),
            Err(Error::OutOfRange)
        );
    }
}
