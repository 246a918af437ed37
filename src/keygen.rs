//! `KeyGen` — multi-prime key generation with resumable timeout (spec.md
//! §4.8).

use std::time::{Duration, Instant};

use num_bigint_dig::{BigUint, ModInverse, RandPrime};
use num_integer::Integer;
use num_traits::One;
use rand_core::CryptoRngCore;

use crate::algorithms::rsa::{carmichael_lambda, compute_modulus};
use crate::errors::{Error, Result};
use crate::key::RsaPrivateKey;

/// Default public exponent, 65537 (spec.md §4.8 step 1).
pub fn default_public_exponent() -> BigUint {
    BigUint::from(65537u32)
}

/// The `smallestPrime` configuration knob (spec.md §4.8 step 2), default
/// 4096 bits: above `2 * smallest_prime` total modulus size, generation
/// switches from two large primes to `bits / smallest_prime` smaller ones.
pub const DEFAULT_SMALLEST_PRIME: usize = 4096;

/// Resumable state for a key-generation run that hit its wall-clock budget
/// before completing (spec.md §4.8 step 4): the primes already accepted,
/// plus the parameters needed to keep generating with the same target.
#[derive(Debug, Clone)]
pub struct PartialKey {
    pub(crate) bits: usize,
    pub(crate) nprimes: usize,
    pub(crate) exp: BigUint,
    pub(crate) primes: Vec<BigUint>,
}

/// Outcome of a [`generate`] call: either a finished key pair, or generation
/// state to resume later with another [`generate`] call.
pub enum GenerateOutcome {
    Complete(RsaPrivateKey),
    Partial(PartialKey),
}

/// How many primes to use for a `bits`-sized modulus (spec.md §4.8 step 2).
fn prime_count_for_bits(bits: usize, smallest_prime: usize) -> usize {
    if bits / 2 > smallest_prime {
        (bits / smallest_prime).max(2)
    } else {
        2
    }
}

/// Per-prime target bit length for the `i`th of `nprimes` primes in a
/// `bits`-sized modulus, following the classic RSA generator's rule of
/// dividing the remaining budget across the remaining primes (spec.md §4.8
/// step 3) so the product meets the `2^(bits-1)` floor.
fn bit_length_for_prime(_bits: usize, nprimes: usize, index: usize, remaining_bits: usize) -> usize {
    remaining_bits / (nprimes - index)
}

/// Generates an RSA private key with `nprimes` prime factors and modulus
/// bit length `bits`, with no timeout and no resumable state. Convenience
/// wrapper over [`generate`] for the common case.
pub fn generate_multi_prime_key<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    nprimes: usize,
    bits: usize,
    exp: &BigUint,
) -> Result<RsaPrivateKey> {
    match generate(rng, bits, Some(exp.clone()), None, None, Some(nprimes))? {
        GenerateOutcome::Complete(key) => Ok(key),
        GenerateOutcome::Partial(_) => Err(Error::Internal),
    }
}

/// `KeyGen` (spec.md §4.8): generates a key of `bits` modulus size, honoring
/// an optional wall-clock `timeout` and an optional `partial` state to
/// resume from a prior timed-out call.
///
/// `nprimes` overrides the prime count derived from `smallest_prime`
/// (spec.md §4.8 step 2) when set; pass `None` to use the spec's own rule.
pub fn generate<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bits: usize,
    exp: Option<BigUint>,
    timeout: Option<Duration>,
    partial: Option<PartialKey>,
    nprimes: Option<usize>,
) -> Result<GenerateOutcome> {
    if bits < 8 {
        return Err(Error::TooFewPrimes);
    }

    let smallest_prime = DEFAULT_SMALLEST_PRIME;
    let exp = exp.unwrap_or_else(default_public_exponent);
    let target_nprimes =
        nprimes.unwrap_or_else(|| prime_count_for_bits(bits, smallest_prime));

    let deadline = timeout.map(|d| Instant::now() + d);

    let mut primes: Vec<BigUint> = match &partial {
        Some(p) => {
            if p.bits != bits || p.nprimes != target_nprimes || p.exp != exp {
                return Err(Error::InvalidArguments);
            }
            p.primes.clone()
        }
        None => Vec::with_capacity(target_nprimes),
    };

    'outer: loop {
        while primes.len() < target_nprimes {
            if let Some(dl) = deadline {
                if Instant::now() >= dl {
                    return Ok(GenerateOutcome::Partial(PartialKey {
                        bits,
                        nprimes: target_nprimes,
                        exp,
                        primes,
                    }));
                }
            }

            let used_bits: usize = primes.iter().map(|p| p.bits() as usize).sum();
            let remaining_bits = bits.saturating_sub(used_bits);
            let this_bits =
                bit_length_for_prime(bits, target_nprimes, primes.len(), remaining_bits).max(2);

            let candidate = rng.gen_prime(this_bits);
            if primes.iter().any(|p| p == &candidate) {
                continue;
            }
            primes.push(candidate);
        }

        // Verify the product meets the bit-length floor and e is coprime
        // with lambda(n); otherwise discard the last prime and retry
        // (spec.md §4.8 step 5).
        let n = compute_modulus(&primes);
        if n.bits() as usize != bits {
            primes.pop();
            continue 'outer;
        }

        let lambda = carmichael_lambda(&primes);
        if lambda.gcd(&exp) != BigUint::one() {
            primes.pop();
            continue 'outer;
        }

        let d = exp
            .mod_inverse(&lambda)
            .and_then(|v| v.to_biguint())
            .ok_or(Error::InvalidExponent)?;

        let key = RsaPrivateKey::from_components(n, exp, d, primes)?;
        return Ok(GenerateOutcome::Complete(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{PrivateKeyParts, PublicKeyParts};
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    #[test]
    fn generates_valid_two_prime_key() {
        let mut rng = ChaCha8Rng::from_seed([1; 32]);
        let key = generate_multi_prime_key(&mut rng, 2, 512, &BigUint::from(65537u32)).unwrap();
        assert_eq!(key.primes().len(), 2);
        assert!(key.n().bits() as usize >= 505);
        key.validate().unwrap();
    }

    #[test]
    fn timeout_of_zero_returns_partial_state() {
        let mut rng = ChaCha8Rng::from_seed([2; 32]);
        let outcome = generate(
            &mut rng,
            1024,
            Some(BigUint::from(65537u32)),
            Some(Duration::from_secs(0)),
            None,
            None,
        )
        .unwrap();
        assert!(matches!(outcome, GenerateOutcome::Partial(_)));
    }

    #[test]
    fn resuming_partial_state_completes() {
        let mut rng = ChaCha8Rng::from_seed([3; 32]);
        let partial = match generate(
            &mut rng,
            512,
            Some(BigUint::from(65537u32)),
            Some(Duration::from_nanos(1)),
            None,
            None,
        )
        .unwrap()
        {
            GenerateOutcome::Partial(p) => p,
            GenerateOutcome::Complete(_) => return, // generation was fast enough to finish already
        };

        let outcome = generate(
            &mut rng,
            512,
            Some(BigUint::from(65537u32)),
            None,
            Some(partial),
            None,
        )
        .unwrap();
        assert!(matches!(outcome, GenerateOutcome::Complete(_)));
    }
}
