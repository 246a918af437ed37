//! `Pss` signature scheme (spec.md §4.4, RFC 3447 §8.1).

use rand_core::CryptoRngCore;

use crate::algorithms::pad::{os2ip, uint_to_be_pad};
use crate::algorithms::pss::{emsa_pss_encode, emsa_pss_verify};
use crate::algorithms::rsa::{rsa_decrypt, rsa_encrypt};
use crate::errors::{Error, Result};
use crate::hash::HashAlg;
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PublicKeyParts, SignatureScheme};

/// PSS signing/verification, with the hash (for `mHash`/`H`), MGF1 hash, and
/// salt length independently configurable (spec.md §3).
#[derive(Debug, Clone, Copy)]
pub struct Pss {
    pub hash_alg: HashAlg,
    pub salt_len: usize,
}

impl Pss {
    /// A new PSS scheme with `salt_len` defaulting to the hash's own output
    /// length, as spec.md §3 specifies ("`sLen` default = `hLen` when unset").
    pub fn new(hash_alg: HashAlg) -> Self {
        Self {
            hash_alg,
            salt_len: hash_alg.output_len(),
        }
    }

    pub fn new_with_salt_len(hash_alg: HashAlg, salt_len: usize) -> Self {
        Self { hash_alg, salt_len }
    }
}

impl SignatureScheme for Pss {
    fn sign<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        priv_key: &RsaPrivateKey,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        let k = priv_key.size();
        let em_bits = 8 * k - 1;
        let em = emsa_pss_encode(rng, message, em_bits, self.salt_len, self.hash_alg)?;
        let m = os2ip(&em);
        let mut blind_rng = rand::rngs::OsRng;
        let s = rsa_decrypt(&mut blind_rng, priv_key, &m).map_err(|_| Error::Internal)?;
        uint_to_be_pad(&s, k)
    }

    fn verify(&self, pub_key: &RsaPublicKey, message: &[u8], sig: &[u8]) -> Result<()> {
        let k = pub_key.size();
        if sig.len() != k {
            return Err(Error::Verification);
        }
        let em_bits = 8 * k - 1;
        let em_len = em_bits.div_ceil(8);

        let s = os2ip(sig);
        let m = rsa_encrypt(pub_key, &s).map_err(|_| Error::Verification)?;
        let em = uint_to_be_pad(&m, em_len).map_err(|_| Error::Verification)?;
        emsa_pss_verify(message, &em, em_bits, self.salt_len, self.hash_alg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen;
    use num_bigint_dig::BigUint;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn test_key() -> RsaPrivateKey {
        let mut rng = ChaCha8Rng::from_seed([31; 32]);
        keygen::generate_multi_prime_key(&mut rng, 2, 512, &BigUint::from(65537u32)).unwrap()
    }

    #[test]
    fn sign_verify_round_trip() {
        let key = test_key();
        let scheme = Pss::new(HashAlg::Sha256);
        let mut rng = ChaCha8Rng::from_seed([32; 32]);
        let sig = scheme.sign(&mut rng, &key, b"").unwrap();
        assert!(scheme.verify(key.as_ref(), b"", &sig).is_ok());
    }

    #[test]
    fn bit_flip_in_message_fails() {
        let key = test_key();
        let scheme = Pss::new(HashAlg::Sha256);
        let mut rng = ChaCha8Rng::from_seed([33; 32]);
        let sig = scheme.sign(&mut rng, &key, b"message").unwrap();
        assert!(scheme.verify(key.as_ref(), b"messagd", &sig).is_err());
    }
}
