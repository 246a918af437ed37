//! `PaddingPkcs1v15Enc` and `EmsaPkcs1v15` padding/signature schemes
//! (spec.md §4.3, §4.5).

use rand_core::CryptoRngCore;

use crate::algorithms::pad::{os2ip, uint_to_be_pad};
use crate::algorithms::pkcs1v15::{
    emsa_pkcs1v15_encode, pkcs1v15_decrypt_pad, pkcs1v15_encrypt_pad, BlockType,
};
use crate::algorithms::rsa::{rsa_decrypt, rsa_encrypt};
use crate::const_time;
use crate::errors::{Error, Result};
use crate::hash::HashAlg;
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PaddingScheme, PublicKeyParts, SignatureScheme};

/// `EME-PKCS1-v1_5` encryption padding (spec.md §4.3, block type 2).
#[derive(Debug, Clone, Copy, Default)]
pub struct Pkcs1v15Encrypt;

impl PaddingScheme for Pkcs1v15Encrypt {
    fn encrypt<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        pub_key: &RsaPublicKey,
        msg: &[u8],
    ) -> Result<Vec<u8>> {
        let k = pub_key.size();
        let em = pkcs1v15_encrypt_pad(rng, msg, k, BlockType::Type2)?;
        let m = os2ip(&em);
        let c = rsa_encrypt(pub_key, &m)?;
        uint_to_be_pad(&c, k)
    }

    fn decrypt(&self, priv_key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let k = priv_key.size();
        if ciphertext.len() != k {
            return Err(Error::Decryption);
        }
        let c = os2ip(ciphertext);
        let mut rng = rand::rngs::OsRng;
        let m = rsa_decrypt(&mut rng, priv_key, &c).map_err(|_| Error::Decryption)?;
        let em = uint_to_be_pad(&m, k).map_err(|_| Error::Decryption)?;
        pkcs1v15_decrypt_pad(&em)
    }
}

/// `EMSA-PKCS1-v1_5` signature scheme (spec.md §4.5), parameterized by the
/// hash algorithm whose DigestInfo prefix is embedded.
#[derive(Debug, Clone, Copy)]
pub struct Pkcs1v15Sign {
    pub hash_alg: HashAlg,
}

impl Pkcs1v15Sign {
    pub fn new(hash_alg: HashAlg) -> Self {
        Self { hash_alg }
    }
}

impl SignatureScheme for Pkcs1v15Sign {
    fn sign<R: CryptoRngCore + ?Sized>(
        &self,
        _rng: &mut R,
        priv_key: &RsaPrivateKey,
        message: &[u8],
    ) -> Result<Vec<u8>> {
        let k = priv_key.size();
        let em = emsa_pkcs1v15_encode(message, k, self.hash_alg)?;
        let m = os2ip(&em);
        let mut rng = rand::rngs::OsRng;
        let s = rsa_decrypt(&mut rng, priv_key, &m).map_err(|_| Error::Internal)?;
        uint_to_be_pad(&s, k)
    }

    fn verify(&self, pub_key: &RsaPublicKey, message: &[u8], sig: &[u8]) -> Result<()> {
        let k = pub_key.size();
        if sig.len() != k {
            return Err(Error::Verification);
        }
        let s = os2ip(sig);
        let m = rsa_encrypt(pub_key, &s).map_err(|_| Error::Verification)?;
        let em = uint_to_be_pad(&m, k).map_err(|_| Error::Verification)?;
        let expected = emsa_pkcs1v15_encode(message, k, self.hash_alg)?;
        if const_time::eq(&em, &expected) {
            Ok(())
        } else {
            Err(Error::Verification)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen;
    use num_bigint_dig::BigUint;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn test_key() -> RsaPrivateKey {
        let mut rng = ChaCha8Rng::from_seed([17; 32]);
        keygen::generate_multi_prime_key(&mut rng, 2, 512, &BigUint::from(65537u32)).unwrap()
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let key = test_key();
        let scheme = Pkcs1v15Encrypt;
        let mut rng = ChaCha8Rng::from_seed([22; 32]);
        let ct = scheme.encrypt(&mut rng, key.as_ref(), b"hello").unwrap();
        assert_eq!(scheme.decrypt(&key, &ct).unwrap(), b"hello");
    }

    #[test]
    fn sign_verify_round_trip() {
        let key = test_key();
        let scheme = Pkcs1v15Sign::new(HashAlg::Sha1);
        let mut rng = ChaCha8Rng::from_seed([23; 32]);
        let sig = scheme.sign(&mut rng, &key, b"message").unwrap();
        assert!(scheme.verify(key.as_ref(), b"message", &sig).is_ok());
    }

    #[test]
    fn flipped_signature_byte_fails_verification() {
        let key = test_key();
        let scheme = Pkcs1v15Sign::new(HashAlg::Sha1);
        let mut rng = ChaCha8Rng::from_seed([24; 32]);
        let mut sig = scheme.sign(&mut rng, &key, b"message").unwrap();
        *sig.last_mut().unwrap() ^= 0xFF;
        assert!(scheme.verify(key.as_ref(), b"message", &sig).is_err());
    }
}
