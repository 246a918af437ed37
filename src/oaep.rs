//! `Oaep` padding scheme (spec.md §4.2): [`PaddingScheme`] impl gluing
//! [`crate::algorithms::oaep`] to a runtime-selected [`HashAlg`] pair (the
//! label/`DB` hash and the MGF1 hash, independently selectable per spec.md
//! §3's `hash`/`mgfHash` fields).

use rand_core::CryptoRngCore;

use crate::algorithms::oaep::{oaep_decrypt, oaep_encrypt};
use crate::algorithms::pad::{os2ip, uint_to_be_pad};
use crate::algorithms::rsa::{rsa_decrypt, rsa_encrypt};
use crate::errors::{Error, Result};
use crate::hash::HashAlg;
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PaddingScheme, PublicKeyParts};

/// OAEP encryption padding, with an optional label (spec.md §4.2's `L`,
/// default empty).
#[derive(Debug, Clone)]
pub struct Oaep {
    /// Hash used for the label and `lHash`.
    pub digest: HashAlg,
    /// Hash used for MGF1; may differ from `digest`.
    pub mgf_digest: HashAlg,
    /// Optional label. Defaults to empty.
    pub label: Option<Vec<u8>>,
}

impl Oaep {
    /// A new OAEP scheme using `hash` for both the label hash and MGF1.
    pub fn new(hash: HashAlg) -> Self {
        Self {
            digest: hash,
            mgf_digest: hash,
            label: None,
        }
    }

    /// An OAEP scheme with independently chosen label and MGF1 hashes.
    pub fn new_with_mgf_hash(digest: HashAlg, mgf_digest: HashAlg) -> Self {
        Self {
            digest,
            mgf_digest,
            label: None,
        }
    }

    /// Attaches a label to this scheme.
    pub fn with_label(mut self, label: impl Into<Vec<u8>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Maximum single-block plaintext length for a `k`-byte modulus under
    /// this scheme's hash (spec.md §4.2: `k - 2*hLen - 2`).
    pub fn max_message_len(&self, k: usize) -> usize {
        k.saturating_sub(2 * self.digest.output_len() + 2)
    }
}

impl PaddingScheme for Oaep {
    fn encrypt<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        pub_key: &RsaPublicKey,
        msg: &[u8],
    ) -> Result<Vec<u8>> {
        let k = pub_key.size();
        let label = self.label.as_deref().unwrap_or(b"");
        let mut digest = self.digest.new_digest();
        let mut mgf_digest = self.mgf_digest.new_digest();
        let em = oaep_encrypt(rng, msg, label, &mut *digest, &mut *mgf_digest, k)?;
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

        let label = self.label.as_deref().unwrap_or(b"");
        let mut digest = self.digest.new_digest();
        let mut mgf_digest = self.mgf_digest.new_digest();
        oaep_decrypt(&em, label, &mut *digest, &mut *mgf_digest, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen;
    use num_bigint_dig::BigUint;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn test_key() -> RsaPrivateKey {
        let mut rng = ChaCha8Rng::from_seed([9; 32]);
        keygen::generate_multi_prime_key(&mut rng, 2, 512, &BigUint::from(65537u32)).unwrap()
    }

    #[test]
    fn round_trip_hello() {
        let key = test_key();
        let scheme = Oaep::new(HashAlg::Sha1);
        let mut rng = ChaCha8Rng::from_seed([21; 32]);
        let ct = scheme.encrypt(&mut rng, key.as_ref(), b"hello").unwrap();
        let pt = scheme.decrypt(&key, &ct).unwrap();
        assert_eq!(pt, b"hello");
    }

    #[test]
    fn wrong_ciphertext_length_rejected() {
        let key = test_key();
        let scheme = Oaep::new(HashAlg::Sha1);
        assert_eq!(scheme.decrypt(&key, &[0u8; 3]), Err(Error::Decryption));
    }
}
