//! `RsaKey` (spec.md §3, §4.7): the single public entry point aggregating
//! key state, mode/hash configuration, and the four primitives
//! (encrypt/decrypt/sign/verify), dispatching to the padding/signature
//! scheme types in [`crate::oaep`], [`crate::pkcs1v15`], and [`crate::pss`].

use rand_core::CryptoRngCore;

use crate::algorithms::pad::{os2ip, uint_to_be_pad};
use crate::algorithms::rsa::{rsa_decrypt, rsa_encrypt};
use crate::errors::{Error, Result};
use crate::formats::{self, KeyFormat};
use crate::hash::HashAlg;
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::keygen::{self, GenerateOutcome, PartialKey};
use crate::oaep::Oaep;
use crate::pkcs1v15::{Pkcs1v15Encrypt, Pkcs1v15Sign};
use crate::pss::Pss;
use crate::traits::{PaddingScheme, PrivateKeyParts, PublicKeyParts, SignatureScheme};

/// Encryption padding mode (spec.md §3's `encryption mode`, default OAEP).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionMode {
    Oaep,
    Pkcs1,
    /// Raw RSAEP/RSADP with no padding at all. Blocks are exactly `k` bytes;
    /// callers are responsible for the resulting message-recovery and
    /// malleability risks (spec.md §4.7's "NONE" primitive mode).
    None,
}

/// Signature padding mode (spec.md §3's `signature mode`, default PSS).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureMode {
    Pss,
    Pkcs1,
}

/// Fingerprint digest for [`RsaKey::get_public_key_fingerprint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerprintAlg {
    /// Colon-separated lowercase hex, matching `ssh-keygen -E md5`.
    Md5,
    /// Unpadded base64, matching `ssh-keygen -E sha256`.
    Sha256,
}

/// The single key abstraction spec.md §3 describes: public/private
/// material plus the hash/MGF/salt/mode configuration every primitive
/// consults.
#[derive(Debug, Clone)]
pub struct RsaKey {
    public: Option<RsaPublicKey>,
    private: Option<RsaPrivateKey>,
    hash: HashAlg,
    mgf_hash: HashAlg,
    salt_len: Option<usize>,
    encryption_mode: EncryptionMode,
    signature_mode: SignatureMode,
    password: Option<Vec<u8>>,
}

impl Default for RsaKey {
    fn default() -> Self {
        RsaKey {
            public: None,
            private: None,
            hash: HashAlg::default(),
            mgf_hash: HashAlg::default(),
            salt_len: None,
            encryption_mode: EncryptionMode::Oaep,
            signature_mode: SignatureMode::Pss,
            password: None,
        }
    }
}

impl RsaKey {
    /// An empty key with no material set yet (defaults: SHA-1, OAEP, PSS).
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a fresh key pair (spec.md §4.8), replacing any key
    /// material already set. `nprimes` defaults to the `KeyGen` algorithm's
    /// own derivation from `bits`/`smallestPrime` when `None`.
    pub fn generate<R: CryptoRngCore + ?Sized>(
        &mut self,
        rng: &mut R,
        bits: usize,
        exponent: Option<num_bigint_dig::BigUint>,
    ) -> Result<()> {
        let exp = exponent.unwrap_or_else(keygen::default_public_exponent);
        match keygen::generate(rng, bits, Some(exp), None, None, None)? {
            GenerateOutcome::Complete(key) => {
                self.set_private_key(key);
                Ok(())
            }
            GenerateOutcome::Partial(_) => Err(Error::Internal),
        }
    }

    /// Resumable generation (spec.md §4.8 step 4): returns the completed
    /// key, or the `partial` state to retry with on a later call, within
    /// `timeout`.
    pub fn generate_with_timeout<R: CryptoRngCore + ?Sized>(
        rng: &mut R,
        bits: usize,
        exponent: Option<num_bigint_dig::BigUint>,
        timeout: Option<std::time::Duration>,
        partial: Option<PartialKey>,
    ) -> Result<GenerateOutcome> {
        keygen::generate(rng, bits, exponent, timeout, partial, None)
    }

    /// Loads a key from `input`, probing every registered format in order
    /// (spec.md §4.9's auto-detect contract) unless the data decodes
    /// unambiguously as one format.
    pub fn load(&mut self, input: &[u8], password: Option<&[u8]>) -> Result<()> {
        if let Ok(key) = formats::load_private_key_auto(input, password) {
            self.set_private_key(key);
            return Ok(());
        }
        if let Ok(key) = formats::load_public_key_auto(input) {
            self.set_public_key(key);
            return Ok(());
        }
        Err(Error::MalformedKey)
    }

    /// Loads a key in an explicitly declared format, skipping auto-detect.
    pub fn load_format(&mut self, input: &[u8], format: KeyFormat, password: Option<&[u8]>) -> Result<()> {
        if let Ok(key) = formats::load_private_key(input, format, password) {
            self.set_private_key(key);
            return Ok(());
        }
        let key = formats::load_public_key(input, format)?;
        self.set_public_key(key);
        Ok(())
    }

    /// Role reassignment without regeneration (spec.md §3's lifecycle):
    /// installs a private key, deriving and caching its public half.
    pub fn set_private_key(&mut self, key: RsaPrivateKey) {
        self.public = Some(key.to_public_key());
        self.private = Some(key);
    }

    /// Installs a public key, clearing any private key material.
    pub fn set_public_key(&mut self, key: RsaPublicKey) {
        self.public = Some(key);
        self.private = None;
    }

    /// Returns the public key, if any key material has been set.
    pub fn get_public_key(&self) -> Option<&RsaPublicKey> {
        self.public.as_ref()
    }

    /// Returns the private key, if this `RsaKey` holds one.
    pub fn get_private_key(&self) -> Option<&RsaPrivateKey> {
        self.private.as_ref()
    }

    /// `k`, the modulus size in bytes (spec.md §3).
    pub fn get_size(&self) -> Result<usize> {
        self.public
            .as_ref()
            .map(|k| k.size())
            .ok_or(Error::MissingKeyMaterial)
    }

    /// Fingerprint of the public key over its SSH wire encoding (spec.md §6).
    pub fn get_public_key_fingerprint(&self, alg: FingerprintAlg) -> Result<String> {
        let pub_key = self.public.as_ref().ok_or(Error::MissingKeyMaterial)?;
        let wire = formats::ssh::encode_public_key(pub_key);
        match alg {
            FingerprintAlg::Md5 => {
                let digest = HashAlg::Md5.digest(&wire);
                Ok(digest
                    .iter()
                    .map(|b| format!("{b:02x}"))
                    .collect::<Vec<_>>()
                    .join(":"))
            }
            FingerprintAlg::Sha256 => {
                let digest = HashAlg::Sha256.digest(&wire);
                use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};
                Ok(STANDARD_NO_PAD.encode(digest))
            }
        }
    }

    pub fn set_hash(&mut self, hash: HashAlg) {
        self.hash = hash;
    }

    pub fn set_mgf_hash(&mut self, hash: HashAlg) {
        self.mgf_hash = hash;
    }

    pub fn set_salt_length(&mut self, len: usize) {
        self.salt_len = Some(len);
    }

    pub fn set_encryption_mode(&mut self, mode: EncryptionMode) {
        self.encryption_mode = mode;
    }

    pub fn set_signature_mode(&mut self, mode: SignatureMode) {
        self.signature_mode = mode;
    }

    /// Password used by the PKCS#8 loader/writer (spec.md §3); has no
    /// effect on any other format.
    pub fn set_password(&mut self, password: Option<Vec<u8>>) {
        self.password = password;
    }

    fn salt_len(&self) -> usize {
        self.salt_len.unwrap_or_else(|| self.hash.output_len())
    }

    /// Maximum plaintext bytes per block for the current mode (spec.md
    /// §4.7's chunk sizes: `k − 2·hLen − 2` for OAEP, `k − 11` for PKCS1,
    /// `k` for NONE).
    fn block_size(&self, k: usize) -> Result<usize> {
        match self.encryption_mode {
            EncryptionMode::Oaep => {
                let h_len = self.hash.output_len();
                k.checked_sub(2 * h_len + 2).ok_or(Error::ModulusTooLarge)
            }
            EncryptionMode::Pkcs1 => k.checked_sub(11).ok_or(Error::ModulusTooLarge),
            EncryptionMode::None => Ok(k),
        }
    }

    /// Encrypts `plaintext`, chunking per spec.md §4.7 and concatenating
    /// per-block ciphertext (each exactly `k` bytes).
    pub fn encrypt<R: CryptoRngCore + ?Sized>(&self, rng: &mut R, plaintext: &[u8]) -> Result<Vec<u8>> {
        let pub_key = self.public.as_ref().ok_or(Error::MissingKeyMaterial)?;
        let k = pub_key.size();
        let block_size = self.block_size(k)?;
        if block_size == 0 {
            return Err(Error::ModulusTooLarge);
        }

        let mut out = Vec::with_capacity(plaintext.len().div_ceil(block_size.max(1)) * k + k);
        let chunks: Vec<&[u8]> = if plaintext.is_empty() {
            vec![&plaintext[..]]
        } else {
            plaintext.chunks(block_size).collect()
        };

        for chunk in chunks {
            let block = match self.encryption_mode {
                EncryptionMode::Oaep => {
                    let scheme = Oaep::new_with_mgf_hash(self.hash, self.mgf_hash);
                    scheme.encrypt(rng, pub_key, chunk)?
                }
                EncryptionMode::Pkcs1 => Pkcs1v15Encrypt.encrypt(rng, pub_key, chunk)?,
                EncryptionMode::None => {
                    if chunk.len() > k {
                        return Err(Error::MessageTooLong);
                    }
                    let m = os2ip(chunk);
                    if m >= *pub_key.n() {
                        return Err(Error::OutOfRange);
                    }
                    let c = rsa_encrypt(pub_key, &m)?;
                    uint_to_be_pad(&c, k)?
                }
            };
            out.extend_from_slice(&block);
        }
        Ok(out)
    }

    /// Decrypts `ciphertext`: splits into `k`-sized blocks and runs the
    /// inverse padding on each, aborting the whole operation on any
    /// per-block failure (spec.md §4.7).
    pub fn decrypt<R: CryptoRngCore + ?Sized>(&self, rng: &mut R, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let priv_key = self.private.as_ref().ok_or(Error::MissingKeyMaterial)?;
        let k = priv_key.size();
        if k == 0 || ciphertext.len() % k != 0 || ciphertext.is_empty() {
            return Err(Error::Decryption);
        }

        let mut out = Vec::new();
        for block in ciphertext.chunks(k) {
            let plain = match self.encryption_mode {
                EncryptionMode::Oaep => {
                    let scheme = Oaep::new_with_mgf_hash(self.hash, self.mgf_hash);
                    scheme.decrypt(priv_key, block)?
                }
                EncryptionMode::Pkcs1 => Pkcs1v15Encrypt.decrypt(priv_key, block)?,
                EncryptionMode::None => {
                    let c = os2ip(block);
                    if c >= *priv_key.n() {
                        return Err(Error::OutOfRange);
                    }
                    let m = rsa_decrypt(rng, priv_key, &c)?;
                    uint_to_be_pad(&m, k)?
                }
            };
            out.extend_from_slice(&plain);
        }
        Ok(out)
    }

    /// Signs `message` in full (no chunking, spec.md §4.7). The configured
    /// scheme hashes `message` itself (EMSA-PSS-ENCODE/EMSA-PKCS1-v1_5 both
    /// take the message, not a pre-computed digest, per spec.md §4.4/§4.5).
    pub fn sign<R: CryptoRngCore + ?Sized>(&self, rng: &mut R, message: &[u8]) -> Result<Vec<u8>> {
        let priv_key = self.private.as_ref().ok_or(Error::MissingKeyMaterial)?;
        match self.signature_mode {
            SignatureMode::Pss => Pss::new_with_salt_len(self.hash, self.salt_len()).sign(rng, priv_key, message),
            SignatureMode::Pkcs1 => Pkcs1v15Sign::new(self.hash).sign(rng, priv_key, message),
        }
    }

    /// Verifies `signature` over `message` (spec.md §4.7: reject unless
    /// `|signature| == k`).
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<()> {
        let pub_key = self.public.as_ref().ok_or(Error::MissingKeyMaterial)?;
        if signature.len() != pub_key.size() {
            return Err(Error::Verification);
        }
        match self.signature_mode {
            SignatureMode::Pss => Pss::new_with_salt_len(self.hash, self.salt_len()).verify(pub_key, message, signature),
            SignatureMode::Pkcs1 => Pkcs1v15Sign::new(self.hash).verify(pub_key, message, signature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_key() -> RsaKey {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut key = RsaKey::new();
        key.generate(&mut rng, 512, None).unwrap();
        key
    }

    #[test]
    fn oaep_encrypt_decrypt_round_trip() {
        let mut key = small_key();
        key.set_hash(HashAlg::Sha1);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let ct = key.encrypt(&mut rng, b"hello rsa key api").unwrap();
        let pt = key.decrypt(&mut rng, &ct).unwrap();
        assert_eq!(pt, b"hello rsa key api");
    }

    #[test]
    fn pkcs1_encrypt_decrypt_round_trip() {
        let mut key = small_key();
        key.set_encryption_mode(EncryptionMode::Pkcs1);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let ct = key.encrypt(&mut rng, b"another message").unwrap();
        let pt = key.decrypt(&mut rng, &ct).unwrap();
        assert_eq!(pt, b"another message");
    }

    #[test]
    fn long_message_chunks_across_multiple_blocks() {
        let mut key = small_key();
        key.set_encryption_mode(EncryptionMode::Pkcs1);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let plaintext = vec![0x42u8; 200];
        let ct = key.encrypt(&mut rng, &plaintext).unwrap();
        let pt = key.decrypt(&mut rng, &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn pss_sign_verify_round_trip() {
        let key = small_key();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let sig = key.sign(&mut rng, b"message to sign").unwrap();
        assert!(key.verify(b"message to sign", &sig).is_ok());
    }

    #[test]
    fn pkcs1_sign_verify_round_trip() {
        let mut key = small_key();
        key.set_signature_mode(SignatureMode::Pkcs1);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let sig = key.sign(&mut rng, b"message to sign").unwrap();
        assert!(key.verify(b"message to sign", &sig).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_length_signature() {
        let key = small_key();
        assert_eq!(key.verify(b"msg", &[0u8; 3]), Err(Error::Verification));
    }

    #[test]
    fn fingerprint_formats_are_stable_shapes() {
        let key = small_key();
        let md5 = key.get_public_key_fingerprint(FingerprintAlg::Md5).unwrap();
        assert_eq!(md5.split(':').count(), 16);
        let sha256 = key.get_public_key_fingerprint(FingerprintAlg::Sha256).unwrap();
        assert!(!sha256.contains('='));
    }

    #[test]
    fn operations_without_key_material_fail_cleanly() {
        let key = RsaKey::new();
        assert_eq!(key.get_size(), Err(Error::MissingKeyMaterial));
    }
}
