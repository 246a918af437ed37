//! Supported padding/signature scheme traits.

use rand_core::CryptoRngCore;

use crate::errors::Result;
use crate::key::{RsaPrivateKey, RsaPublicKey};

/// An encryption/decryption padding scheme (OAEP, PKCS#1 v1.5 encryption).
pub trait PaddingScheme {
    /// Encrypts `msg` under `pub_key`, returning a ciphertext exactly
    /// [`PublicKeyParts::size`](super::PublicKeyParts::size) bytes long.
    fn encrypt<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        pub_key: &RsaPublicKey,
        msg: &[u8],
    ) -> Result<Vec<u8>>;

    /// Decrypts `ciphertext` under `priv_key`.
    fn decrypt(&self, priv_key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// A digital signature scheme (PSS, PKCS#1 v1.5 signatures).
pub trait SignatureScheme {
    /// Signs `message` with `priv_key`. The scheme hashes `message` itself
    /// (EMSA-PSS-ENCODE/EMSA-PKCS1-v1_5 both take the full message and hash
    /// internally, per spec.md §4.4/§4.5) — callers must not pre-hash.
    fn sign<R: CryptoRngCore + ?Sized>(
        &self,
        rng: &mut R,
        priv_key: &RsaPrivateKey,
        message: &[u8],
    ) -> Result<Vec<u8>>;

    /// Verifies `sig` over `message` against `pub_key`.
    fn verify(&self, pub_key: &RsaPublicKey, message: &[u8], sig: &[u8]) -> Result<()>;
}
