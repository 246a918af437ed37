//! Block/stream cipher dispatch shared by PBES1 (spec.md §4.10.1) and PBES2
//! (spec.md §4.10.2). Both envelope schemes bottom out in "derive key + IV
//! from a password, then CBC- (or, for one legacy PKCS#12 pair, stream-)
//! decrypt the payload", so the actual cipher plumbing lives in one place.

use cipher::block_padding::Pkcs7;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, StreamCipher};

use crate::errors::{Error, Result};

/// A symmetric cipher this crate can drive from a PBES1/PBES2 envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CipherAlg {
    Des,
    Des3,
    /// RC2-CBC with an explicit effective key length in bits (RFC 2268; the
    /// `RC2CBCParameter.version` value spec.md's PBES1 table maps to this).
    /// The derived key is sized to exactly `effective_key_bits` so the two
    /// never diverge; RFC 2268's further trick of padding a larger key down
    /// to a smaller effective strength is not exercised by any OID this
    /// crate dispatches.
    Rc2 { effective_key_bits: usize },
    Rc4 { key_bits: usize },
    Aes128,
    Aes192,
    Aes256,
}

impl CipherAlg {
    /// Key length in bytes this cipher needs from the KDF.
    pub(crate) fn key_len(self) -> usize {
        match self {
            CipherAlg::Des => 8,
            CipherAlg::Des3 => 24,
            CipherAlg::Rc2 { effective_key_bits } => effective_key_bits.div_ceil(8),
            CipherAlg::Rc4 { key_bits } => key_bits.div_ceil(8),
            CipherAlg::Aes128 => 16,
            CipherAlg::Aes192 => 24,
            CipherAlg::Aes256 => 32,
        }
    }

    /// IV length in bytes (0 for the stream cipher, which has none).
    pub(crate) fn iv_len(self) -> usize {
        match self {
            CipherAlg::Des | CipherAlg::Des3 | CipherAlg::Rc2 { .. } => 8,
            CipherAlg::Rc4 { .. } => 0,
            CipherAlg::Aes128 | CipherAlg::Aes192 | CipherAlg::Aes256 => 16,
        }
    }
}

macro_rules! cbc_decrypt_with {
    ($ty:ty, $key:expr, $iv:expr, $data:expr) => {{
        let decryptor = <cbc::Decryptor<$ty>>::new_from_slices($key, $iv)
            .map_err(|_| Error::Decryption)?;
        decryptor
            .decrypt_padded_vec_mut::<Pkcs7>($data)
            .map_err(|_| Error::Decryption)
    }};
}

macro_rules! cbc_encrypt_with {
    ($ty:ty, $key:expr, $iv:expr, $data:expr) => {{
        let encryptor = <cbc::Encryptor<$ty>>::new_from_slices($key, $iv)
            .map_err(|_| Error::Internal)?;
        Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>($data))
    }};
}

/// Decrypts `data` (PKCS#7 padded) under `alg` with the given key/IV.
pub(crate) fn decrypt(alg: CipherAlg, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    match alg {
        CipherAlg::Des => cbc_decrypt_with!(des::Des, key, iv, data),
        CipherAlg::Des3 => cbc_decrypt_with!(des::TdesEde3, key, iv, data),
        CipherAlg::Rc2 { .. } => cbc_decrypt_with!(rc2::Rc2, key, iv, data),
        CipherAlg::Rc4 { .. } => {
            let mut buf = data.to_vec();
            rc4::Rc4::new(key.into()).apply_keystream(&mut buf);
            Ok(buf)
        }
        CipherAlg::Aes128 => cbc_decrypt_with!(aes::Aes128, key, iv, data),
        CipherAlg::Aes192 => cbc_decrypt_with!(aes::Aes192, key, iv, data),
        CipherAlg::Aes256 => cbc_decrypt_with!(aes::Aes256, key, iv, data),
    }
}

/// Encrypts `data`, applying PKCS#7 padding for the block ciphers.
pub(crate) fn encrypt(alg: CipherAlg, key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    match alg {
        CipherAlg::Des => cbc_encrypt_with!(des::Des, key, iv, data),
        CipherAlg::Des3 => cbc_encrypt_with!(des::TdesEde3, key, iv, data),
        CipherAlg::Rc2 { .. } => cbc_encrypt_with!(rc2::Rc2, key, iv, data),
        CipherAlg::Rc4 { .. } => {
            let mut buf = data.to_vec();
            rc4::Rc4::new(key.into()).apply_keystream(&mut buf);
            Ok(buf)
        }
        CipherAlg::Aes128 => cbc_encrypt_with!(aes::Aes128, key, iv, data),
        CipherAlg::Aes192 => cbc_encrypt_with!(aes::Aes192, key, iv, data),
        CipherAlg::Aes256 => cbc_encrypt_with!(aes::Aes256, key, iv, data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes128_cbc_round_trips() {
        let key = [0x11u8; 16];
        let iv = [0x22u8; 16];
        let plaintext = b"the quick brown fox jumps";
        let ct = encrypt(CipherAlg::Aes128, &key, &iv, plaintext).unwrap();
        let pt = decrypt(CipherAlg::Aes128, &key, &iv, &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn des3_cbc_round_trips() {
        let key = [0x33u8; 24];
        let iv = [0x44u8; 8];
        let plaintext = b"0123456789abcdef";
        let ct = encrypt(CipherAlg::Des3, &key, &iv, plaintext).unwrap();
        let pt = decrypt(CipherAlg::Des3, &key, &iv, &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn rc4_round_trips_via_self_inverse_keystream() {
        let key = [0x55u8; 16];
        let plaintext = b"stream cipher payload";
        let ct = encrypt(CipherAlg::Rc4 { key_bits: 128 }, &key, &[], plaintext).unwrap();
        let pt = decrypt(CipherAlg::Rc4 { key_bits: 128 }, &key, &[], &ct).unwrap();
        assert_eq!(pt, plaintext);
    }
}
