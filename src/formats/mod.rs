//! Key load/save formats (spec.md §4.9): Raw, PKCS#1, PKCS#8, and XML carry
//! full key material; SSH and PEM are auxiliary (wire encoding for
//! fingerprinting, and armor for any of the DER formats) rather than
//! members of the format-name enum themselves.

pub mod pem;
pub mod pkcs1;
pub mod pkcs8;
pub mod raw;
pub mod ssh;
pub mod xml;

use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};

/// The named key formats spec.md §4.9 enumerates as `keyFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormat {
    Pkcs1,
    Pkcs8,
    Xml,
}

/// Tries every format in turn — PKCS#8, then PKCS#1, then XML — and accepts
/// the first one that parses, matching spec.md §4.9's "if no format is
/// declared, probe in this order" auto-detect contract. PEM armor is
/// stripped once up front, since all three DER formats share it.
pub fn load_public_key_auto(input: &[u8]) -> Result<RsaPublicKey> {
    let der = pem::maybe_decode(input)?;

    if let Ok(key) = pkcs8::load_public_key(&der) {
        return Ok(key);
    }
    if let Ok(key) = pkcs1::load_public_key(&der) {
        return Ok(key);
    }
    if let Ok(text) = core::str::from_utf8(input) {
        if let Some(key) = xml::load_public_key(text) {
            return Ok(key);
        }
    }

    Err(Error::MalformedKey)
}

/// As [`load_public_key_auto`], for private keys. `password` is forwarded to
/// the PKCS#8 loader only (spec.md §4.10: Raw, PKCS#1, and XML never carry
/// encryption envelopes of their own).
pub fn load_private_key_auto(input: &[u8], password: Option<&[u8]>) -> Result<RsaPrivateKey> {
    let der = pem::maybe_decode(input)?;

    if let Ok(key) = pkcs8::load_private_key_with_password(&der, password) {
        return Ok(key);
    }
    if let Ok(key) = pkcs1::load_private_key(&der) {
        return Ok(key);
    }
    if let Ok(text) = core::str::from_utf8(input) {
        if let Some(key) = xml::load_private_key(text) {
            return Ok(key);
        }
    }

    Err(Error::MalformedKey)
}

/// Loads a public key in a specific, caller-declared format (no probing).
pub fn load_public_key(input: &[u8], format: KeyFormat) -> Result<RsaPublicKey> {
    let der = pem::maybe_decode(input)?;
    match format {
        KeyFormat::Pkcs8 => pkcs8::load_public_key(&der),
        KeyFormat::Pkcs1 => pkcs1::load_public_key(&der),
        KeyFormat::Xml => {
            let text = core::str::from_utf8(input).map_err(|_| Error::MalformedKey)?;
            xml::load_public_key(text).ok_or(Error::MalformedKey)
        }
    }
}

/// Loads a private key in a specific, caller-declared format (no probing).
pub fn load_private_key(input: &[u8], format: KeyFormat, password: Option<&[u8]>) -> Result<RsaPrivateKey> {
    let der = pem::maybe_decode(input)?;
    match format {
        KeyFormat::Pkcs8 => pkcs8::load_private_key_with_password(&der, password),
        KeyFormat::Pkcs1 => pkcs1::load_private_key(&der),
        KeyFormat::Xml => {
            let text = core::str::from_utf8(input).map_err(|_| Error::MalformedKey)?;
            xml::load_private_key(text).ok_or(Error::MalformedKey)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint_dig::BigUint;

    fn small_key() -> RsaPrivateKey {
        RsaPrivateKey::from_p_q(
            BigUint::from(61u32),
            BigUint::from(53u32),
            BigUint::from(17u32),
        )
        .unwrap()
    }

    #[test]
    fn auto_detect_loads_pkcs8_public_key() {
        let pub_key = small_key().to_public_key();
        let der = pkcs8::save_public_key(&pub_key).unwrap();
        let pem_armored = pem::encode(pem::PUBLIC_KEY, &der);
        let loaded = load_public_key_auto(pem_armored.as_bytes()).unwrap();
        use crate::traits::PublicKeyParts;
        assert_eq!(loaded.n(), pub_key.n());
    }

    #[test]
    fn auto_detect_loads_pkcs1_private_key() {
        let key = small_key();
        let der = pkcs1::save_private_key(&key).unwrap();
        let loaded = load_private_key_auto(&der, None).unwrap();
        assert_eq!(loaded, key);
    }

    #[test]
    fn auto_detect_loads_xml_public_key() {
        let pub_key = small_key().to_public_key();
        let xml_text = xml::save_public_key(&pub_key).unwrap();
        let loaded = load_public_key_auto(xml_text.as_bytes()).unwrap();
        use crate::traits::PublicKeyParts;
        assert_eq!(loaded.n(), pub_key.n());
    }
}
