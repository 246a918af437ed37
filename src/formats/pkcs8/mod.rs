//! PKCS#8 key envelopes (spec.md §4.10): `PrivateKeyInfo` / `EncryptedPrivateKeyInfo`
//! / `SubjectPublicKeyInfo`, wrapping this crate's own PKCS#1 DER encoding
//! (`../pkcs1.rs`) as the `rsaEncryption`-tagged payload, optionally
//! password-protected with PBES1 ([`pbes1`]) or PBES2 ([`pbes2`]).

mod cipher;
mod pbes1;
mod pbes2;

use der::asn1::{AnyRef, BitStringRef, OctetStringRef};
use der::{Decode, Encode, Sequence};
use spki::AlgorithmIdentifierRef;

use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};

use super::pkcs1;

const RSA_ENCRYPTION_OID: &str = "1.2.840.113549.1.1.1";

/// `PrivateKeyInfo ::= SEQUENCE` (RFC 5958 / PKCS#8 §5).
#[derive(Sequence)]
struct PrivateKeyInfo<'a> {
    version: u8,
    algorithm: AlgorithmIdentifierRef<'a>,
    private_key: OctetStringRef<'a>,
}

/// `SubjectPublicKeyInfo ::= SEQUENCE` (RFC 5280 §4.1).
#[derive(Sequence)]
struct SubjectPublicKeyInfo<'a> {
    algorithm: AlgorithmIdentifierRef<'a>,
    subject_public_key: BitStringRef<'a>,
}

/// `EncryptedPrivateKeyInfo ::= SEQUENCE` (PKCS#8 §6).
#[derive(Sequence)]
struct EncryptedPrivateKeyInfo<'a> {
    encryption_algorithm: AlgorithmIdentifierRef<'a>,
    encrypted_data: OctetStringRef<'a>,
}

// `rsaEncryption`'s parameters are `NULL`, per RFC 3279 §2.3.1.
const RSA_NULL_PARAMETERS: [u8; 2] = [0x05, 0x00];

fn rsa_algorithm_identifier() -> Result<AnyRef<'static>> {
    AnyRef::try_from(&RSA_NULL_PARAMETERS[..]).map_err(|_| Error::Internal)
}

/// Loads a public key from a `SubjectPublicKeyInfo` DER document.
pub fn load_public_key(der: &[u8]) -> Result<RsaPublicKey> {
    let spki = SubjectPublicKeyInfo::from_der(der).map_err(|_| Error::MalformedKey)?;
    if spki.algorithm.oid.to_string() != RSA_ENCRYPTION_OID {
        return Err(Error::UnsupportedAlgorithm);
    }
    let inner = spki
        .subject_public_key
        .as_bytes()
        .ok_or(Error::MalformedKey)?;
    pkcs1::load_public_key(inner)
}

/// Encodes a public key as a `SubjectPublicKeyInfo` DER document.
pub fn save_public_key(key: &RsaPublicKey) -> Result<Vec<u8>> {
    let pkcs1_der = pkcs1::save_public_key(key)?;
    let spki = SubjectPublicKeyInfo {
        algorithm: AlgorithmIdentifierRef {
            oid: RSA_ENCRYPTION_OID.parse().map_err(|_| Error::Internal)?,
            parameters: Some(rsa_algorithm_identifier()?),
        },
        subject_public_key: BitStringRef::from_bytes(&pkcs1_der).map_err(|_| Error::Internal)?,
    };
    spki.to_der().map_err(|_| Error::Internal)
}

/// Loads an unencrypted private key from a `PrivateKeyInfo` DER document.
pub fn load_private_key(der: &[u8]) -> Result<RsaPrivateKey> {
    let info = PrivateKeyInfo::from_der(der).map_err(|_| Error::MalformedKey)?;
    if info.algorithm.oid.to_string() != RSA_ENCRYPTION_OID {
        return Err(Error::UnsupportedAlgorithm);
    }
    pkcs1::load_private_key(info.private_key.as_bytes())
}

/// Encodes a private key as an unencrypted `PrivateKeyInfo` DER document.
pub fn save_private_key(key: &RsaPrivateKey) -> Result<Vec<u8>> {
    let pkcs1_der = pkcs1::save_private_key(key)?;
    let info = PrivateKeyInfo {
        version: 0,
        algorithm: AlgorithmIdentifierRef {
            oid: RSA_ENCRYPTION_OID.parse().map_err(|_| Error::Internal)?,
            parameters: Some(rsa_algorithm_identifier()?),
        },
        private_key: OctetStringRef::new(&pkcs1_der).map_err(|_| Error::Internal)?,
    };
    info.to_der().map_err(|_| Error::Internal)
}

/// Loads a (possibly encrypted) private key from an `EncryptedPrivateKeyInfo`
/// or plain `PrivateKeyInfo` DER document, trying the latter only if
/// `password` is `None`.
pub fn load_private_key_with_password(der: &[u8], password: Option<&[u8]>) -> Result<RsaPrivateKey> {
    if let Some(password) = password {
        let enc = EncryptedPrivateKeyInfo::from_der(der).map_err(|_| Error::MalformedKey)?;
        let oid = enc.encryption_algorithm.oid.to_string();
        let plaintext = if oid == pbes2::ID_PBES2 {
            let params_der = enc
                .encryption_algorithm
                .parameters
                .ok_or(Error::MalformedKey)?
                .to_der()
                .map_err(|_| Error::MalformedKey)?;
            pbes2::decrypt(&params_der, password, enc.encrypted_data.as_bytes())?
        } else {
            let params_der = enc
                .encryption_algorithm
                .parameters
                .ok_or(Error::MalformedKey)?
                .to_der()
                .map_err(|_| Error::MalformedKey)?;
            pbes1::decrypt(&oid, &params_der, password, enc.encrypted_data.as_bytes())?
        };
        load_private_key(&plaintext)
    } else {
        load_private_key(der)
    }
}

/// Encodes a private key as a password-protected `EncryptedPrivateKeyInfo`
/// DER document using PBES2/AES-128-CBC/HMAC-SHA256/PBKDF2 with a fresh
/// random salt and IV (spec.md §4.10's write-side defaults).
pub fn save_private_key_encrypted<R: rand_core::CryptoRngCore + ?Sized>(
    rng: &mut R,
    key: &RsaPrivateKey,
    password: &[u8],
) -> Result<Vec<u8>> {
    let pkcs8_der = save_private_key(key)?;

    let mut config = pbes2::Pbes2WriteConfig::default();
    rng.fill_bytes(&mut config.salt);
    rng.fill_bytes(&mut config.iv);

    let (params_der, ciphertext) = pbes2::encrypt(&config, password, &pkcs8_der)?;
    let params_any = AnyRef::try_from(params_der.as_slice()).map_err(|_| Error::Internal)?;

    let enc = EncryptedPrivateKeyInfo {
        encryption_algorithm: AlgorithmIdentifierRef {
            oid: pbes2::ID_PBES2.parse().map_err(|_| Error::Internal)?,
            parameters: Some(params_any),
        },
        encrypted_data: OctetStringRef::new(&ciphertext).map_err(|_| Error::Internal)?,
    };
    enc.to_der().map_err(|_| Error::Internal)
}
