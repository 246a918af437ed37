//! PBES2 (spec.md §4.10.2, RFC 8018 §6.2): `id-PBES2` wraps a key-derivation
//! function (this crate only implements the `id-PBKDF2` branch — the
//! `otherSource` salt choice and non-PBKDF2 KDFs are out of scope) and a
//! block-cipher encryption scheme, each carried as a nested
//! `AlgorithmIdentifier`.

use der::asn1::{AnyRef, OctetStringRef};
use der::{Decode, Encode, Sequence};
use spki::AlgorithmIdentifierRef;

use crate::errors::{Error, Result};
use crate::hash::HashAlg;

use super::cipher::{self, CipherAlg};

pub(crate) const ID_PBES2: &str = "1.2.840.113549.1.5.13";
const ID_PBKDF2: &str = "1.2.840.113549.1.5.12";

const PRF_HMAC_SHA1: &str = "1.2.840.113549.2.7";
const PRF_HMAC_SHA256: &str = "1.2.840.113549.2.9";
const PRF_HMAC_SHA384: &str = "1.2.840.113549.2.10";
const PRF_HMAC_SHA512: &str = "1.2.840.113549.2.11";

const ENC_DES_CBC: &str = "1.3.14.3.2.7";
const ENC_DES_EDE3_CBC: &str = "1.2.840.113549.3.7";
const ENC_RC2_CBC: &str = "1.2.840.113549.3.2";
const ENC_RC5_CBC_PAD: &str = "1.2.840.113549.3.9";
const ENC_AES128_CBC_PAD: &str = "2.16.840.1.101.3.4.1.2";
const ENC_AES192_CBC_PAD: &str = "2.16.840.1.101.3.4.1.22";
const ENC_AES256_CBC_PAD: &str = "2.16.840.1.101.3.4.1.42";
const ID_PBMAC1: &str = "1.2.840.113549.1.5.14";

#[derive(Sequence)]
struct Pbes2Params<'a> {
    key_derivation_func: AlgorithmIdentifierRef<'a>,
    encryption_scheme: AlgorithmIdentifierRef<'a>,
}

#[derive(Sequence)]
struct Pbkdf2Params<'a> {
    salt: OctetStringRef<'a>,
    iteration_count: u32,
    key_length: Option<u32>,
    prf: Option<AlgorithmIdentifierRef<'a>>,
}

/// `RC2-CBC-Parameter ::= SEQUENCE { rc2ParameterVersion INTEGER OPTIONAL,
/// iv OCTET STRING }` (RFC 8018 Appendix B.2.5).
#[derive(Sequence)]
struct Rc2CbcParameter<'a> {
    rc2_parameter_version: Option<u32>,
    iv: OctetStringRef<'a>,
}

/// Maps `rc2ParameterVersion` to RFC 2268 effective key bits. The three
/// magic constants are RFC 8018's own encoding of the three "well-known"
/// RC2 strengths; anything else falls back to this crate's own default of
/// a full-strength 256-bit effective key (`../../../DESIGN.md`, RC2 table).
fn rc2_bits_from_version(version: Option<u32>) -> usize {
    match version {
        Some(160) => 40,
        Some(120) => 64,
        Some(58) => 128,
        Some(_) | None => 256,
    }
}

fn rc2_version_from_bits(bits: usize) -> u32 {
    match bits {
        40 => 160,
        64 => 120,
        128 => 58,
        _ => 256,
    }
}

fn prf_hash(oid: &str) -> Result<HashAlg> {
    Ok(match oid {
        PRF_HMAC_SHA1 => HashAlg::Sha1,
        PRF_HMAC_SHA256 => HashAlg::Sha256,
        PRF_HMAC_SHA384 => HashAlg::Sha384,
        PRF_HMAC_SHA512 => HashAlg::Sha512,
        _ => return Err(Error::UnsupportedAlgorithm),
    })
}

fn prf_oid(hash: HashAlg) -> Result<&'static str> {
    Ok(match hash {
        HashAlg::Sha1 => PRF_HMAC_SHA1,
        HashAlg::Sha256 => PRF_HMAC_SHA256,
        HashAlg::Sha384 => PRF_HMAC_SHA384,
        HashAlg::Sha512 => PRF_HMAC_SHA512,
        _ => return Err(Error::UnsupportedAlgorithm),
    })
}

fn pbkdf2_derive(hash: HashAlg, password: &[u8], salt: &[u8], iterations: u32, output_len: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; output_len];
    match hash {
        HashAlg::Sha1 => pbkdf2::pbkdf2_hmac::<sha1::Sha1>(password, salt, iterations, &mut out),
        HashAlg::Sha256 => pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password, salt, iterations, &mut out),
        HashAlg::Sha384 => pbkdf2::pbkdf2_hmac::<sha2::Sha384>(password, salt, iterations, &mut out),
        HashAlg::Sha512 => pbkdf2::pbkdf2_hmac::<sha2::Sha512>(password, salt, iterations, &mut out),
        _ => return Err(Error::UnsupportedAlgorithm),
    }
    Ok(out)
}

fn any_to_der(any: &AnyRef<'_>) -> Result<Vec<u8>> {
    any.to_der().map_err(|_| Error::MalformedKey)
}

fn cipher_for_encryption_scheme(alg: &AlgorithmIdentifierRef<'_>) -> Result<(CipherAlg, Vec<u8>)> {
    let oid = alg.oid.to_string();
    let params = alg.parameters.ok_or(Error::MalformedKey)?;

    match oid.as_str() {
        ENC_DES_CBC => {
            let der = any_to_der(&params)?;
            let iv = OctetStringRef::from_der(&der).map_err(|_| Error::MalformedKey)?;
            Ok((CipherAlg::Des, iv.as_bytes().to_vec()))
        }
        ENC_DES_EDE3_CBC => {
            let der = any_to_der(&params)?;
            let iv = OctetStringRef::from_der(&der).map_err(|_| Error::MalformedKey)?;
            Ok((CipherAlg::Des3, iv.as_bytes().to_vec()))
        }
        ENC_RC2_CBC => {
            let der = any_to_der(&params)?;
            let rc2 = Rc2CbcParameter::from_der(&der).map_err(|_| Error::MalformedKey)?;
            let bits = rc2_bits_from_version(rc2.rc2_parameter_version);
            Ok((CipherAlg::Rc2 { effective_key_bits: bits }, rc2.iv.as_bytes().to_vec()))
        }
        ENC_AES128_CBC_PAD => {
            let der = any_to_der(&params)?;
            let iv = OctetStringRef::from_der(&der).map_err(|_| Error::MalformedKey)?;
            Ok((CipherAlg::Aes128, iv.as_bytes().to_vec()))
        }
        ENC_AES192_CBC_PAD => {
            let der = any_to_der(&params)?;
            let iv = OctetStringRef::from_der(&der).map_err(|_| Error::MalformedKey)?;
            Ok((CipherAlg::Aes192, iv.as_bytes().to_vec()))
        }
        ENC_AES256_CBC_PAD => {
            let der = any_to_der(&params)?;
            let iv = OctetStringRef::from_der(&der).map_err(|_| Error::MalformedKey)?;
            Ok((CipherAlg::Aes256, iv.as_bytes().to_vec()))
        }
        ENC_RC5_CBC_PAD | ID_PBMAC1 => Err(Error::UnsupportedAlgorithm),
        _ => Err(Error::UnsupportedAlgorithm),
    }
}

/// Decrypts `ciphertext` under a `PBES2-params` DER blob.
pub(crate) fn decrypt(params_der: &[u8], password: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let params = Pbes2Params::from_der(params_der).map_err(|_| Error::MalformedKey)?;

    if params.key_derivation_func.oid.to_string() != ID_PBKDF2 {
        return Err(Error::UnsupportedAlgorithm);
    }
    let kdf_params_der = any_to_der(
        &params
            .key_derivation_func
            .parameters
            .ok_or(Error::MalformedKey)?,
    )?;
    let kdf = Pbkdf2Params::from_der(&kdf_params_der).map_err(|_| Error::MalformedKey)?;
    let prf = match kdf.prf {
        Some(alg) => prf_hash(&alg.oid.to_string())?,
        None => HashAlg::Sha1,
    };

    let (cipher_alg, iv) = cipher_for_encryption_scheme(&params.encryption_scheme)?;
    let key_len = kdf
        .key_length
        .map(|n| n as usize)
        .unwrap_or_else(|| cipher_alg.key_len());

    let key = pbkdf2_derive(prf, password, kdf.salt.as_bytes(), kdf.iteration_count, key_len)?;
    cipher::decrypt(cipher_alg, &key, &iv, ciphertext).map_err(|_| Error::Decryption)
}

/// Configuration for writing a fresh PBES2 envelope (spec.md §4.10's
/// write-side defaults: `id-PBES2`, `aes128-CBC-PAD`, `id-hmacWithSHA256`,
/// 2048 iterations, 8-byte salt).
pub(crate) struct Pbes2WriteConfig {
    pub(crate) cipher: CipherAlg,
    pub(crate) prf: HashAlg,
    pub(crate) iterations: u32,
    pub(crate) salt: Vec<u8>,
    pub(crate) iv: Vec<u8>,
}

impl Default for Pbes2WriteConfig {
    fn default() -> Self {
        Pbes2WriteConfig {
            cipher: CipherAlg::Aes128,
            prf: HashAlg::Sha256,
            iterations: 2048,
            salt: vec![0u8; 8],
            iv: vec![0u8; 16],
        }
    }
}

fn encryption_scheme_oid(cipher: CipherAlg) -> &'static str {
    match cipher {
        CipherAlg::Des => ENC_DES_CBC,
        CipherAlg::Des3 => ENC_DES_EDE3_CBC,
        CipherAlg::Rc2 { .. } => ENC_RC2_CBC,
        CipherAlg::Rc4 { .. } => "",
        CipherAlg::Aes128 => ENC_AES128_CBC_PAD,
        CipherAlg::Aes192 => ENC_AES192_CBC_PAD,
        CipherAlg::Aes256 => ENC_AES256_CBC_PAD,
    }
}

/// Encrypts `plaintext` under a freshly-built PBES2 envelope, returning
/// `(PBES2-params DER, ciphertext)`.
pub(crate) fn encrypt(config: &Pbes2WriteConfig, password: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    if matches!(config.cipher, CipherAlg::Rc4 { .. }) {
        // RC4 is a PBES1/PKCS#12-only legacy scheme; PBES2 only names block ciphers.
        return Err(Error::UnsupportedAlgorithm);
    }

    let key_len = config.cipher.key_len();
    let key = pbkdf2_derive(config.prf, password, &config.salt, config.iterations, key_len)?;
    let ciphertext = cipher::encrypt(config.cipher, &key, &config.iv, plaintext)?;

    let enc_params_der = match config.cipher {
        CipherAlg::Rc2 { effective_key_bits } => {
            let rc2 = Rc2CbcParameter {
                rc2_parameter_version: Some(rc2_version_from_bits(effective_key_bits)),
                iv: OctetStringRef::new(&config.iv).map_err(|_| Error::Internal)?,
            };
            rc2.to_der().map_err(|_| Error::Internal)?
        }
        _ => OctetStringRef::new(&config.iv)
            .map_err(|_| Error::Internal)?
            .to_der()
            .map_err(|_| Error::Internal)?,
    };
    let enc_params = AnyRef::try_from(enc_params_der.as_slice()).map_err(|_| Error::Internal)?;

    let prf_params_der = {
        let prf_any = {
            let empty: Option<AnyRef<'_>> = None;
            let ai = AlgorithmIdentifierRef {
                oid: prf_oid(config.prf)?.parse().map_err(|_| Error::Internal)?,
                parameters: empty,
            };
            ai.to_der().map_err(|_| Error::Internal)?
        };
        let prf_ai = AlgorithmIdentifierRef::from_der(&prf_any).map_err(|_| Error::Internal)?;
        let kdf = Pbkdf2Params {
            salt: OctetStringRef::new(&config.salt).map_err(|_| Error::Internal)?,
            iteration_count: config.iterations,
            key_length: Some(key_len as u32),
            prf: Some(prf_ai),
        };
        kdf.to_der().map_err(|_| Error::Internal)?
    };
    let kdf_params = AnyRef::try_from(prf_params_der.as_slice()).map_err(|_| Error::Internal)?;

    let params = Pbes2Params {
        key_derivation_func: AlgorithmIdentifierRef {
            oid: ID_PBKDF2.parse().map_err(|_| Error::Internal)?,
            parameters: Some(kdf_params),
        },
        encryption_scheme: AlgorithmIdentifierRef {
            oid: encryption_scheme_oid(config.cipher)
                .parse()
                .map_err(|_| Error::Internal)?,
            parameters: Some(enc_params),
        },
    };
    let params_der = params.to_der().map_err(|_| Error::Internal)?;
    Ok((params_der, ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aes128_round_trips() {
        let config = Pbes2WriteConfig::default();
        let plaintext = b"a private key wrapped in PBES2 with AES-128";
        let (params, ct) = encrypt(&config, b"hunter2", plaintext).unwrap();
        let pt = decrypt(&params, b"hunter2", &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn aes256_with_sha384_prf_round_trips() {
        let config = Pbes2WriteConfig {
            cipher: CipherAlg::Aes256,
            prf: HashAlg::Sha384,
            iterations: 1000,
            salt: vec![5u8; 16],
            iv: vec![6u8; 16],
        };
        let plaintext = b"0123456789abcdef0123456789abcdef";
        let (params, ct) = encrypt(&config, b"correct horse battery staple", plaintext).unwrap();
        let pt = decrypt(&params, b"correct horse battery staple", &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn rc2_cbc_round_trips_with_version_table() {
        let config = Pbes2WriteConfig {
            cipher: CipherAlg::Rc2 { effective_key_bits: 128 },
            prf: HashAlg::Sha256,
            iterations: 500,
            salt: vec![1u8; 8],
            iv: vec![2u8; 8],
        };
        let plaintext = b"rc2 in pbes2 with 128-bit effective key";
        let (params, ct) = encrypt(&config, b"pw", plaintext).unwrap();
        let pt = decrypt(&params, b"pw", &ct).unwrap();
        assert_eq!(pt, plaintext);
    }

    #[test]
    fn wrong_password_does_not_recover_plaintext() {
        let config = Pbes2WriteConfig::default();
        let plaintext = b"confidential material..........";
        let (params, ct) = encrypt(&config, b"right-password", plaintext).unwrap();
        let pt = decrypt(&params, b"wrong-password", &ct);
        assert_ne!(pt.ok(), Some(plaintext.to_vec()));
    }
}
