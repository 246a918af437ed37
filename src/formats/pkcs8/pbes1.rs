//! PBES1 (spec.md §4.10.1): the twelve historical password-based encryption
//! OIDs — PKCS#5 v1.5's six `pbeWithMD2/MD5/SHA1AndDES/RC2-CBC` schemes,
//! keyed with PBKDF1, plus PKCS#12 Appendix B's six `pbeWithSHAAnd*`
//! schemes, keyed with the PKCS#12 KDF (a different, hash-chain-and-carry
//! construction RFC 7292 defines for its own archive format and PKCS#8
//! later borrowed wholesale).

use der::asn1::OctetStringRef;
use der::{Decode, Encode, Sequence};

use crate::errors::{Error, Result};
use crate::hash::HashAlg;

use super::cipher::{self, CipherAlg};

pub(crate) const PBE_MD2_DES_CBC: &str = "1.2.840.113549.1.5.1";
pub(crate) const PBE_MD2_RC2_CBC: &str = "1.2.840.113549.1.5.4";
pub(crate) const PBE_MD5_DES_CBC: &str = "1.2.840.113549.1.5.3";
pub(crate) const PBE_MD5_RC2_CBC: &str = "1.2.840.113549.1.5.6";
pub(crate) const PBE_SHA1_DES_CBC: &str = "1.2.840.113549.1.5.10";
pub(crate) const PBE_SHA1_RC2_CBC: &str = "1.2.840.113549.1.5.11";

pub(crate) const PBE_SHA1_RC4_128: &str = "1.2.840.113549.1.12.1.1";
pub(crate) const PBE_SHA1_RC4_40: &str = "1.2.840.113549.1.12.1.2";
pub(crate) const PBE_SHA1_3KEY_3DES: &str = "1.2.840.113549.1.12.1.3";
pub(crate) const PBE_SHA1_2KEY_3DES: &str = "1.2.840.113549.1.12.1.4";
pub(crate) const PBE_SHA1_RC2_128: &str = "1.2.840.113549.1.12.1.5";
pub(crate) const PBE_SHA1_RC2_40: &str = "1.2.840.113549.1.12.1.6";

/// All twelve OIDs above share `PBEParameter ::= SEQUENCE { salt OCTET
/// STRING, iterationCount INTEGER }` (RFC 8018 Appendix A.3).
#[derive(Sequence)]
struct PbeParameter<'a> {
    salt: OctetStringRef<'a>,
    iteration_count: u32,
}

struct Scheme {
    hash: HashAlg,
    cipher: CipherAlg,
    pkcs12_kdf: bool,
    two_key_3des: bool,
}

fn scheme_for_oid(oid: &str) -> Result<Scheme> {
    let plain = |hash, cipher| Scheme {
        hash,
        cipher,
        pkcs12_kdf: false,
        two_key_3des: false,
    };
    let pkcs12 = |cipher, two_key_3des| Scheme {
        hash: HashAlg::Sha1,
        cipher,
        pkcs12_kdf: true,
        two_key_3des,
    };

    Ok(match oid {
        PBE_MD2_DES_CBC => plain(HashAlg::Md2, CipherAlg::Des),
        PBE_MD2_RC2_CBC => plain(HashAlg::Md2, CipherAlg::Rc2 { effective_key_bits: 64 }),
        PBE_MD5_DES_CBC => plain(HashAlg::Md5, CipherAlg::Des),
        PBE_MD5_RC2_CBC => plain(HashAlg::Md5, CipherAlg::Rc2 { effective_key_bits: 64 }),
        PBE_SHA1_DES_CBC => plain(HashAlg::Sha1, CipherAlg::Des),
        PBE_SHA1_RC2_CBC => plain(HashAlg::Sha1, CipherAlg::Rc2 { effective_key_bits: 64 }),
        PBE_SHA1_RC4_128 => pkcs12(CipherAlg::Rc4 { key_bits: 128 }, false),
        PBE_SHA1_RC4_40 => pkcs12(CipherAlg::Rc4 { key_bits: 40 }, false),
        PBE_SHA1_3KEY_3DES => pkcs12(CipherAlg::Des3, false),
        PBE_SHA1_2KEY_3DES => pkcs12(CipherAlg::Des3, true),
        PBE_SHA1_RC2_128 => pkcs12(CipherAlg::Rc2 { effective_key_bits: 128 }, false),
        PBE_SHA1_RC2_40 => pkcs12(CipherAlg::Rc2 { effective_key_bits: 40 }, false),
        _ => return Err(Error::UnsupportedAlgorithm),
    })
}

/// PBKDF1 (RFC 8018 §5.1): iterated single hash chain over `P || S`,
/// truncated to `dk_len`. Only valid while `dk_len <= hLen`, which holds for
/// every PBES1 cipher (DES/RC2 never need more than 16 derived bytes).
fn pbkdf1(hash: HashAlg, password: &[u8], salt: &[u8], iterations: u32, dk_len: usize) -> Result<Vec<u8>> {
    if dk_len > hash.output_len() || iterations == 0 {
        return Err(Error::InvalidArguments);
    }
    let mut t = {
        let mut d = hash.new_digest();
        d.update(password);
        d.update(salt);
        d.finalize_reset().to_vec()
    };
    for _ in 1..iterations {
        let mut d = hash.new_digest();
        d.update(&t);
        t = d.finalize_reset().to_vec();
    }
    Ok(t[..dk_len].to_vec())
}

/// UTF-16BE ("BMPString") encoding of `password` with a trailing NUL
/// code unit, as RFC 7292 Appendix B.1 requires.
fn bmp_string(password: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(password);
    let mut out = Vec::with_capacity(text.len() * 2 + 2);
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out.extend_from_slice(&[0, 0]);
    out
}

fn add_one_with_carry(block: &mut [u8], addend: &[u8]) {
    let mut carry: u16 = 1;
    for k in (0..block.len()).rev() {
        let sum = u16::from(block[k]) + u16::from(addend[k]) + carry;
        block[k] = (sum & 0xff) as u8;
        carry = sum >> 8;
    }
}

/// The PKCS#12 Appendix B key-derivation function. `id` selects which
/// "diversifier" to mix in: 1 for key material, 2 for IV material, 3 for
/// MAC material (spec.md only needs the first two).
fn pkcs12_derive(hash: HashAlg, password: &[u8], salt: &[u8], iterations: u32, id: u8, output_len: usize) -> Vec<u8> {
    let v = match hash {
        HashAlg::Sha384 | HashAlg::Sha512 => 128,
        _ => 64,
    };

    let d = vec![id; v];

    let pass = bmp_string(password);
    let mut s = Vec::new();
    if !salt.is_empty() {
        while s.len() < salt.len().div_ceil(v) * v {
            s.extend_from_slice(salt);
        }
        s.truncate(salt.len().div_ceil(v) * v);
    }
    let mut p = Vec::new();
    if !pass.is_empty() {
        while p.len() < pass.len().div_ceil(v) * v {
            p.extend_from_slice(&pass);
        }
        p.truncate(pass.len().div_ceil(v) * v);
    }

    let mut i = s;
    i.extend_from_slice(&p);
    if i.is_empty() {
        i = vec![0u8; v];
    }

    let mut result = Vec::with_capacity(output_len);
    while result.len() < output_len {
        let mut a = {
            let mut dg = hash.new_digest();
            dg.update(&d);
            dg.update(&i);
            dg.finalize_reset().to_vec()
        };
        for _ in 1..iterations {
            let mut dg = hash.new_digest();
            dg.update(&a);
            a = dg.finalize_reset().to_vec();
        }
        result.extend_from_slice(&a);

        let mut b = Vec::with_capacity(v);
        while b.len() < v {
            b.extend_from_slice(&a);
        }
        b.truncate(v);

        for block in i.chunks_mut(v) {
            add_one_with_carry(block, &b);
        }
    }
    result.truncate(output_len);
    result
}

fn derive_key_iv(scheme: &Scheme, password: &[u8], salt: &[u8], iterations: u32) -> Result<(Vec<u8>, Vec<u8>)> {
    let iv_len = scheme.cipher.iv_len();

    if scheme.pkcs12_kdf {
        let key_material_len = if scheme.two_key_3des { 16 } else { scheme.cipher.key_len() };
        let derived = pkcs12_derive(scheme.hash, password, salt, iterations, 1, key_material_len);
        let key = if scheme.two_key_3des {
            // Two-key 3DES: K1 || K2 || K1, matching RFC 7292's K1=K3 convention.
            let mut k = derived.clone();
            k.extend_from_slice(&derived[0..8]);
            k
        } else {
            derived
        };
        let iv = if iv_len > 0 {
            pkcs12_derive(scheme.hash, password, salt, iterations, 2, iv_len)
        } else {
            Vec::new()
        };
        Ok((key, iv))
    } else {
        let dk = pbkdf1(scheme.hash, password, salt, iterations, 8 + iv_len)?;
        Ok((dk[0..8].to_vec(), dk[8..8 + iv_len].to_vec()))
    }
}

/// Decrypts `ciphertext` using the PBES1 scheme `oid` identifies, with
/// algorithm parameters `params_der` (a DER-encoded `PBEParameter`).
pub(crate) fn decrypt(oid: &str, params_der: &[u8], password: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let scheme = scheme_for_oid(oid)?;
    let params = PbeParameter::from_der(params_der).map_err(|_| Error::MalformedKey)?;
    let (key, iv) = derive_key_iv(&scheme, password, params.salt.as_bytes(), params.iteration_count)?;
    cipher::decrypt(scheme.cipher, &key, &iv, ciphertext).map_err(|_| Error::Decryption)
}

/// Encrypts `plaintext` under the PBES1 scheme `oid` identifies, returning
/// `(params_der, ciphertext)`.
pub(crate) fn encrypt(oid: &str, salt: &[u8], iterations: u32, password: &[u8], plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
    let scheme = scheme_for_oid(oid)?;
    let (key, iv) = derive_key_iv(&scheme, password, salt, iterations)?;
    let ciphertext = cipher::encrypt(scheme.cipher, &key, &iv, plaintext)?;
    let params = PbeParameter {
        salt: OctetStringRef::new(salt).map_err(|_| Error::Internal)?,
        iteration_count: iterations,
    };
    let params_der = params.to_der().map_err(|_| Error::Internal)?;
    Ok((params_der, ciphertext))
}
