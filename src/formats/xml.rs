//! XML key format (spec.md §4.9): a `<RSAKeyValue>` element with base64
//! children `Modulus`, `Exponent`, and for private keys `P`, `Q`, `DP`,
//! `DQ`, `InverseQ`, `D`. Tag matching is case-insensitive.
//!
//! No general XML crate is pulled in for this fixed, nine-tag schema; a
//! small hand-rolled reader/writer is enough and keeps the dependency list
//! aligned with what this format actually needs.

use base64::{engine::general_purpose::STANDARD, Engine};
use num_bigint_dig::BigUint;

use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

struct XmlComponents {
    modulus: BigUint,
    exponent: BigUint,
    p: Option<BigUint>,
    q: Option<BigUint>,
    dp: Option<BigUint>,
    dq: Option<BigUint>,
    inverse_q: Option<BigUint>,
    d: Option<BigUint>,
}

/// Finds the text content of `<tag>...</tag>` (case-insensitive), decoded
/// from base64. Returns `None` if the tag is absent.
fn find_tag(xml: &str, tag: &str) -> Option<BigUint> {
    let lower = xml.to_ascii_lowercase();
    let open = format!("<{}>", tag.to_ascii_lowercase());
    let close = format!("</{}>", tag.to_ascii_lowercase());

    let start = lower.find(&open)? + open.len();
    let rest = &lower[start..];
    let end = rest.find(&close)?;

    let original_start = start;
    let original_end = start + end;
    let text = xml[original_start..original_end].trim();
    let decoded = STANDARD.decode(text).ok()?;
    Some(BigUint::from_bytes_be(&decoded))
}

fn parse(xml: &str) -> Option<XmlComponents> {
    let modulus = find_tag(xml, "Modulus")?;
    let exponent = find_tag(xml, "Exponent")?;
    Some(XmlComponents {
        modulus,
        exponent,
        p: find_tag(xml, "P"),
        q: find_tag(xml, "Q"),
        dp: find_tag(xml, "DP"),
        dq: find_tag(xml, "DQ"),
        inverse_q: find_tag(xml, "InverseQ"),
        d: find_tag(xml, "D"),
    })
}

/// Loads a public key from an `<RSAKeyValue>` element.
pub fn load_public_key(xml: &str) -> Option<RsaPublicKey> {
    let c = parse(xml)?;
    RsaPublicKey::new(c.modulus, c.exponent).ok()
}

/// Loads a private key from an `<RSAKeyValue>` element carrying `P`, `Q`,
/// and `D` (and optionally the CRT helpers, which this crate recomputes
/// rather than trusting, since `crt_coefficient`/`precompute` already derive
/// them from `p`, `q`, `d`).
pub fn load_private_key(xml: &str) -> Option<RsaPrivateKey> {
    let c = parse(xml)?;
    let (p, q, d) = (c.p?, c.q?, c.d?);
    RsaPrivateKey::from_components(c.modulus, c.exponent, d, vec![p, q]).ok()
}

fn tag(name: &str, value: &BigUint) -> String {
    format!("<{name}>{}</{name}>", STANDARD.encode(value.to_bytes_be()))
}

/// Serializes a public key as `<RSAKeyValue><Modulus>..</Modulus><Exponent>..</Exponent></RSAKeyValue>`.
pub fn save_public_key(key: &RsaPublicKey) -> Result<String> {
    Ok(format!(
        "<RSAKeyValue>{}{}</RSAKeyValue>",
        tag("Modulus", key.n()),
        tag("Exponent", key.e())
    ))
}

/// Serializes a private key with the full `P`/`Q`/`DP`/`DQ`/`InverseQ`/`D` set.
pub fn save_private_key(key: &RsaPrivateKey) -> Result<String> {
    if key.primes().len() != 2 {
        return Err(Error::UnsupportedAlgorithm);
    }
    let p = &key.primes()[0];
    let q = &key.primes()[1];
    let dp = key.dp().ok_or(Error::Internal)?;
    let dq = key.dq().ok_or(Error::Internal)?;
    let qinv = key.qinv().ok_or(Error::Internal)?;

    Ok(format!(
        "<RSAKeyValue>{}{}{}{}{}{}{}{}</RSAKeyValue>",
        tag("Modulus", key.n()),
        tag("Exponent", key.e()),
        tag("P", p),
        tag("Q", q),
        tag("DP", dp),
        tag("DQ", dq),
        tag("InverseQ", qinv),
        tag("D", key.d()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_public_key_value() {
        let xml = "<RSAKeyValue><Modulus>AAMACw==</Modulus><Exponent>AQAB</Exponent></RSAKeyValue>";
        let key = load_public_key(xml).unwrap();
        assert_eq!(key.e(), &BigUint::from(65537u32));
    }

    #[test]
    fn case_insensitive_tag_matching() {
        let xml =
            "<rsakeyvalue><modulus>AAMACw==</modulus><exponent>AQAB</exponent></rsakeyvalue>";
        assert!(load_public_key(xml).is_some());
    }

    #[test]
    fn save_then_load_round_trips_public_key() {
        let key = RsaPublicKey::new(BigUint::from(3233u32), BigUint::from(17u32)).unwrap();
        let xml = save_public_key(&key).unwrap();
        let loaded = load_public_key(&xml).unwrap();
        assert_eq!(loaded.n(), key.n());
        assert_eq!(loaded.e(), key.e());
    }
}
