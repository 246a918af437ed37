//! Raw key format (spec.md §4.9): an ordered pair or keyed mapping exposing
//! modulus and exponent, no prime material. Accepted key names:
//! `{e, exponent, publicExponent, 0}` for the exponent and
//! `{n, modulo, modulus, 1}` for the modulus.

use num_bigint_dig::BigUint;

use crate::errors::{Error, Result};
use crate::key::RsaPublicKey;

/// A single named or positional component as spec.md §4.9 describes.
#[derive(Debug, Clone)]
pub enum RawField<'a> {
    Named(&'a str, &'a [u8]),
    Positional(usize, &'a [u8]),
}

const EXPONENT_NAMES: [&str; 3] = ["e", "exponent", "publicexponent"];
const MODULUS_NAMES: [&str; 3] = ["n", "modulo", "modulus"];

/// Loads a public key from a pair of raw components, matching the name/
/// index sets spec.md §4.9 lists. Returns `None` on no match, mirroring
/// `load`'s "returns `none`/`false` on malformed input" contract (spec.md §7).
pub fn load(fields: &[RawField<'_>]) -> Option<RsaPublicKey> {
    let mut e: Option<BigUint> = None;
    let mut n: Option<BigUint> = None;

    for field in fields {
        match field {
            RawField::Named(name, bytes) => {
                let lower = name.to_ascii_lowercase();
                if EXPONENT_NAMES.contains(&lower.as_str()) {
                    e = Some(BigUint::from_bytes_be(bytes));
                } else if MODULUS_NAMES.contains(&lower.as_str()) {
                    n = Some(BigUint::from_bytes_be(bytes));
                }
            }
            RawField::Positional(0, bytes) => e = Some(BigUint::from_bytes_be(bytes)),
            RawField::Positional(1, bytes) => n = Some(BigUint::from_bytes_be(bytes)),
            RawField::Positional(_, _) => {}
        }
    }

    match (n, e) {
        (Some(n), Some(e)) => RsaPublicKey::new(n, e).ok(),
        _ => None,
    }
}

/// Serializes a public key as the `{n, e}` keyed pair.
pub fn save_public_key(key: &RsaPublicKey) -> Result<Vec<(&'static str, Vec<u8>)>> {
    use crate::traits::PublicKeyParts;
    Ok(vec![
        ("n", key.n().to_bytes_be()),
        ("e", key.e().to_bytes_be()),
    ])
}
