//! PKCS#1 key format (spec.md §4.9, RFC 3447 Appendix A): `RSAPrivateKey`
//! and `RSAPublicKey` DER, restricted to the two-prime case (this crate's
//! multi-prime keys round-trip through PKCS#8 `OtherPrimeInfos` instead;
//! PKCS#1 proper predates that extension in most deployed tooling).

use der::asn1::UintRef;
use der::{Decode, Encode, Sequence};
use num_bigint_dig::BigUint;

use crate::errors::{Error, Result};
use crate::key::{RsaPrivateKey, RsaPublicKey};
use crate::traits::{PrivateKeyParts, PublicKeyParts};

/// `RSAPrivateKey ::= SEQUENCE` (RFC 3447 Appendix A.1.2), two-prime form
/// (`version` = 0).
#[derive(Sequence)]
struct Pkcs1PrivateKey<'a> {
    version: u8,
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
    private_exponent: UintRef<'a>,
    prime1: UintRef<'a>,
    prime2: UintRef<'a>,
    exponent1: UintRef<'a>,
    exponent2: UintRef<'a>,
    coefficient: UintRef<'a>,
}

/// `RSAPublicKey ::= SEQUENCE` (RFC 3447 Appendix A.1.1).
#[derive(Sequence)]
struct Pkcs1PublicKey<'a> {
    modulus: UintRef<'a>,
    public_exponent: UintRef<'a>,
}

fn uint_ref(bytes: &[u8]) -> Result<UintRef<'_>> {
    UintRef::new(bytes).map_err(|_| Error::MalformedKey)
}

/// Decodes an `RSAPrivateKey` DER document.
pub fn load_private_key(der: &[u8]) -> Result<RsaPrivateKey> {
    let parsed = Pkcs1PrivateKey::from_der(der).map_err(|_| Error::MalformedKey)?;
    if parsed.version != 0 {
        // Multi-prime `OtherPrimeInfos` not supported at the PKCS#1 layer.
        return Err(Error::UnsupportedAlgorithm);
    }

    let n = BigUint::from_bytes_be(parsed.modulus.as_bytes());
    let e = BigUint::from_bytes_be(parsed.public_exponent.as_bytes());
    let d = BigUint::from_bytes_be(parsed.private_exponent.as_bytes());
    let p = BigUint::from_bytes_be(parsed.prime1.as_bytes());
    let q = BigUint::from_bytes_be(parsed.prime2.as_bytes());

    let key = RsaPrivateKey::from_components(n, e, d, vec![p, q])?;
    Ok(key)
}

/// Decodes an `RSAPublicKey` DER document.
pub fn load_public_key(der: &[u8]) -> Result<RsaPublicKey> {
    let parsed = Pkcs1PublicKey::from_der(der).map_err(|_| Error::MalformedKey)?;
    let n = BigUint::from_bytes_be(parsed.modulus.as_bytes());
    let e = BigUint::from_bytes_be(parsed.public_exponent.as_bytes());
    RsaPublicKey::new(n, e)
}

/// Encodes a private key as `RSAPrivateKey` DER. Requires exactly two
/// primes; returns [`Error::UnsupportedAlgorithm`] for multi-prime keys.
pub fn save_private_key(key: &RsaPrivateKey) -> Result<Vec<u8>> {
    if key.primes().len() != 2 {
        return Err(Error::UnsupportedAlgorithm);
    }

    let n = key.n().to_bytes_be();
    let e = key.e().to_bytes_be();
    let d = key.d().to_bytes_be();
    let p = key.primes()[0].to_bytes_be();
    let q = key.primes()[1].to_bytes_be();
    let dp = key.dp().ok_or(Error::Internal)?.to_bytes_be();
    let dq = key.dq().ok_or(Error::Internal)?.to_bytes_be();
    let qinv = key.qinv().ok_or(Error::Internal)?.to_bytes_be();

    let doc = Pkcs1PrivateKey {
        version: 0,
        modulus: uint_ref(&n)?,
        public_exponent: uint_ref(&e)?,
        private_exponent: uint_ref(&d)?,
        prime1: uint_ref(&p)?,
        prime2: uint_ref(&q)?,
        exponent1: uint_ref(&dp)?,
        exponent2: uint_ref(&dq)?,
        coefficient: uint_ref(&qinv)?,
    };

    doc.to_der().map_err(|_| Error::Internal)
}

/// Encodes a public key as `RSAPublicKey` DER.
pub fn save_public_key(key: &RsaPublicKey) -> Result<Vec<u8>> {
    let n = key.n().to_bytes_be();
    let e = key.e().to_bytes_be();
    let doc = Pkcs1PublicKey {
        modulus: uint_ref(&n)?,
        public_exponent: uint_ref(&e)?,
    };
    doc.to_der().map_err(|_| Error::Internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_key() -> RsaPrivateKey {
        RsaPrivateKey::from_p_q(
            BigUint::from(61u32),
            BigUint::from(53u32),
            BigUint::from(17u32),
        )
        .unwrap()
    }

    #[test]
    fn public_key_round_trips() {
        let pub_key = small_key().to_public_key();
        let der = save_public_key(&pub_key).unwrap();
        let loaded = load_public_key(&der).unwrap();
        assert_eq!(loaded.n(), pub_key.n());
        assert_eq!(loaded.e(), pub_key.e());
    }

    #[test]
    fn private_key_round_trips() {
        let key = small_key();
        let der = save_private_key(&key).unwrap();
        let loaded = load_private_key(&der).unwrap();
        assert_eq!(loaded, key);
    }
}
