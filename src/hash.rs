//! Runtime-selectable hash algorithm, mirroring spec's `hashName` enum
//! (`md2`, `md5`, `sha1`, `sha256`, `sha384`, `sha512`, default `sha1`).
//!
//! The teacher crate picks its hash function at compile time via a generic
//! `D: Digest` parameter (see `Pkcs1v15Sign::new::<D>()`). This crate's data
//! model instead carries the hash selection *inside* the key (`RsaKey::hash`,
//! settable at runtime with `setHash`), so dispatch happens through this
//! enum rather than monomorphization. [`DynDigest`] still does the actual
//! hashing — only the choice of which concrete digest type backs it is
//! deferred to runtime.

use const_oid::ObjectIdentifier;
use digest::{Digest, DynDigest};

use crate::errors::{Error, Result};

/// A hash algorithm selectable via `RsaKey::set_hash` / `set_mgf_hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlg {
    Md2,
    Md5,
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl Default for HashAlg {
    /// Matches spec's default hash, `sha1`.
    fn default() -> Self {
        HashAlg::Sha1
    }
}

impl HashAlg {
    /// Parses one of the lowercase names spec's `hashName` enumerates.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "md2" => Ok(HashAlg::Md2),
            "md5" => Ok(HashAlg::Md5),
            "sha1" => Ok(HashAlg::Sha1),
            "sha256" => Ok(HashAlg::Sha256),
            "sha384" => Ok(HashAlg::Sha384),
            "sha512" => Ok(HashAlg::Sha512),
            _ => Err(Error::UnsupportedAlgorithm),
        }
    }

    /// Output length `hLen` of this hash, in bytes.
    pub fn output_len(self) -> usize {
        match self {
            HashAlg::Md2 | HashAlg::Md5 => 16,
            HashAlg::Sha1 => 20,
            HashAlg::Sha256 => 32,
            HashAlg::Sha384 => 48,
            HashAlg::Sha512 => 64,
        }
    }

    /// A fresh, owned digest instance, boxed as a trait object so the
    /// concrete hash type chosen at runtime is erased from callers.
    pub fn new_digest(self) -> Box<dyn DynDigest + Send + Sync> {
        match self {
            HashAlg::Md2 => Box::new(md2::Md2::new()),
            HashAlg::Md5 => Box::new(md5::Md5::new()),
            HashAlg::Sha1 => Box::new(sha1::Sha1::new()),
            HashAlg::Sha256 => Box::new(sha2::Sha256::new()),
            HashAlg::Sha384 => Box::new(sha2::Sha384::new()),
            HashAlg::Sha512 => Box::new(sha2::Sha512::new()),
        }
    }

    /// One-shot hash of `data`.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        let mut d = self.new_digest();
        d.update(data);
        d.finalize_reset().to_vec()
    }

    /// The digest algorithm's own OID (as embedded in a DigestInfo
    /// `AlgorithmIdentifier`, and as used to pick the PBES1 KDF hash).
    pub fn oid(self) -> ObjectIdentifier {
        match self {
            HashAlg::Md2 => ObjectIdentifier::new_unwrap("1.2.840.113549.2.2"),
            HashAlg::Md5 => ObjectIdentifier::new_unwrap("1.2.840.113549.2.5"),
            HashAlg::Sha1 => ObjectIdentifier::new_unwrap("1.3.14.3.2.26"),
            HashAlg::Sha256 => ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1"),
            HashAlg::Sha384 => ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.2"),
            HashAlg::Sha512 => ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3"),
        }
    }

    /// DigestInfo algorithm-identifier prefix for EMSA-PKCS1-v1_5 (RFC 3447
    /// §9.2): `SEQUENCE { SEQUENCE { OID, NULL }, OCTET STRING }`, truncated
    /// before the OCTET STRING's content octets (those are the hash itself).
    pub fn digest_info_prefix(self) -> Vec<u8> {
        let oid = self.oid();
        let oid_bytes = oid.as_bytes();
        let oid_len = oid_bytes.len() as u8;
        let digest_len = self.output_len() as u8;

        let mut v = Vec::with_capacity(oid_bytes.len() + 10);
        v.push(0x30);
        v.push(oid_len + 8 + digest_len);
        v.push(0x30);
        v.push(oid_len + 4);
        v.push(0x06);
        v.push(oid_len);
        v.extend_from_slice(oid_bytes);
        v.extend_from_slice(&[0x05, 0x00, 0x04, digest_len]);
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_names() {
        for (name, alg) in [
            ("md2", HashAlg::Md2),
            ("md5", HashAlg::Md5),
            ("sha1", HashAlg::Sha1),
            ("sha256", HashAlg::Sha256),
            ("sha384", HashAlg::Sha384),
            ("sha512", HashAlg::Sha512),
            ("SHA256", HashAlg::Sha256),
        ] {
            assert_eq!(HashAlg::from_name(name).unwrap(), alg);
        }
        assert!(HashAlg::from_name("sha3-256").is_err());
    }

    #[test]
    fn output_lengths_match_known_digests() {
        assert_eq!(HashAlg::Sha1.output_len(), HashAlg::Sha1.digest(b"x").len());
        assert_eq!(
            HashAlg::Sha256.output_len(),
            HashAlg::Sha256.digest(b"x").len()
        );
    }

    #[test]
    fn digest_info_prefix_length_matches_rfc3447_layout() {
        // SEQUENCE tag+len, SEQUENCE tag+len, OID tag+len+bytes, NULL, OCTET STRING tag+len
        let p = HashAlg::Sha256.digest_info_prefix();
        assert_eq!(p[0], 0x30);
        assert_eq!(p.len(), p[1] as usize + 2);
    }
}
