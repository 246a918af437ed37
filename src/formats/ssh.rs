//! SSH wire format for RSA public keys (spec.md §6), used only for
//! `getPublicKeyFingerprint`; OpenSSH/PuTTY private-key *files* are
//! out of scope (spec.md §1).

use num_bigint_dig::BigUint;

use crate::key::RsaPublicKey;
use crate::traits::PublicKeyParts;

const KEY_TYPE: &[u8] = b"ssh-rsa";

fn write_field(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
}

/// Encodes a `BigUint` as an SSH "mpint": big-endian bytes, with a leading
/// `0x00` inserted if the high bit of the first byte would otherwise be set
/// (spec.md §6: "big-endian with leading sign byte").
fn mpint(n: &BigUint) -> Vec<u8> {
    let mut bytes = n.to_bytes_be();
    if bytes.is_empty() {
        bytes.push(0);
    } else if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    bytes
}

/// `uint32 len || "ssh-rsa" || uint32 len || e || uint32 len || n` (spec.md
/// §6), the wire format fingerprints are computed over.
pub fn encode_public_key(key: &RsaPublicKey) -> Vec<u8> {
    let mut out = Vec::new();
    write_field(&mut out, KEY_TYPE);
    write_field(&mut out, &mpint(key.e()));
    write_field(&mut out, &mpint(key.n()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_key_type_prefix() {
        let key = RsaPublicKey::new_unchecked(BigUint::from(3233u32), BigUint::from(17u32));
        let wire = encode_public_key(&key);
        assert_eq!(&wire[0..4], &7u32.to_be_bytes());
        assert_eq!(&wire[4..11], KEY_TYPE);
    }

    #[test]
    fn mpint_adds_sign_byte_for_high_bit() {
        let n = BigUint::from(0xFFu32);
        let encoded = mpint(&n);
        assert_eq!(encoded, vec![0x00, 0xFF]);
    }
}
