//! `Mgf1` — Mask Generation Function 1 (spec.md §4.1, RFC 3447 Appendix B.2.1).

use digest::DynDigest;

use crate::errors::{Error, Result};

/// Largest mask length this implementation will produce, matching the
/// teacher's existing OAEP/PSS label-length ceiling of 2^61 rather than the
/// full 2^32 * hLen RFC bound — both are far beyond any in-memory message.
const MAX_MASK_LEN: u64 = 1 << 61;

/// Produces `mask_len` bytes by concatenating `H(seed || I2OSP(i, 4))` for
/// `i = 0, 1, ...` and truncating to length, per spec.md §4.1.
pub(crate) fn mgf1(seed: &[u8], mask_len: usize, digest: &mut dyn DynDigest) -> Result<Vec<u8>> {
    if mask_len as u64 > MAX_MASK_LEN {
        return Err(Error::LengthError);
    }

    let h_len = digest.output_size();
    let mut out = Vec::with_capacity(mask_len + h_len);
    let mut counter: u32 = 0;

    while out.len() < mask_len {
        digest.update(seed);
        digest.update(&counter.to_be_bytes());
        out.extend_from_slice(&digest.finalize_reset());
        counter = counter.checked_add(1).ok_or(Error::LengthError)?;
    }

    out.truncate(mask_len);
    Ok(out)
}

/// XORs `mgf1(seed, data.len())` into `data` in place.
pub(crate) fn mgf1_xor(data: &mut [u8], digest: &mut dyn DynDigest, seed: &[u8]) -> Result<()> {
    let mask = mgf1(seed, data.len(), digest)?;
    for (d, m) in data.iter_mut().zip(mask.iter()) {
        *d ^= *m;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha1::Sha1;

    #[test]
    fn mgf1_truncates_to_requested_length() {
        let mut digest: Box<dyn DynDigest> = Box::new(<Sha1 as digest::Digest>::new());
        let out = mgf1(b"seed", 5, &mut *digest).unwrap();
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn mgf1_is_deterministic() {
        let mut d1: Box<dyn DynDigest> = Box::new(<Sha1 as digest::Digest>::new());
        let mut d2: Box<dyn DynDigest> = Box::new(<Sha1 as digest::Digest>::new());
        let a = mgf1(b"seed", 37, &mut *d1).unwrap();
        let b = mgf1(b"seed", 37, &mut *d2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn mgf1_xor_is_involution() {
        let mut digest: Box<dyn DynDigest> = Box::new(<Sha1 as digest::Digest>::new());
        let mut data = b"hello world this is a test".to_vec();
        let original = data.clone();
        mgf1_xor(&mut data, &mut *digest, b"seed").unwrap();
        assert_ne!(data, original);
        mgf1_xor(&mut data, &mut *digest, b"seed").unwrap();
        assert_eq!(data, original);
    }
}
