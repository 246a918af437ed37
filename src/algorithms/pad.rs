//! I2OSP/OS2IP (spec.md §4.7) and left-padding helpers for `BigUint` <-> bytes
//! conversions.

use num_bigint_dig::BigUint;

use crate::errors::{Error, Result};

/// Returns a new vector of the given length, with the input left-padded by
/// zero bytes. Rejects inputs longer than `padded_len` (I2OSP overflow).
#[inline]
pub(crate) fn left_pad(input: &[u8], padded_len: usize) -> Result<Vec<u8>> {
    if input.len() > padded_len {
        return Err(Error::LengthError);
    }

    let mut out = vec![0u8; padded_len];
    out[padded_len - input.len()..].copy_from_slice(input);
    Ok(out)
}

/// I2OSP: converts `input` to a big-endian byte vector of exactly
/// `padded_len` bytes, left-padded with zeros. Fails if `input` does not fit.
#[inline]
pub(crate) fn uint_to_be_pad(input: &BigUint, padded_len: usize) -> Result<Vec<u8>> {
    left_pad(&input.to_bytes_be(), padded_len)
}

/// OS2IP: converts a big-endian byte string to a non-negative integer.
#[inline]
pub(crate) fn os2ip(input: &[u8]) -> BigUint {
    BigUint::from_bytes_be(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_pad_prepends_zeros() {
        assert_eq!(left_pad(&[1, 2, 3], 5).unwrap(), vec![0, 0, 1, 2, 3]);
    }

    #[test]
    fn left_pad_exact_length_is_noop() {
        assert_eq!(left_pad(&[1, 2, 3], 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn left_pad_too_long_errors() {
        assert!(left_pad(&[1, 2, 3, 4], 2).is_err());
    }

    #[test]
    fn i2osp_os2ip_round_trip() {
        let n = BigUint::from(123456789u64);
        let bytes = uint_to_be_pad(&n, 8).unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(os2ip(&bytes), n);
    }
}
