//! Length-checked constant-time byte comparison.
//!
//! Every comparison of decrypted, padded, or hashed material in this crate
//! goes through [`eq`] rather than `==`. A plain slice `==` on secret-derived
//! bytes is a bug: reviewers should flag it on sight.

use subtle::ConstantTimeEq;

/// Returns `false` immediately if `a` and `b` differ in length (that
/// comparison is on public lengths, not secret content). Otherwise ORs
/// `a_i XOR b_i` across every byte and returns whether the accumulator is
/// zero, without branching on the byte values themselves.
#[inline]
pub fn eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::eq;

    #[test]
    fn equal_slices() {
        assert!(eq(b"hello world", b"hello world"));
    }

    #[test]
    fn different_lengths() {
        assert!(!eq(b"short", b"much longer input"));
    }

    #[test]
    fn single_bit_flip() {
        assert!(!eq(b"hello world", b"hello worle"));
    }

    #[test]
    fn empty_slices() {
        assert!(eq(b"", b""));
    }
}
