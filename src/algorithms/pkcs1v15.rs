//! `PaddingPkcs1v15Enc` and `EmsaPkcs1v15` (spec.md §4.3, §4.5; RFC 3447 §8.2,
//! §9.2).

use rand_core::CryptoRngCore;
use subtle::{Choice, ConstantTimeEq};

use crate::errors::{Error, Result};
use crate::hash::HashAlg;

/// Block type used by `EME-PKCS1-v1_5` encryption padding (spec.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockType {
    /// Type 1: legacy private-key "encryption" (signature-shaped), `PS = 0xFF...`.
    Type1,
    /// Type 2: public-key encryption, `PS` = nonzero random bytes.
    Type2,
}

/// Fills `data` with random bytes, resampling any byte that comes out zero.
fn non_zero_random_bytes<R: CryptoRngCore + ?Sized>(rng: &mut R, data: &mut [u8]) {
    rng.fill_bytes(data);
    for byte in data.iter_mut() {
        while *byte == 0 {
            rng.fill_bytes(core::slice::from_mut(byte));
        }
    }
}

/// `EME-PKCS1-v1_5` encode (spec.md §4.3). Rejects `msg` longer than `k - 11`.
pub(crate) fn pkcs1v15_encrypt_pad<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    msg: &[u8],
    k: usize,
    block_type: BlockType,
) -> Result<Vec<u8>> {
    if msg.len() > k.saturating_sub(11) {
        return Err(Error::MessageTooLong);
    }

    let mut em = vec![0u8; k];
    em[0] = 0x00;
    em[1] = match block_type {
        BlockType::Type1 => 0x01,
        BlockType::Type2 => 0x02,
    };

    let ps_end = k - msg.len() - 1;
    match block_type {
        BlockType::Type1 => em[2..ps_end].fill(0xFF),
        BlockType::Type2 => non_zero_random_bytes(rng, &mut em[2..ps_end]),
    }
    em[ps_end] = 0x00;
    em[k - msg.len()..].copy_from_slice(msg);

    Ok(em)
}

/// `EME-PKCS1-v1_5` decode (spec.md §4.3). Accepts block type 0, 1, or 2 in
/// the second byte for interop, and requires `|PS| >= 8` (separator at index
/// `>= 10`).
pub(crate) fn pkcs1v15_decrypt_pad(em: &[u8]) -> Result<Vec<u8>> {
    if em.len() < 11 {
        return Err(Error::Decryption);
    }

    let first_byte_ok = em[0].ct_eq(&0x00);
    let second_byte_ok = em[1].ct_eq(&0x00) | em[1].ct_eq(&0x01) | em[1].ct_eq(&0x02);

    let rest = &em[2..];
    let mut found = Choice::from(0u8);
    let mut sep_index = 0usize;
    for (i, byte) in rest.iter().enumerate() {
        let is_zero = byte.ct_eq(&0x00);
        let take_here = !found & is_zero;
        sep_index = usize::conditional_select_ct(sep_index, i, take_here);
        found |= take_here;
    }

    // |PS| >= 8 means the separator (0-indexed within `rest`) is at index >= 8.
    let len_ok = Choice::from((sep_index >= 8) as u8);

    let ok = first_byte_ok & second_byte_ok & found & len_ok;
    if !bool::from(ok) {
        return Err(Error::Decryption);
    }

    Ok(rest[sep_index + 1..].to_vec())
}

/// Small local helper since `subtle::ConditionallySelectable` isn't
/// implemented for `usize` the way it is for fixed-width integers here.
pub(crate) trait ConditionallySelectCt: Sized + Copy {
    fn conditional_select_ct(a: Self, b: Self, choice: Choice) -> Self;
}

impl ConditionallySelectCt for usize {
    fn conditional_select_ct(a: Self, b: Self, choice: Choice) -> Self {
        if bool::from(choice) {
            b
        } else {
            a
        }
    }
}

/// `EMSA-PKCS1-v1_5` encode (spec.md §4.5): hash `message`, prepend the fixed
/// DigestInfo prefix for `hash_alg`, and PKCS#1-v1.5-type-1-pad to `em_len`
/// bytes. Rejects if the modulus is too short to hold the DigestInfo and hash.
pub(crate) fn emsa_pkcs1v15_encode(message: &[u8], em_len: usize, hash_alg: HashAlg) -> Result<Vec<u8>> {
    let prefix = hash_alg.digest_info_prefix();
    let hashed = hash_alg.digest(message);
    let t_len = prefix.len() + hashed.len();

    if em_len < t_len + 11 {
        return Err(Error::LengthError);
    }

    let mut em = vec![0u8; em_len];
    em[0] = 0x00;
    em[1] = 0x01;
    em[2..em_len - t_len - 1].fill(0xFF);
    em[em_len - t_len - 1] = 0x00;
    em[em_len - t_len..em_len - hashed.len()].copy_from_slice(&prefix);
    em[em_len - hashed.len()..].copy_from_slice(&hashed);

    Ok(em)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    #[test]
    fn encrypt_pad_round_trips() {
        let mut rng = ChaCha8Rng::from_seed([5; 32]);
        let k = 128;
        let em = pkcs1v15_encrypt_pad(&mut rng, b"hello", k, BlockType::Type2).unwrap();
        assert_eq!(em.len(), k);
        assert_eq!(pkcs1v15_decrypt_pad(&em).unwrap(), b"hello");
    }

    #[test]
    fn message_too_long_rejected() {
        let mut rng = ChaCha8Rng::from_seed([5; 32]);
        let k = 32;
        let msg = vec![0u8; k - 10];
        assert_eq!(
            pkcs1v15_encrypt_pad(&mut rng, &msg, k, BlockType::Type2).unwrap_err(),
            Error::MessageTooLong
        );
    }

    #[test]
    fn boundary_ps_length_seven_rejected_eight_accepted() {
        // em = 00 || 02 || PS (len n) || 00 || M, |PS| = 7 -> separator at rest-index 7 (< 8): reject.
        let mut em = vec![0u8; 11];
        em[1] = 0x02;
        for b in &mut em[2..9] {
            *b = 0xAB;
        }
        em[9] = 0x00;
        em[10] = 0x42;
        assert!(pkcs1v15_decrypt_pad(&em).is_err());

        let mut em8 = vec![0u8; 12];
        em8[1] = 0x02;
        for b in &mut em8[2..10] {
            *b = 0xAB;
        }
        em8[10] = 0x00;
        em8[11] = 0x42;
        assert_eq!(pkcs1v15_decrypt_pad(&em8).unwrap(), vec![0x42]);
    }

    #[test]
    fn emsa_round_trip_prefix_present() {
        let em = emsa_pkcs1v15_encode(b"hello", 128, HashAlg::Sha256).unwrap();
        assert_eq!(em.len(), 128);
        assert_eq!(em[0], 0x00);
        assert_eq!(em[1], 0x01);
    }

    #[test]
    fn emsa_rejects_too_short_modulus() {
        assert_eq!(
            emsa_pkcs1v15_encode(b"hello", 30, HashAlg::Sha512).unwrap_err(),
            Error::LengthError
        );
    }
}
