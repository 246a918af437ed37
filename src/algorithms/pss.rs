//! `EmsaPss` — PSS encode/verify (spec.md §4.4, RFC 3447 §8.1/§9.1).

use rand_core::CryptoRngCore;
use subtle::{Choice, ConstantTimeEq};

use super::mgf1::mgf1_xor;
use crate::const_time;
use crate::errors::{Error, Result};
use crate::hash::HashAlg;

/// `EMSA-PSS-ENCODE` (spec.md §4.4). `em_bits` is the target encoded-message
/// bit length (`8k - 1` for a signature sized to modulus `k`).
pub(crate) fn emsa_pss_encode<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    message: &[u8],
    em_bits: usize,
    salt_len: usize,
    hash_alg: HashAlg,
) -> Result<Vec<u8>> {
    let h_len = hash_alg.output_len();
    let em_len = em_bits.div_ceil(8);
    let m_hash = hash_alg.digest(message);

    if em_len < h_len + salt_len + 2 {
        return Err(Error::LengthError);
    }

    let mut salt = vec![0u8; salt_len];
    rng.fill_bytes(&mut salt);

    // M' = 0^8 || mHash || salt ; H = Hash(M')
    let mut digest = hash_alg.new_digest();
    digest.update(&[0u8; 8]);
    digest.update(&m_hash);
    digest.update(&salt);
    let h = digest.finalize_reset().to_vec();

    // DB = 0^{emLen-sLen-hLen-2} || 0x01 || salt
    let db_len = em_len - h_len - 1;
    let mut db = vec![0u8; db_len];
    db[db_len - salt_len - 1] = 0x01;
    db[db_len - salt_len..].copy_from_slice(&salt);

    let mut mgf_digest = hash_alg.new_digest();
    mgf1_xor(&mut db, &mut *mgf_digest, &h)?;

    // Clear the top 8*emLen - emBits bits of the leftmost octet of maskedDB.
    let num_extra_bits = 8 * em_len - em_bits;
    if num_extra_bits > 0 {
        db[0] &= 0xFFu8 >> num_extra_bits;
    }

    let mut em = Vec::with_capacity(em_len);
    em.extend_from_slice(&db);
    em.extend_from_slice(&h);
    em.push(0xBC);

    Ok(em)
}

/// `EMSA-PSS-VERIFY` (spec.md §4.4). Reconstructs `H` from the recovered
/// `DB`/salt and compares it against the embedded `H` via [`const_time::eq`].
pub(crate) fn emsa_pss_verify(
    message: &[u8],
    em: &[u8],
    em_bits: usize,
    salt_len: usize,
    hash_alg: HashAlg,
) -> Result<()> {
    let h_len = hash_alg.output_len();
    let em_len = em_bits.div_ceil(8);
    let m_hash = hash_alg.digest(message);

    if em_len < h_len + salt_len + 2 || em.len() != em_len {
        return Err(Error::Verification);
    }
    if em[em_len - 1] != 0xBC {
        return Err(Error::Verification);
    }

    let num_extra_bits = 8 * em_len - em_bits;
    if num_extra_bits > 0 && (em[0] >> (8 - num_extra_bits)) != 0 {
        return Err(Error::Verification);
    }

    let db_len = em_len - h_len - 1;
    let mut db = em[..db_len].to_vec();
    let h = &em[db_len..db_len + h_len];

    let mut mgf_digest = hash_alg.new_digest();
    mgf1_xor(&mut db, &mut *mgf_digest, h)?;
    if num_extra_bits > 0 {
        db[0] &= 0xFFu8 >> num_extra_bits;
    }

    let ps_len = db_len - salt_len - 1;
    let ps_zero: Choice = db[..ps_len]
        .iter()
        .fold(Choice::from(1u8), |acc, b| acc & b.ct_eq(&0u8));
    let separator_ok = db[ps_len].ct_eq(&0x01);
    let salt = &db[ps_len + 1..];

    let mut digest = hash_alg.new_digest();
    digest.update(&[0u8; 8]);
    digest.update(&m_hash);
    digest.update(salt);
    let h_prime = digest.finalize_reset().to_vec();

    let hash_ok = const_time::eq(h, &h_prime);

    if !(bool::from(ps_zero & separator_ok) && hash_ok) {
        return Err(Error::Verification);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    #[test]
    fn encode_verify_round_trip() {
        let mut rng = ChaCha8Rng::from_seed([11; 32]);
        let em_bits = 8 * 128 - 1;
        let em = emsa_pss_encode(&mut rng, b"hello", em_bits, 32, HashAlg::Sha256).unwrap();
        assert!(emsa_pss_verify(b"hello", &em, em_bits, 32, HashAlg::Sha256).is_ok());
    }

    #[test]
    fn top_bit_cleared_when_embits_not_byte_aligned() {
        let mut rng = ChaCha8Rng::from_seed([12; 32]);
        let em_bits = 8 * 128 - 1;
        let em = emsa_pss_encode(&mut rng, b"hello", em_bits, 32, HashAlg::Sha256).unwrap();
        assert_eq!(em[0] & 0x80, 0);
    }

    #[test]
    fn wrong_trailing_byte_fails() {
        let mut rng = ChaCha8Rng::from_seed([13; 32]);
        let em_bits = 8 * 128 - 1;
        let mut em = emsa_pss_encode(&mut rng, b"hello", em_bits, 32, HashAlg::Sha256).unwrap();
        *em.last_mut().unwrap() = 0x00;
        assert!(emsa_pss_verify(b"hello", &em, em_bits, 32, HashAlg::Sha256).is_err());
    }

    #[test]
    fn empty_message_with_salt_len_32() {
        let mut rng = ChaCha8Rng::from_seed([14; 32]);
        let em_bits = 8 * 128 - 1;
        let em = emsa_pss_encode(&mut rng, b"", em_bits, 32, HashAlg::Sha256).unwrap();
        assert!(emsa_pss_verify(b"", &em, em_bits, 32, HashAlg::Sha256).is_ok());
    }
}
