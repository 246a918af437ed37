//! End-to-end scenarios exercising the public [`rsa_pure::RsaKey`] API
//! across encryption, signing, and key-format round trips.

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rsa_pure::{EncryptionMode, HashAlg, KeyFormat, RsaKey, RsaPublicKey, SignatureMode};

fn generated_key(seed: u64, bits: usize) -> RsaKey {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut key = RsaKey::new();
    key.generate(&mut rng, bits, None).unwrap();
    key
}

#[test]
fn oaep_sha256_round_trip_of_hello() {
    let mut key = generated_key(100, 1024);
    key.set_hash(HashAlg::Sha256);
    let mut rng = ChaCha8Rng::seed_from_u64(101);

    let ciphertext = key.encrypt(&mut rng, b"hello").unwrap();
    let plaintext = key.decrypt(&mut rng, &ciphertext).unwrap();
    assert_eq!(plaintext, b"hello");
}

#[test]
fn pkcs1v15_round_trip_at_the_block_boundary() {
    // k = 1024 / 8 = 128 bytes, so the single-block boundary is k - 11 = 117.
    let mut key = generated_key(110, 1024);
    key.set_encryption_mode(EncryptionMode::Pkcs1);
    let mut rng = ChaCha8Rng::seed_from_u64(111);

    let at_boundary = vec![0x5Au8; 117];
    let ciphertext = key.encrypt(&mut rng, &at_boundary).unwrap();
    assert_eq!(ciphertext.len(), 128, "a boundary message fits one block");
    let plaintext = key.decrypt(&mut rng, &ciphertext).unwrap();
    assert_eq!(plaintext, at_boundary);

    // One byte over spills into a second block rather than erroring: the
    // top-level RsaKey::encrypt chunks arbitrarily long input. The strict
    // too-long rejection lives one layer down, in the single-block
    // EME-PKCS1-v1_5 encoder (see
    // algorithms::pkcs1v15::message_too_long_rejected).
    let over_boundary = vec![0x5Au8; 118];
    let ciphertext = key.encrypt(&mut rng, &over_boundary).unwrap();
    assert_eq!(ciphertext.len(), 256, "spills into a second k-byte block");
    let plaintext = key.decrypt(&mut rng, &ciphertext).unwrap();
    assert_eq!(plaintext, over_boundary);
}

#[test]
fn pss_sha256_sign_verify_over_empty_message_with_salt_len_32() {
    use rsa_pure::{Pss, SignatureScheme};

    let key = generated_key(120, 1024);
    let priv_key = key.get_private_key().unwrap();
    let pub_key = key.get_public_key().unwrap();

    let scheme = Pss::new_with_salt_len(HashAlg::Sha256, 32);
    let mut rng = ChaCha8Rng::seed_from_u64(121);
    let sig = scheme.sign(&mut rng, priv_key, b"").unwrap();
    assert!(scheme.verify(pub_key, b"", &sig).is_ok());
}

#[test]
fn pkcs1v15_sha1_signature_rejects_a_single_flipped_byte() {
    let mut key = generated_key(130, 1024);
    key.set_signature_mode(SignatureMode::Pkcs1);
    key.set_hash(HashAlg::Sha1);
    let mut rng = ChaCha8Rng::seed_from_u64(131);

    let mut sig = key.sign(&mut rng, b"message").unwrap();
    assert!(key.verify(b"message", &sig).is_ok());

    *sig.last_mut().unwrap() ^= 0xFF;
    assert!(key.verify(b"message", &sig).is_err());
}

#[test]
fn pkcs8_pbes2_pbkdf2_sha256_aes128_round_trip_and_wrong_password() {
    use rsa_pure::formats::pkcs8;

    let mut genrng = ChaCha8Rng::seed_from_u64(142);
    let mut real_key = RsaKey::new();
    real_key.generate(&mut genrng, 1024, None).unwrap();
    let real_priv = real_key.get_private_key().unwrap().clone();

    let mut rng = ChaCha8Rng::seed_from_u64(143);
    let der = pkcs8::save_private_key_encrypted(&mut rng, &real_priv, b"password").unwrap();

    let loaded = pkcs8::load_private_key_with_password(&der, Some(b"password")).unwrap();
    assert_eq!(loaded, real_priv);

    let err = pkcs8::load_private_key_with_password(&der, Some(b"wrong-password"));
    assert!(err.is_err());
}

#[test]
fn xml_key_value_with_aqab_exponent_decodes_to_65537() {
    use rsa_pure::formats::xml;
    use rsa_pure::PublicKeyParts;

    let xml_doc =
        "<RSAKeyValue><Modulus>AAMACw==</Modulus><Exponent>AQAB</Exponent></RSAKeyValue>";
    let pub_key: RsaPublicKey = xml::load_public_key(xml_doc).unwrap();

    assert_eq!(pub_key.e(), &rsa_pure::BigUint::from(65537u32));
}

#[test]
fn rsa_key_load_format_round_trips_a_saved_pkcs1_private_key() {
    use rsa_pure::formats::pkcs1;

    let mut rng = ChaCha8Rng::seed_from_u64(150);
    let mut key = RsaKey::new();
    key.generate(&mut rng, 1024, None).unwrap();
    let original = key.get_private_key().unwrap().clone();

    let der = pkcs1::save_private_key(&original).unwrap();

    let mut loaded = RsaKey::new();
    loaded.load_format(&der, KeyFormat::Pkcs1, None).unwrap();
    assert_eq!(loaded.get_private_key().unwrap(), &original);
}

#[test]
fn load_auto_detects_format_for_an_unarmored_pkcs8_public_key() {
    use rsa_pure::formats::pkcs8;

    let mut rng = ChaCha8Rng::seed_from_u64(170);
    let mut key = RsaKey::new();
    key.generate(&mut rng, 1024, None).unwrap();
    let pub_der = pkcs8::save_public_key(key.get_public_key().unwrap()).unwrap();

    let mut loaded = RsaKey::new();
    loaded.load(&pub_der, None).unwrap();
    assert!(loaded.get_private_key().is_none());
    use rsa_pure::PublicKeyParts;
    assert_eq!(
        loaded.get_public_key().unwrap().n(),
        key.get_public_key().unwrap().n()
    );
}
