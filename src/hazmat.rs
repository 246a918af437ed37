//! Raw `RSAEP`/`RSADP` primitives (spec.md §4.7), with no padding scheme
//! applied. Gated behind the `hazmat` feature, matching the classic
//! RustCrypto `rsa` crate's own `hazmat` module: calling these directly
//! reopens the message-recovery and malleability weaknesses OAEP/PSS/PKCS#1
//! padding exist to close, so callers take on that responsibility
//! themselves. [`crate::RsaKey`] with [`crate::EncryptionMode::None`] wraps
//! the same primitives with chunking and bounds-checking; reach for this
//! module only when that is genuinely not the shape you need.

use rand_core::CryptoRngCore;

use crate::algorithms::rsa::{rsa_decrypt, rsa_encrypt};
use crate::errors::Result;
use crate::key::RsaPrivateKey;
use crate::traits::PublicKeyParts;
use crate::BigUint;

/// `RSAEP`: `m^e mod n`. Rejects `m` outside `[0, n)`.
pub fn encrypt(pub_key: &impl PublicKeyParts, m: &BigUint) -> Result<BigUint> {
    rsa_encrypt(pub_key, m)
}

/// `RSADP`: exponentiates `c` by the private exponent, via CRT with blinding
/// when the key has prime factors available.
pub fn decrypt<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    priv_key: &RsaPrivateKey,
    c: &BigUint,
) -> Result<BigUint> {
    rsa_decrypt(rng, priv_key, c)
}
