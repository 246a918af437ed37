//! RSA-related trait definitions.

pub(crate) mod keys;
pub(crate) mod padding;

pub use keys::{CrtValue, PrivateKeyParts, PublicKeyParts};
pub use padding::{PaddingScheme, SignatureScheme};
