//! Error types.

/// Alias for [`core::result::Result`] with this crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error kinds produced by this crate.
///
/// Several independent lower-level checks collapse onto one variant
/// deliberately, so that callers (and timing) cannot distinguish *why* a
/// decryption or verification failed from the error alone.
#[derive(Debug, Eq, PartialEq, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Invalid padding scheme requested for the current key/algorithm combination.
    InvalidPaddingScheme,

    /// OAEP or PKCS#1 v1.5 decryption failed. Also returned for ciphertext
    /// length mismatches and wrong PKCS#8 passwords. Never differentiate the
    /// underlying cause in the message or in how quickly this is returned.
    Decryption,

    /// PSS or PKCS#1 v1.5 signature verification failed, including a
    /// signature of the wrong length.
    Verification,

    /// Plaintext is too long for the modulus and padding scheme in use.
    MessageTooLong,

    /// A raw (unpadded) signing primitive was asked to sign data that is not
    /// the output of a hash function.
    InputNotHashed,

    /// Number of primes must be 2 or greater.
    NprimesTooSmall,

    /// Too few primes of the requested length exist to build a key of the
    /// requested size.
    TooFewPrimes,

    /// A candidate prime failed validation (equal to another prime, or not
    /// coprime with the public exponent).
    InvalidPrime,

    /// `n` does not equal the product of `primes`, or is even, or is too large.
    InvalidModulus,

    /// `e`/`d` fails the bounds or congruence checks in [`crate::key`].
    InvalidExponent,

    /// A CRT coefficient failed to invert.
    InvalidCoefficient,

    /// Modulus exceeds [`crate::key::RsaPublicKey::MAX_SIZE`].
    ModulusTooLarge,

    /// Public exponent is below [`crate::key::RsaPublicKey::MIN_PUB_EXPONENT`].
    PublicExponentTooSmall,

    /// Public exponent is above [`crate::key::RsaPublicKey::MAX_PUB_EXPONENT`].
    PublicExponentTooLarge,

    /// A primitive input fell outside `[0, n)`.
    OutOfRange,

    /// A value does not fit in the requested fixed-width big-endian encoding
    /// (I2OSP overflow), a modulus is too short for a DigestInfo-bearing
    /// EMSA-PKCS1-v1_5 encoding, or a message exceeds an OAEP/PKCS1-v1.5 bound.
    LengthError,

    /// ASN.1/DER decoding failed, a required field was missing, or a
    /// public-key bit-string pad byte was non-zero.
    MalformedKey,

    /// Unknown OID, or a cipher/PRF/KDF combination this crate does not
    /// implement (e.g. `rc5-CBC-PAD`, `id-PBMAC1`), or more than two primes
    /// in a format that forbids multi-prime keys.
    UnsupportedAlgorithm,

    /// Signing or verifying was attempted without the required key material.
    MissingKeyMaterial,

    /// An internal invariant was violated (should be unreachable).
    Internal,

    /// Label too long for the hash function in use.
    LabelTooLong,

    /// Insufficient padding-string length while decoding.
    InvalidPadLen,

    /// Caller-supplied arguments are invalid (e.g. a zero salt length where
    /// one is required).
    InvalidArguments,

    /// An internal fixed-size buffer was too small for the computed value.
    OutputBufferTooSmall,
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::InvalidPaddingScheme => "invalid padding scheme",
            Error::Decryption => "decryption error",
            Error::Verification => "verification error",
            Error::MessageTooLong => "message too long",
            Error::InputNotHashed => "input must be hashed",
            Error::NprimesTooSmall => "number of primes must be >= 2",
            Error::TooFewPrimes => "too few primes of given length to generate key",
            Error::InvalidPrime => "invalid prime value",
            Error::InvalidModulus => "invalid modulus",
            Error::InvalidExponent => "invalid exponent",
            Error::InvalidCoefficient => "invalid CRT coefficient",
            Error::ModulusTooLarge => "modulus too large",
            Error::PublicExponentTooSmall => "public exponent too small",
            Error::PublicExponentTooLarge => "public exponent too large",
            Error::OutOfRange => "value out of range [0, n)",
            Error::LengthError => "length error",
            Error::MalformedKey => "malformed key",
            Error::UnsupportedAlgorithm => "unsupported algorithm",
            Error::MissingKeyMaterial => "required key material is missing",
            Error::Internal => "internal error",
            Error::LabelTooLong => "label too long",
            Error::InvalidPadLen => "invalid padding length",
            Error::InvalidArguments => "invalid arguments",
            Error::OutputBufferTooSmall => "output buffer too small",
        };
        f.write_str(msg)
    }
}

impl From<der::Error> for Error {
    fn from(_: der::Error) -> Self {
        Error::MalformedKey
    }
}

impl From<pkcs8::Error> for Error {
    fn from(_: pkcs8::Error) -> Self {
        Error::MalformedKey
    }
}

impl From<pkcs8::spki::Error> for Error {
    fn from(_: pkcs8::spki::Error) -> Self {
        Error::MalformedKey
    }
}

impl From<pkcs1::Error> for Error {
    fn from(_: pkcs1::Error) -> Self {
        Error::MalformedKey
    }
}
