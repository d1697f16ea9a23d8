//! Error types for PFR request authentication.

use thiserror::Error;

/// Errors that can occur while signing, verifying, or unsealing keys.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The supplied private key material could not be loaded.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// The supplied public key material could not be loaded.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// A structured request body failed to serialize.
    #[error("request body serialization failed: {0}")]
    BodySerialization(#[from] serde_json::Error),

    /// The underlying ECDSA primitive failed to produce a signature.
    #[error("signing operation failed: {0}")]
    Signing(String),

    /// The transmitted signature could not be decoded (base64 or DER).
    #[error("malformed signature encoding: {0}")]
    SignatureEncoding(String),

    /// The signature did not verify against the canonical request.
    #[error("signature verification failed")]
    SignatureRejected,

    /// The request timestamp is outside the accepted tolerance.
    #[error("timestamp outside tolerance: request {timestamp}, now {now}, tolerance {tolerance_secs}s")]
    TimestampSkew {
        /// Timestamp transmitted with the request.
        timestamp: i64,
        /// Verifier's current time.
        now: i64,
        /// Allowed tolerance in seconds.
        tolerance_secs: i64,
    },

    /// A sealed key blob is too short to contain an IV and ciphertext.
    #[error("sealed blob too short: expected at least {expected} bytes, got {actual}")]
    SealedBlobTooShort {
        /// Minimum length for IV plus one cipher block.
        expected: usize,
        /// Actual blob length.
        actual: usize,
    },

    /// Decryption or padding validation of a sealed key blob failed.
    #[error("sealed key unwrap failed: wrong key or corrupt ciphertext")]
    KeyUnwrap,

    /// The unsealed key material is not valid UTF-8 PEM text.
    #[error("unsealed key is not valid UTF-8: {0}")]
    KeyEncoding(#[from] std::string::FromUtf8Error),
}

/// Result type alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;
