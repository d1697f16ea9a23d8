//! Canonical request representation.
//!
//! Signer and verifier must agree byte-for-byte on what was signed. The
//! canonical form is exactly four newline-joined lines:
//!
//! ```text
//! {timestamp}\n{METHOD}\n{path}\n{body_sha256_hex}
//! ```
//!
//! with the method upper-cased, the path including the query string exactly as
//! sent on the wire, and the body hash as lowercase hex SHA-256.

use std::borrow::Cow;

use sha2::{Digest, Sha256};

use crate::error::AuthResult;

/// Request body in one of the forms a caller can hand to the signer.
///
/// Each form maps to a canonical byte sequence before hashing: absent bodies
/// hash as the empty string, text as its UTF-8 bytes, raw bytes unchanged, and
/// structured values as their JSON serialization (`serde_json` emits object
/// keys in sorted order for `Value` maps, so the encoding is stable).
#[derive(Debug, Clone, Copy, Default)]
pub enum RequestBody<'a> {
    /// No body (GET, DELETE).
    #[default]
    Empty,
    /// A textual body, hashed as UTF-8.
    Text(&'a str),
    /// A raw byte body, hashed unchanged.
    Bytes(&'a [u8]),
    /// A structured body, hashed as its JSON serialization.
    Json(&'a serde_json::Value),
}

impl<'a> RequestBody<'a> {
    /// Canonical byte sequence for this body.
    ///
    /// # Errors
    ///
    /// Returns an error if a structured body fails to serialize. The failure
    /// propagates; the signer never substitutes empty bytes for a body it
    /// could not encode.
    pub fn canonical_bytes(&self) -> AuthResult<Cow<'a, [u8]>> {
        match self {
            Self::Empty => Ok(Cow::Borrowed(&[])),
            Self::Text(s) => Ok(Cow::Borrowed(s.as_bytes())),
            Self::Bytes(b) => Ok(Cow::Borrowed(b)),
            Self::Json(v) => Ok(Cow::Owned(serde_json::to_vec(v)?)),
        }
    }
}

impl<'a> From<&'a str> for RequestBody<'a> {
    fn from(s: &'a str) -> Self {
        Self::Text(s)
    }
}

impl<'a> From<&'a [u8]> for RequestBody<'a> {
    fn from(b: &'a [u8]) -> Self {
        Self::Bytes(b)
    }
}

impl<'a> From<&'a serde_json::Value> for RequestBody<'a> {
    fn from(v: &'a serde_json::Value) -> Self {
        Self::Json(v)
    }
}

/// Lowercase hex SHA-256 of a body byte sequence.
#[must_use]
pub fn body_sha256_hex(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Build the canonical string for a request.
///
/// `path_and_query` must be the request target exactly as sent on the wire,
/// query string included.
#[must_use]
pub fn canonical_string(
    timestamp: i64,
    method: &str,
    path_and_query: &str,
    body_hash_hex: &str,
) -> String {
    format!(
        "{timestamp}\n{}\n{path_and_query}\n{body_hash_hex}",
        method.to_uppercase()
    )
}
