//! Server-side verification of signed requests.
//!
//! Counterpart to [`crate::signer::RequestSigner`]: rebuilds the canonical
//! string from the request the server actually received plus the transmitted
//! timestamp, and checks the detached signature against the client's public
//! key.

use base64::{Engine, engine::general_purpose::STANDARD};
use p256::PublicKey;
use p256::ecdsa::{Signature, VerifyingKey, signature::Verifier};
use p256::pkcs8::DecodePublicKey;

use crate::canonical::{RequestBody, body_sha256_hex, canonical_string};
use crate::error::{AuthError, AuthResult};
use crate::signer::SignatureHeaders;

/// ECDSA P-256 request verifier.
#[derive(Debug, Clone)]
pub struct RequestVerifier {
    verifying_key: VerifyingKey,
}

impl RequestVerifier {
    /// Load a verifier from SPKI PEM public key material.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidPublicKey`] if the PEM cannot be parsed as
    /// a P-256 public key.
    pub fn from_public_key_pem(pem: &str) -> AuthResult<Self> {
        let public = PublicKey::from_public_key_pem(pem)
            .map_err(|e| AuthError::InvalidPublicKey(e.to_string()))?;
        Ok(Self {
            verifying_key: VerifyingKey::from(public),
        })
    }

    /// Load a verifier from SEC1 public key bytes (compressed or not).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidPublicKey`] if the bytes are not a valid
    /// P-256 point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> AuthResult<Self> {
        let verifying_key = VerifyingKey::from_sec1_bytes(bytes)
            .map_err(|e| AuthError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { verifying_key })
    }

    /// Wrap an already-parsed verifying key.
    #[must_use]
    pub fn new(verifying_key: VerifyingKey) -> Self {
        Self { verifying_key }
    }

    /// Verify the signature headers against a received request.
    ///
    /// `method`, `path_and_query`, and `body` must be taken from the request
    /// as received; the timestamp comes from the transmitted header.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignatureEncoding`] if the signature is not valid
    /// base64 DER, or [`AuthError::SignatureRejected`] if it does not verify.
    pub fn verify(
        &self,
        method: &str,
        path_and_query: &str,
        body: &RequestBody<'_>,
        headers: &SignatureHeaders,
    ) -> AuthResult<()> {
        let der = STANDARD
            .decode(&headers.signature)
            .map_err(|e| AuthError::SignatureEncoding(e.to_string()))?;
        let signature =
            Signature::from_der(&der).map_err(|e| AuthError::SignatureEncoding(e.to_string()))?;

        let body_bytes = body.canonical_bytes()?;
        let body_hash = body_sha256_hex(&body_bytes);
        let canonical = canonical_string(headers.timestamp, method, path_and_query, &body_hash);

        self.verifying_key
            .verify(canonical.as_bytes(), &signature)
            .map_err(|_| AuthError::SignatureRejected)
    }

    /// Verify as [`RequestVerifier::verify`], additionally rejecting requests
    /// whose timestamp is more than `tolerance_secs` away from `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TimestampSkew`] before checking the signature if
    /// the timestamp is stale, plus the failure modes of `verify`.
    pub fn verify_within(
        &self,
        method: &str,
        path_and_query: &str,
        body: &RequestBody<'_>,
        headers: &SignatureHeaders,
        now: i64,
        tolerance_secs: i64,
    ) -> AuthResult<()> {
        if (headers.timestamp - now).abs() > tolerance_secs {
            return Err(AuthError::TimestampSkew {
                timestamp: headers.timestamp,
                now,
                tolerance_secs,
            });
        }
        self.verify(method, path_and_query, body, headers)
    }
}
