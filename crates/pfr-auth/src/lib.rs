//! PFR request authentication primitives.
//!
//! This crate provides the request-signing protocol and key-at-rest
//! protection used by the PFR client when talking to the party-finder API.
//! It has no UI or host dependencies: the host hands it a method, path, and
//! body, and gets back the two authentication headers.
//!
//! # Modules
//!
//! - [`signer`] - ECDSA P-256 signing of canonical requests
//! - [`verifier`] - the server-side verification counterpart
//! - [`canonical`] - canonical request string and body hashing
//! - [`keywrap`] - sealing the private key for distribution (AES-256-CBC)
//! - [`provider`] - cached, fail-open unsealing of the embedded key
//! - [`error`] - error types
//!
//! # Example: signing and verifying a request
//!
//! ```rust
//! use pfr_auth::{RequestBody, RequestSigner, RequestVerifier};
//!
//! let signer = RequestSigner::generate();
//! let verifier = RequestVerifier::new(signer.verifying_key());
//!
//! let headers = signer.sign("GET", "/api/v1/listings/?page=2", &RequestBody::Empty)?;
//! verifier.verify("GET", "/api/v1/listings/?page=2", &RequestBody::Empty, &headers)?;
//! # Ok::<(), pfr_auth::AuthError>(())
//! ```
//!
//! # Example: recovering the embedded key at startup
//!
//! ```rust
//! use pfr_auth::{ArtifactIdentity, SealedKeyProvider};
//!
//! let identity = ArtifactIdentity::new("PartyFinderReborn", env!("CARGO_PKG_VERSION"));
//! // In release builds the blob comes from `include_bytes!`.
//! let provider = SealedKeyProvider::new(identity, None);
//! // Fail-open: a build without the sealed resource simply cannot sign.
//! assert!(provider.signer().is_none());
//! ```
//!
//! # Security model
//!
//! The wrapping key is derived from public build metadata, so the sealed blob
//! is obfuscation against plaintext distribution, not confidentiality against
//! someone who has the binary. See [`keywrap`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod canonical;
pub mod error;
pub mod keywrap;
pub mod provider;
pub mod signer;
pub mod verifier;

pub use canonical::{RequestBody, body_sha256_hex, canonical_string};
pub use error::{AuthError, AuthResult};
pub use keywrap::{WrappingKey, open_key, seal_key, seal_key_with_iv};
pub use provider::{ArtifactIdentity, KEY_SEAL_CONSTANT, KeyStatus, SealedKeyProvider};
pub use signer::{RequestSigner, SIGNATURE_HEADER, SignatureHeaders, TIMESTAMP_HEADER};
pub use verifier::RequestVerifier;
