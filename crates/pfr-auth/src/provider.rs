//! Sealed-key provider: the cached decrypted-key abstraction.
//!
//! Owns the embedded sealed blob and the at-most-once unseal. This path runs
//! during plugin initialization inside a host process, so it fails open: a
//! missing or corrupt blob disables signed requests instead of propagating an
//! error that could destabilize the host. [`SealedKeyProvider::status`] lets
//! callers still tell "no key configured" apart from "key configuration
//! corrupt".

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::keywrap::{WrappingKey, open_key};
use crate::signer::RequestSigner;

/// Fixed constant mixed into wrapping-key derivation.
///
/// Shared between the build-time seal tool and run-time unseal; changing it
/// invalidates every previously sealed blob.
pub const KEY_SEAL_CONSTANT: &str = "pfr-key-seal-v1";

/// Public build metadata identifying the artifact the key is sealed for.
///
/// These are the non-secret wrapping-key inputs: the product name and its
/// semantic version string, both embedded in (or derivable from) the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactIdentity {
    /// Product or assembly name.
    pub product: String,
    /// Semantic version string.
    pub version: String,
}

impl ArtifactIdentity {
    /// Create an artifact identity.
    pub fn new(product: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            version: version.into(),
        }
    }

    /// Derive the wrapping key for this identity.
    #[must_use]
    pub fn wrapping_key(&self) -> WrappingKey {
        WrappingKey::derive(&self.product, &self.version, KEY_SEAL_CONSTANT)
    }
}

/// Outcome of the one-time unseal, observable via [`SealedKeyProvider::status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    /// The key unsealed and is available for signing.
    Available,
    /// No sealed blob was configured (e.g. a development build).
    Missing,
    /// A blob was present but could not be unsealed.
    Corrupt,
}

enum UnsealOutcome {
    Ready(Zeroizing<String>),
    Missing,
    Corrupt,
}

/// Holds the sealed signing key and unseals it at most once.
///
/// Safe to call from arbitrary threads; concurrent first callers race into a
/// single unseal via [`OnceLock`] and every later call returns the cached
/// outcome without re-decrypting.
pub struct SealedKeyProvider {
    identity: ArtifactIdentity,
    blob: Option<Vec<u8>>,
    unsealed: OnceLock<UnsealOutcome>,
}

impl SealedKeyProvider {
    /// Create a provider. `blob` is the embedded `IV || ciphertext` resource,
    /// or `None` for builds that ship without one.
    #[must_use]
    pub fn new(identity: ArtifactIdentity, blob: Option<Vec<u8>>) -> Self {
        Self {
            identity,
            blob,
            unsealed: OnceLock::new(),
        }
    }

    /// Create a provider over a resource embedded with `include_bytes!`.
    #[must_use]
    pub fn from_embedded(identity: ArtifactIdentity, blob: &'static [u8]) -> Self {
        Self::new(identity, Some(blob.to_vec()))
    }

    fn unseal(&self) -> &UnsealOutcome {
        self.unsealed.get_or_init(|| {
            let Some(blob) = &self.blob else {
                return UnsealOutcome::Missing;
            };
            match open_key(blob, &self.identity.wrapping_key()) {
                Ok(pem) => UnsealOutcome::Ready(Zeroizing::new(pem)),
                Err(error) => {
                    tracing::warn!(%error, "sealed signing key failed to unseal; signed requests disabled");
                    UnsealOutcome::Corrupt
                }
            }
        })
    }

    /// The unsealed PEM key text, or `None` if no usable key is available.
    ///
    /// Idempotent and cheap after the first call.
    #[must_use]
    pub fn key_pem(&self) -> Option<&str> {
        match self.unseal() {
            UnsealOutcome::Ready(pem) => Some(pem.as_str()),
            UnsealOutcome::Missing | UnsealOutcome::Corrupt => None,
        }
    }

    /// Why [`SealedKeyProvider::key_pem`] returned what it did.
    #[must_use]
    pub fn status(&self) -> KeyStatus {
        match self.unseal() {
            UnsealOutcome::Ready(_) => KeyStatus::Available,
            UnsealOutcome::Missing => KeyStatus::Missing,
            UnsealOutcome::Corrupt => KeyStatus::Corrupt,
        }
    }

    /// Build a [`RequestSigner`] from the unsealed key.
    ///
    /// Fail-open like the rest of this type: returns `None` when no key is
    /// available or the unsealed text is not a valid P-256 key.
    #[must_use]
    pub fn signer(&self) -> Option<RequestSigner> {
        let pem = self.key_pem()?;
        match RequestSigner::from_pem(pem) {
            Ok(signer) => Some(signer),
            Err(error) => {
                tracing::warn!(%error, "unsealed key is not a usable signing key");
                None
            }
        }
    }
}

impl std::fmt::Debug for SealedKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedKeyProvider")
            .field("identity", &self.identity)
            .field("blob_len", &self.blob.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}
