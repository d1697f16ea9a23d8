//! End-to-end tests for the signing and key-sealing flow.
//!
//! Exercises the full release pipeline shape: generate a key, seal it under
//! the artifact identity, unseal it through the provider at "startup", sign
//! requests, and verify them with the public key.

use base64::{Engine, engine::general_purpose::STANDARD};
use pfr_auth::{
    ArtifactIdentity, KeyStatus, RequestBody, RequestSigner, RequestVerifier, SealedKeyProvider,
    body_sha256_hex, canonical_string, seal_key,
};

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

fn release_identity() -> ArtifactIdentity {
    ArtifactIdentity::new("PartyFinderReborn", "3.1.0")
}

/// Seal a fresh key the way the release pipeline does, returning the blob and
/// the public-key verifier a server would hold.
fn sealed_release_key() -> (Vec<u8>, RequestVerifier) {
    let signer = RequestSigner::generate();
    let pem = signer.to_pkcs8_pem().unwrap();
    let blob = seal_key(&pem, &release_identity().wrapping_key());
    (blob, RequestVerifier::new(signer.verifying_key()))
}

#[test]
fn startup_to_signed_request_flow() {
    let (blob, verifier) = sealed_release_key();

    let provider = SealedKeyProvider::new(release_identity(), Some(blob));
    assert_eq!(provider.status(), KeyStatus::Available);
    let signer = provider.signer().expect("release build has a usable key");

    let body = serde_json::json!({"duty": 1077, "description": "practice party"});
    let headers = signer
        .sign("POST", "/api/v1/listings/", &RequestBody::Json(&body))
        .unwrap();

    assert!(verifier
        .verify("POST", "/api/v1/listings/", &RequestBody::Json(&body), &headers)
        .is_ok());
}

#[test]
fn two_signatures_in_same_second_both_verify() {
    let signer = RequestSigner::generate();
    let verifier = RequestVerifier::new(signer.verifying_key());
    let ts = 1_700_000_000;

    let h1 = signer.sign_at("GET", "/api/v1/duties/", &RequestBody::Empty, ts).unwrap();
    let h2 = signer.sign_at("GET", "/api/v1/duties/", &RequestBody::Empty, ts).unwrap();

    assert!(verifier.verify("GET", "/api/v1/duties/", &RequestBody::Empty, &h1).is_ok());
    assert!(verifier.verify("GET", "/api/v1/duties/", &RequestBody::Empty, &h2).is_ok());
}

#[test]
fn canonical_string_matches_documented_wire_format() {
    // The exact scenario the server implements against: GET with empty body
    // at a fixed timestamp.
    let canonical = canonical_string(
        1_700_000_000,
        "GET",
        "/api/v1/listings/?page=2",
        &body_sha256_hex(b""),
    );
    assert_eq!(
        canonical,
        format!("1700000000\nGET\n/api/v1/listings/?page=2\n{EMPTY_SHA256}")
    );
}

#[test]
fn signature_over_documented_canonical_string_verifies_independently() {
    // Recompute the canonical string out-of-band and check the raw DER
    // signature against it, as a server without this crate would.
    use p256::ecdsa::signature::Verifier;

    let signer = RequestSigner::generate();
    let headers = signer
        .sign_at("get", "/api/v1/listings/?page=2", &RequestBody::Empty, 1_700_000_000)
        .unwrap();

    let canonical = format!("1700000000\nGET\n/api/v1/listings/?page=2\n{EMPTY_SHA256}");
    let der = STANDARD.decode(&headers.signature).unwrap();
    let signature = p256::ecdsa::Signature::from_der(&der).unwrap();
    assert!(signer
        .verifying_key()
        .verify(canonical.as_bytes(), &signature)
        .is_ok());
}

#[test]
fn development_build_without_resource_stays_degraded() {
    let provider = SealedKeyProvider::new(release_identity(), None);
    for _ in 0..3 {
        assert_eq!(provider.status(), KeyStatus::Missing);
        assert!(provider.signer().is_none());
    }
}

#[test]
fn version_bump_without_reseal_disables_signing() {
    // Sealed for 3.1.0, shipped as 3.2.0: the derived wrapping key changes,
    // the unseal fails, and the client degrades instead of crashing.
    let (blob, _) = sealed_release_key();
    let provider = SealedKeyProvider::new(ArtifactIdentity::new("PartyFinderReborn", "3.2.0"), Some(blob));
    assert!(provider.signer().is_none());
    assert_eq!(provider.status(), KeyStatus::Corrupt);
}

#[test]
fn concurrent_startup_unseals_once_and_all_callers_sign() {
    let (blob, verifier) = sealed_release_key();
    let provider = SealedKeyProvider::new(release_identity(), Some(blob));

    std::thread::scope(|scope| {
        for i in 0..8 {
            let provider = &provider;
            let verifier = &verifier;
            scope.spawn(move || {
                let signer = provider.signer().unwrap();
                let path = format!("/api/v1/listings/?page={i}");
                let headers = signer.sign("GET", &path, &RequestBody::Empty).unwrap();
                assert!(verifier.verify("GET", &path, &RequestBody::Empty, &headers).is_ok());
            });
        }
    });
}

#[test]
fn body_forms_hash_as_documented() {
    let signer = RequestSigner::generate();
    let verifier = RequestVerifier::new(signer.verifying_key());
    let ts = 1_700_000_000;

    // Text and the equivalent raw bytes sign identically.
    let as_text = signer
        .sign_at("POST", "/x", &RequestBody::Text("payload"), ts)
        .unwrap();
    let as_bytes = signer
        .sign_at("POST", "/x", &RequestBody::Bytes(b"payload"), ts)
        .unwrap();
    assert_eq!(as_text, as_bytes);

    // A JSON body verifies against the same JSON value on the other side.
    let value = serde_json::json!({"page": 2});
    let headers = signer.sign_at("POST", "/x", &RequestBody::Json(&value), ts).unwrap();
    assert!(verifier.verify("POST", "/x", &RequestBody::Json(&value), &headers).is_ok());
    // ...but not against a different value.
    let other = serde_json::json!({"page": 3});
    assert!(verifier.verify("POST", "/x", &RequestBody::Json(&other), &headers).is_err());
}
