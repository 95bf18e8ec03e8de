// src/utils/canonical.rs
//! Canonical serialization of credentials for signing and verification.
//!
//! This is the single most delicate piece of the protocol: the exact bytes
//! hashed at issuance must be reproduced at verification, or every valid
//! signature looks forged. For that reason the canonicalization lives here
//! and ONLY here — both `sign_credential` and `verify_credential` call into
//! this module, never a private reimplementation.
//!
//! Canonical form: compact JSON of every credential field except `proof`, in
//! struct declaration order (`@context`, `type`, `issuer`, `issuanceDate`,
//! `credentialSubject`). Claim maps serialize with keys in serde_json's
//! default sorted order, so the bytes are stable under re-parsing.

use crate::models::credential::VerifiableCredential;
use crate::utils::crypto::hash_data;
use serde::Serialize;
use serde_json::{Map, Value};

/// Borrowed view of a credential with the proof stripped.
///
/// Field order mirrors `VerifiableCredential` and must stay in sync with it.
#[derive(Serialize)]
struct SigningPayload<'a> {
    #[serde(rename = "@context")]
    context: &'a [String],
    #[serde(rename = "type")]
    credential_type: &'a [String],
    issuer: &'a str,
    #[serde(rename = "issuanceDate")]
    issuance_date: &'a str,
    #[serde(rename = "credentialSubject")]
    credential_subject: &'a Map<String, Value>,
}

/// Serializes every field except `proof` into the canonical byte sequence.
pub fn canonical_bytes(vc: &VerifiableCredential) -> Result<Vec<u8>, serde_json::Error> {
    let payload = SigningPayload {
        context: &vc.context,
        credential_type: &vc.credential_type,
        issuer: &vc.issuer,
        issuance_date: &vc.issuance_date,
        credential_subject: &vc.credential_subject,
    };
    serde_json::to_vec(&payload)
}

/// Keccak-256 digest of the canonical bytes — the exact value that gets
/// signed and verified.
pub fn credential_digest(vc: &VerifiableCredential) -> Result<[u8; 32], serde_json::Error> {
    Ok(hash_data(&canonical_bytes(vc)?))
}
