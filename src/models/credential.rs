// src/models/credential.rs
//! Verifiable Credential data model.
//!
//! Defines the core structures for W3C-compliant Verifiable Credentials (VCs)
//! following the [W3C Verifiable Credentials Data Model](https://www.w3.org/TR/vc-data-model/),
//! with JSON serialization matching the wire format used by the API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Verifiable Credential according to W3C standards.
///
/// A credential without a `proof` is unsigned. Once a proof is attached the
/// credential is signed and all other fields must be treated as frozen:
/// mutating any of them invalidates the proof, which is exactly what
/// verification detects.
///
/// Field declaration order matters — it is the canonical serialization order
/// used when computing the signing payload (see [`crate::utils::canonical`]).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VerifiableCredential {
    /// JSON-LD context URIs
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// Type tags, e.g. `["VerifiableCredential", "DegreeCredential"]`
    #[serde(rename = "type")]
    pub credential_type: Vec<String>,

    /// DID of the issuing entity
    pub issuer: String,

    /// ISO-8601 issuance timestamp
    #[serde(rename = "issuanceDate")]
    pub issuance_date: String,

    /// Claims about the subject; `id` holds the subject DID
    #[serde(rename = "credentialSubject")]
    pub credential_subject: Map<String, Value>,

    /// Cryptographic proof; `None` (serialized as `null`) while unsigned
    pub proof: Option<Proof>,
}

impl VerifiableCredential {
    /// Returns true once a proof has been attached.
    pub fn is_signed(&self) -> bool {
        self.proof.is_some()
    }
}

/// The cryptographic proof block attached to a signed credential.
///
/// Exactly one proof per credential; there is no multi-signature support in
/// this design.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Proof {
    /// Signature algorithm tag, e.g. `EcdsaSecp256k1Signature2019`
    #[serde(rename = "type")]
    pub proof_type: String,

    /// ISO-8601 timestamp of signature creation
    pub created: String,

    /// Reference to the signing key, e.g. `did:ethr:0x...#keys-1`
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,

    /// 0x-prefixed hex of the 65-byte recoverable ECDSA signature (r || s || v)
    #[serde(rename = "signatureValue")]
    pub signature_value: String,

    /// 0x-prefixed hex of the keccak-256 digest that was signed
    #[serde(rename = "dataHash")]
    pub data_hash: String,
}

/// The outcome of verifying a credential signature.
///
/// Derived, never stored. Verification always produces one of these — every
/// failure mode is folded into `valid: false` with a `reason`, so callers
/// need no exception handling to display a uniform result.
#[derive(Serialize, Debug, Clone)]
pub struct VerificationResult {
    /// Whether the signature matches the claimed issuer key over the
    /// credential's current content
    pub valid: bool,

    /// Issuer DID claimed by the credential itself
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// Signer address recovered from the signature, when recovery succeeded
    #[serde(rename = "recoveredAddress", skip_serializing_if = "Option::is_none")]
    pub recovered_address: Option<String>,

    /// Key reference recorded in the credential's proof
    #[serde(rename = "verificationMethod", skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,

    /// Human-readable failure description when `valid` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// ISO-8601 timestamp of the verification check
    pub timestamp: String,
}

impl VerificationResult {
    /// Builds a failed result carrying only a reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        VerificationResult {
            valid: false,
            issuer: None,
            recovered_address: None,
            verification_method: None,
            reason: Some(reason.into()),
            timestamp: crate::utils::iso_now(),
        }
    }
}
