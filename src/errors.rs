// src/errors.rs
//! Error taxonomy for the DID vault.
//!
//! Generation and issuance failures propagate as `VaultError` values to the
//! API layer, which maps them to HTTP failure responses. Verification is the
//! deliberate exception: it reports failures inside a
//! [`VerificationResult`](crate::models::credential::VerificationResult)
//! and never returns an error.

use thiserror::Error;

/// Errors raised by identity generation, credential issuance, and token
/// handling.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The operating system could not provide secure entropy.
    ///
    /// Fatal for identity generation: there is no fallback to weak
    /// randomness.
    #[error("secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    /// A DID or public key string failed to parse.
    ///
    /// Recoverable: reported to the caller, who supplied the bad value.
    #[error("malformed identifier: {0}")]
    MalformedIdentifier(String),

    /// The issuer private key is missing or unparsable.
    ///
    /// Fatal configuration error; the engine cannot be constructed and no
    /// credential can be signed.
    #[error("issuer signing key unavailable: {0}")]
    SigningKeyUnavailable(String),

    /// A credential token could not be decoded.
    #[error("invalid token format: {0}")]
    TokenFormatInvalid(String),

    /// JSON serialization or deserialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The ECDSA signing operation itself failed.
    #[error("signing failed: {0}")]
    Signing(String),
}
