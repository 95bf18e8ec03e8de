// src/models/did.rs
//! Decentralized Identifier (DID) data model.
//!
//! Defines the identity bundle returned by key generation and the
//! W3C-compliant DID Document following the
//! [DID Core Specification](https://www.w3.org/TR/did-core/).

use serde::{Deserialize, Serialize};

/// A freshly generated identity.
///
/// Returned exactly once by identity generation; the private key is never
/// surfaced again and the caller is responsible for storing it securely.
///
/// # DID Format
/// The `did` field follows the `did:ethr` method:
/// ```text
/// did:ethr:0x<20-byte address, EIP-55 checksummed hex>
/// ```
/// The address is derived deterministically from the public key, so the DID
/// and the public key are a one-to-one mapping.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeneratedIdentity {
    /// The complete DID string, e.g. `did:ethr:0xAb5801a7...`
    pub did: String,

    /// Checksummed Ethereum-style address acting as the shareable public key
    #[serde(rename = "publicKey")]
    pub public_key: String,

    /// 0x-prefixed 32-byte secp256k1 private key hex; returned only here
    #[serde(rename = "privateKey")]
    pub private_key: String,

    /// ISO-8601 creation timestamp
    #[serde(rename = "createdAt")]
    pub created_at: String,
}

/// A DID Document representing a decentralized identity.
///
/// Carries the cryptographic material needed to authenticate the DID
/// subject. Field names follow the W3C vocabulary, hence the serde renames.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DidDocument {
    /// JSON-LD context URIs
    #[serde(rename = "@context")]
    pub context: Vec<String>,

    /// The DID this document describes
    pub id: String,

    /// Public key entries usable to authenticate the subject
    #[serde(rename = "publicKey")]
    pub public_key: Vec<DidPublicKey>,

    /// References to the key entries valid for authentication
    pub authentication: Vec<String>,

    /// ISO-8601 document creation timestamp
    pub created: String,

    /// ISO-8601 last-update timestamp
    pub updated: String,
}

/// A single public key entry inside a [`DidDocument`].
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DidPublicKey {
    /// Key reference, e.g. `did:ethr:0x...#keys-1`
    pub id: String,

    /// Key type tag, e.g. `EcdsaSecp256k1VerificationKey2019`
    #[serde(rename = "type")]
    pub key_type: String,

    /// DID controlling this key
    pub controller: String,

    /// Hex encoding of the key material (address form for `did:ethr`)
    #[serde(rename = "publicKeyHex")]
    pub public_key_hex: String,
}
