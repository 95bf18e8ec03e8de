// src/wallet/key_management.rs
//! Identity generation and DID handling.
//!
//! Produces fresh secp256k1 keypairs and derives `did:ethr` identifiers from
//! them, using:
//! - secp256k1 curve (via `k256` crate)
//! - Keccak-256 address derivation (via `ethers` crate)
//! - Cryptographically secure OS random number generation

use crate::errors::VaultError;
use crate::models::did::{DidDocument, DidPublicKey, GeneratedIdentity};
use crate::utils::crypto::checksum_address;
use crate::utils::iso_now;
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use ethers::utils::hex;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use std::str::FromStr;

/// DID method prefix for Ethereum-style identifiers.
pub const DID_PREFIX: &str = "did:ethr:";

/// Key type tag advertised in DID documents.
const KEY_TYPE: &str = "EcdsaSecp256k1VerificationKey2019";

/// Generates a fresh identity: secp256k1 keypair plus derived DID.
///
/// The identifier is `did:ethr:` concatenated with the EIP-55 checksummed
/// address of the new public key (keccak-256 of the uncompressed key, last
/// 20 bytes), so the mapping from public key to DID is deterministic and
/// one-to-one.
///
/// # Errors
/// [`VaultError::RandomnessUnavailable`] when the OS entropy source cannot
/// be read or rejects the drawn scalar. There is no fallback to a weaker
/// random source.
pub fn generate_identity() -> Result<GeneratedIdentity, VaultError> {
    let mut secret = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut secret)
        .map_err(|e| VaultError::RandomnessUnavailable(e.to_string()))?;

    // Zero or over-order scalars are rejected by the curve; probability ~2^-128
    let signing_key = SigningKey::from_slice(&secret)
        .map_err(|e| VaultError::RandomnessUnavailable(format!("drawn scalar rejected: {}", e)))?;

    let private_key = format!("0x{}", hex::encode(signing_key.to_bytes()));
    let wallet = LocalWallet::from(signing_key);
    let public_key = checksum_address(&wallet.address());
    let did = format!("{}{}", DID_PREFIX, public_key);

    log::info!("generated identity {}", did);

    Ok(GeneratedIdentity {
        did,
        public_key,
        private_key,
        created_at: iso_now(),
    })
}

/// Returns true iff `did` has the `did:ethr:` prefix and the remainder is a
/// well-formed 0x-prefixed 20-byte address.
pub fn is_valid_did(did: &str) -> bool {
    match did.strip_prefix(DID_PREFIX) {
        Some(rest) => rest.len() == 42 && rest.starts_with("0x") && Address::from_str(rest).is_ok(),
        None => false,
    }
}

/// Extracts the public key (address) substring from a DID.
///
/// Returns the exact substring after the method prefix, preserving the
/// caller's original hex casing.
///
/// # Errors
/// [`VaultError::MalformedIdentifier`] when the prefix or the address
/// encoding is invalid.
pub fn extract_public_key(did: &str) -> Result<String, VaultError> {
    if !is_valid_did(did) {
        return Err(VaultError::MalformedIdentifier(did.to_string()));
    }
    Ok(did[DID_PREFIX.len()..].to_string())
}

/// Builds a W3C DID Document describing `did` and its public key.
///
/// The document carries a single `#keys-1` entry; this design never rotates
/// keys, so `created` and `updated` coincide.
pub fn create_did_document(did: &str, public_key: &str) -> DidDocument {
    let now = iso_now();
    DidDocument {
        context: vec![
            "https://www.w3.org/ns/did/v1".to_string(),
            "https://w3id.org/security/v2".to_string(),
        ],
        id: did.to_string(),
        public_key: vec![DidPublicKey {
            id: format!("{}#keys-1", did),
            key_type: KEY_TYPE.to_string(),
            controller: did.to_string(),
            public_key_hex: public_key.to_string(),
        }],
        authentication: vec![format!("{}#keys-1", did)],
        created: now.clone(),
        updated: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_identity_is_valid() {
        let identity = generate_identity().expect("OS entropy available");
        assert!(is_valid_did(&identity.did));
        assert_eq!(
            extract_public_key(&identity.did).unwrap(),
            identity.public_key
        );
    }

    #[test]
    fn test_generated_identities_are_unique() {
        let a = generate_identity().unwrap();
        let b = generate_identity().unwrap();
        assert_ne!(a.did, b.did);
        assert_ne!(a.private_key, b.private_key);
    }

    #[test]
    fn test_private_key_shape() {
        let identity = generate_identity().unwrap();
        assert!(identity.private_key.starts_with("0x"));
        assert_eq!(identity.private_key.len(), 66);
    }

    #[test]
    fn test_did_validation() {
        assert!(is_valid_did(
            "did:ethr:0x1111111111111111111111111111111111111111"
        ));
        assert!(!is_valid_did("did:key:z6MkhaXgBZD"));
        assert!(!is_valid_did("did:ethr:1111111111111111111111111111111111111111"));
        assert!(!is_valid_did("did:ethr:0x1111")); // too short
        assert!(!is_valid_did("did:ethr:0xZZ11111111111111111111111111111111111111"));
        assert!(!is_valid_did(""));
    }

    #[test]
    fn test_extract_preserves_casing() {
        let did = "did:ethr:0xAbCd111111111111111111111111111111111111";
        assert_eq!(
            extract_public_key(did).unwrap(),
            "0xAbCd111111111111111111111111111111111111"
        );
    }

    #[test]
    fn test_extract_rejects_malformed() {
        let err = extract_public_key("did:ethr:nonsense").unwrap_err();
        assert!(matches!(err, VaultError::MalformedIdentifier(_)));
    }

    #[test]
    fn test_did_document_shape() {
        let identity = generate_identity().unwrap();
        let doc = create_did_document(&identity.did, &identity.public_key);
        assert_eq!(doc.id, identity.did);
        assert_eq!(doc.public_key.len(), 1);
        assert_eq!(doc.public_key[0].id, format!("{}#keys-1", identity.did));
        assert_eq!(doc.public_key[0].public_key_hex, identity.public_key);
        assert_eq!(doc.authentication, vec![format!("{}#keys-1", identity.did)]);
    }
}
