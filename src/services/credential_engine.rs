// src/services/credential_engine.rs
//! Credential Engine — builds and signs verifiable credentials on behalf of
//! a fixed issuer identity.
//!
//! The issuer is an explicitly constructed, immutable [`IssuerConfig`]
//! injected at engine construction time. There is no module-level key
//! singleton: `main` builds the config once, before the server accepts
//! requests, and every handler shares the same read-only engine.
//!
//! Signing pipeline: canonical bytes (see [`crate::utils::canonical`]) →
//! keccak-256 digest → recoverable secp256k1 ECDSA signature → proof block
//! attached to a copy of the credential.

use crate::errors::VaultError;
use crate::models::credential::{Proof, VerifiableCredential};
use crate::utils::canonical::credential_digest;
use crate::utils::crypto::checksum_address;
use crate::utils::iso_now;
use crate::wallet::key_management::{is_valid_did, DID_PREFIX};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use ethers::utils::hex;
use serde_json::{json, Map, Value};
use std::str::FromStr;

/// Proof type tag recorded on every signed credential.
pub const PROOF_TYPE: &str = "EcdsaSecp256k1Signature2019";

/// JSON-LD contexts stamped onto every issued credential.
const CREDENTIAL_CONTEXT: [&str; 2] = [
    "https://www.w3.org/2018/credentials/v1",
    "https://www.w3.org/2018/credentials/examples/v1",
];

/// The fixed issuer identity: signing wallet plus derived DID and address.
///
/// Immutable once constructed. Clone is cheap enough for handler state; the
/// private key never leaves this struct.
#[derive(Clone, Debug)]
pub struct IssuerConfig {
    wallet: LocalWallet,
    did: String,
    address: String,
}

impl IssuerConfig {
    /// Builds the issuer identity from a 32-byte private key hex string
    /// (with or without 0x prefix).
    ///
    /// # Errors
    /// [`VaultError::SigningKeyUnavailable`] when the key is empty or does
    /// not parse — a fatal configuration error, since no credential can be
    /// signed without it.
    pub fn from_private_key(private_key: &str) -> Result<Self, VaultError> {
        let stripped = private_key.trim().trim_start_matches("0x");
        let bytes = hex::decode(stripped)
            .map_err(|e| VaultError::SigningKeyUnavailable(format!("bad hex: {}", e)))?;
        let wallet = LocalWallet::from_bytes(&bytes)
            .map_err(|e| VaultError::SigningKeyUnavailable(e.to_string()))?;
        let address = checksum_address(&wallet.address());
        let did = format!("{}{}", DID_PREFIX, address);
        Ok(IssuerConfig {
            wallet,
            did,
            address,
        })
    }

    /// The issuer DID, e.g. `did:ethr:0x...`.
    pub fn did(&self) -> &str {
        &self.did
    }

    /// The issuer public key in checksummed address form.
    pub fn public_key(&self) -> &str {
        &self.address
    }
}

/// Service that issues (builds + signs) verifiable credentials.
///
/// Stateless apart from the injected issuer identity, which it only ever
/// reads — concurrent issuance calls are safe without locking.
#[derive(Clone)]
pub struct CredentialEngine {
    issuer: IssuerConfig,
}

impl CredentialEngine {
    /// Creates an engine bound to the given issuer identity.
    pub fn new(issuer: IssuerConfig) -> Self {
        CredentialEngine { issuer }
    }

    /// The issuer identity this engine signs with.
    pub fn issuer(&self) -> &IssuerConfig {
        &self.issuer
    }

    /// Builds an unsigned credential for `holder_did`.
    ///
    /// Caller claims merge over the default degree template: top-level
    /// caller keys win, and when both sides hold an object the objects merge
    /// one level deep (caller keys winning inside as well).
    ///
    /// The holder public key is validated but deliberately not embedded in
    /// the signed payload; see DESIGN.md for why this stays an open question
    /// of the protocol rather than being silently hardened.
    ///
    /// # Errors
    /// [`VaultError::MalformedIdentifier`] when the holder DID or public key
    /// does not parse.
    pub fn build_credential(
        &self,
        holder_did: &str,
        holder_public_key: &str,
        claims: Map<String, Value>,
    ) -> Result<VerifiableCredential, VaultError> {
        if !is_valid_did(holder_did) {
            return Err(VaultError::MalformedIdentifier(holder_did.to_string()));
        }
        if Address::from_str(holder_public_key).is_err() {
            return Err(VaultError::MalformedIdentifier(
                holder_public_key.to_string(),
            ));
        }

        let subject = merge_claims(default_subject(holder_did), claims);

        Ok(VerifiableCredential {
            context: CREDENTIAL_CONTEXT.iter().map(|s| s.to_string()).collect(),
            credential_type: vec![
                "VerifiableCredential".to_string(),
                "DegreeCredential".to_string(),
            ],
            issuer: self.issuer.did.clone(),
            issuance_date: iso_now(),
            credential_subject: subject,
            proof: None,
        })
    }

    /// Signs a credential with the issuer private key and returns a signed
    /// copy; the input is never mutated.
    ///
    /// The proof records the algorithm tag, creation time, the issuer's
    /// `#keys-1` reference, the 65-byte recoverable signature, and the
    /// digest that was signed.
    ///
    /// # Errors
    /// Serialization or ECDSA failures; both leave the input untouched.
    pub fn sign_credential(
        &self,
        unsigned: &VerifiableCredential,
    ) -> Result<VerifiableCredential, VaultError> {
        let digest = credential_digest(unsigned)?;
        let signature = self
            .wallet()
            .sign_hash(digest.into())
            .map_err(|e| VaultError::Signing(e.to_string()))?;

        let mut signed = unsigned.clone();
        signed.proof = Some(Proof {
            proof_type: PROOF_TYPE.to_string(),
            created: iso_now(),
            verification_method: format!("{}#keys-1", self.issuer.did),
            signature_value: format!("0x{}", hex::encode(signature.to_vec())),
            data_hash: format!("0x{}", hex::encode(digest)),
        });

        log::info!("signed credential for {}", subject_id(&signed));
        Ok(signed)
    }

    /// Builds, signs, and tokenizes a credential in one step.
    pub fn issue(
        &self,
        holder_did: &str,
        holder_public_key: &str,
        claims: Map<String, Value>,
    ) -> Result<(VerifiableCredential, String), VaultError> {
        let unsigned = self.build_credential(holder_did, holder_public_key, claims)?;
        let signed = self.sign_credential(&unsigned)?;
        let token = encode_token(&signed)?;
        Ok((signed, token))
    }

    fn wallet(&self) -> &LocalWallet {
        &self.issuer.wallet
    }
}

/// Default claim template for a degree credential.
fn default_subject(holder_did: &str) -> Map<String, Value> {
    let subject = json!({
        "id": holder_did,
        "degree": {
            "type": "BachelorDegree",
            "name": "Bachelor of Technology in Computer Science",
            "university": "Example Tech University",
            "graduationYear": 2025
        }
    });
    subject.as_object().cloned().unwrap_or_default()
}

/// Merges caller claims over the default template, one level deep.
///
/// Top-level caller keys win; where both values are objects, the caller's
/// entries overwrite the template's entries key by key, keeping template
/// entries the caller did not touch.
fn merge_claims(mut base: Map<String, Value>, overrides: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                for (k, v) in incoming {
                    existing.insert(k, v);
                }
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
    base
}

fn subject_id(vc: &VerifiableCredential) -> &str {
    vc.credential_subject
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or("<unknown subject>")
}

/// Encodes a credential as a two-segment transport token:
/// `base64(header json)` + `.` + `base64(credential json)`.
///
/// This is a transport convenience, not a security mechanism. The header
/// (`{"alg":"ES256K","typ":"JWT"}`) is not covered by any signature and is
/// ignored by [`decode_token`] — an edited header is an accepted limitation
/// of the format, since integrity comes from the embedded proof alone.
pub fn encode_token(vc: &VerifiableCredential) -> Result<String, VaultError> {
    let header = json!({ "alg": "ES256K", "typ": "JWT" });
    let header_encoded = base64::encode(serde_json::to_vec(&header)?);
    let payload_encoded = base64::encode(serde_json::to_vec(vc)?);
    Ok(format!("{}.{}", header_encoded, payload_encoded))
}

/// Decodes a transport token back into a credential.
///
/// Only the payload segment is inspected; the header is unchecked by design.
///
/// # Errors
/// [`VaultError::TokenFormatInvalid`] when the token does not have exactly
/// two dot-separated segments or the payload fails base64/JSON decoding.
pub fn decode_token(token: &str) -> Result<VerifiableCredential, VaultError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 2 {
        return Err(VaultError::TokenFormatInvalid(format!(
            "expected 2 segments, found {}",
            parts.len()
        )));
    }
    let payload = base64::decode(parts[1])
        .map_err(|e| VaultError::TokenFormatInvalid(format!("payload base64: {}", e)))?;
    serde_json::from_slice(&payload)
        .map_err(|e| VaultError::TokenFormatInvalid(format!("payload json: {}", e)))
}
