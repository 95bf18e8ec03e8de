// src/services/verifier.rs
//! Credential signature verification.
//!
//! Determines whether a credential's proof was produced by a specific
//! claimed issuer key over exactly the credential's current fields. Pure:
//! no side effects, no process state beyond the shared canonicalization
//! rules, and it NEVER returns an error — every failure mode collapses into
//! `{valid: false, reason}` so callers render a uniform outcome.

use crate::models::credential::{VerifiableCredential, VerificationResult};
use crate::utils::canonical::credential_digest;
use crate::utils::crypto::{checksum_address, recover_signer};
use crate::utils::iso_now;

/// Verifies a credential's proof against a claimed issuer public key.
///
/// Steps:
/// 1. A missing proof short-circuits to `reason: "missing proof"`.
/// 2. The canonical bytes and keccak-256 digest are recomputed with the
///    SAME module used at issuance ([`crate::utils::canonical`]).
/// 3. The signer address is recovered from the recoverable signature.
/// 4. The recovered address is compared to `claimed_issuer_key`
///    case-insensitively (hex encodings carry no case information).
///
/// Malformed signatures, unserializable payloads, and recovery failures are
/// all reported as invalid results, never propagated.
pub fn verify_credential(
    vc: &VerifiableCredential,
    claimed_issuer_key: &str,
) -> VerificationResult {
    let proof = match &vc.proof {
        Some(proof) => proof,
        None => return VerificationResult::invalid("missing proof"),
    };

    let digest = match credential_digest(vc) {
        Ok(digest) => digest,
        Err(e) => {
            return VerificationResult::invalid(format!("canonicalization failed: {}", e));
        }
    };

    let recovered = match recover_signer(digest, &proof.signature_value) {
        Ok(address) => checksum_address(&address),
        Err(reason) => return VerificationResult::invalid(reason),
    };

    let valid = recovered.eq_ignore_ascii_case(claimed_issuer_key.trim());

    log::debug!(
        "verification: claimed={} recovered={} valid={}",
        claimed_issuer_key,
        recovered,
        valid
    );

    VerificationResult {
        valid,
        issuer: Some(vc.issuer.clone()),
        recovered_address: Some(recovered),
        verification_method: Some(proof.verification_method.clone()),
        reason: if valid {
            None
        } else {
            Some("recovered signer does not match claimed issuer key".to_string())
        },
        timestamp: iso_now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::credential_engine::{CredentialEngine, IssuerConfig};
    use crate::wallet::key_management::generate_identity;
    use serde_json::{json, Map};

    const TEST_ISSUER_KEY: &str =
        "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn engine() -> CredentialEngine {
        CredentialEngine::new(IssuerConfig::from_private_key(TEST_ISSUER_KEY).unwrap())
    }

    fn issued_credential(engine: &CredentialEngine) -> crate::models::credential::VerifiableCredential {
        let holder = generate_identity().unwrap();
        let claims = json!({
            "degree": { "type": "BachelorDegree", "graduationYear": 2025 }
        });
        let unsigned = engine
            .build_credential(
                &holder.did,
                &holder.public_key,
                claims.as_object().cloned().unwrap(),
            )
            .unwrap();
        engine.sign_credential(&unsigned).unwrap()
    }

    #[test]
    fn test_valid_signature_verifies() {
        let engine = engine();
        let signed = issued_credential(&engine);

        let result = verify_credential(&signed, engine.issuer().public_key());
        assert!(result.valid);
        assert!(result.reason.is_none());
        assert_eq!(
            result.recovered_address.as_deref(),
            Some(engine.issuer().public_key())
        );
        assert_eq!(result.issuer.as_deref(), Some(engine.issuer().did()));
    }

    #[test]
    fn test_verification_is_repeatable() {
        let engine = engine();
        let signed = issued_credential(&engine);

        // Same unmodified credential verifies every time
        assert!(verify_credential(&signed, engine.issuer().public_key()).valid);
        assert!(verify_credential(&signed, engine.issuer().public_key()).valid);
    }

    #[test]
    fn test_key_comparison_is_case_insensitive() {
        let engine = engine();
        let signed = issued_credential(&engine);

        let lower = engine.issuer().public_key().to_lowercase();
        let upper = format!("0x{}", lower.trim_start_matches("0x").to_uppercase());
        assert!(verify_credential(&signed, &lower).valid);
        assert!(verify_credential(&signed, &upper).valid);
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let engine = engine();
        let signed = issued_credential(&engine);
        let stranger = generate_identity().unwrap();

        let result = verify_credential(&signed, &stranger.public_key);
        assert!(!result.valid);
        assert_ne!(
            result.recovered_address.as_deref().unwrap().to_lowercase(),
            stranger.public_key.to_lowercase()
        );
        assert!(result.reason.is_some());
    }

    #[test]
    fn test_missing_proof() {
        let engine = engine();
        let holder = generate_identity().unwrap();
        let unsigned = engine
            .build_credential(&holder.did, &holder.public_key, Map::new())
            .unwrap();

        let result = verify_credential(&unsigned, engine.issuer().public_key());
        assert!(!result.valid);
        assert_eq!(result.reason.as_deref(), Some("missing proof"));
    }

    #[test]
    fn test_tampered_subject_is_rejected() {
        let engine = engine();
        let signed = issued_credential(&engine);

        let mut tampered = signed.clone();
        tampered.credential_subject.insert(
            "degree".to_string(),
            json!({ "type": "PhD", "graduationYear": 2025 }),
        );
        assert!(!verify_credential(&tampered, engine.issuer().public_key()).valid);

        let mut tampered = signed.clone();
        tampered
            .credential_subject
            .insert("honors".to_string(), json!(true));
        assert!(!verify_credential(&tampered, engine.issuer().public_key()).valid);
    }

    #[test]
    fn test_tampered_metadata_is_rejected() {
        let engine = engine();
        let signed = issued_credential(&engine);

        let mut tampered = signed.clone();
        tampered.issuer = "did:ethr:0x0000000000000000000000000000000000000001".to_string();
        assert!(!verify_credential(&tampered, engine.issuer().public_key()).valid);

        let mut tampered = signed.clone();
        tampered.issuance_date = "1999-01-01T00:00:00.000Z".to_string();
        assert!(!verify_credential(&tampered, engine.issuer().public_key()).valid);
    }

    #[test]
    fn test_malformed_signature_reports_not_panics() {
        let engine = engine();
        let mut signed = issued_credential(&engine);
        signed.proof.as_mut().unwrap().signature_value = "0xnot-a-signature".to_string();

        let result = verify_credential(&signed, engine.issuer().public_key());
        assert!(!result.valid);
        assert!(result.reason.unwrap().contains("malformed signature"));
    }

    #[test]
    fn test_end_to_end_degree_scenario() {
        // Generate identity A, issue a degree credential for A, then check
        // the real issuer key passes and a random key fails.
        let engine = engine();
        let identity_a = generate_identity().unwrap();
        let claims = json!({
            "degree": { "type": "BachelorDegree", "graduationYear": 2025 }
        });
        let (signed, token) = engine
            .issue(
                &identity_a.did,
                &identity_a.public_key,
                claims.as_object().cloned().unwrap(),
            )
            .unwrap();

        // Token survives transport
        let received = crate::services::credential_engine::decode_token(&token).unwrap();
        assert_eq!(received, signed);

        assert!(verify_credential(&received, engine.issuer().public_key()).valid);

        let random_key = generate_identity().unwrap().public_key;
        assert!(!verify_credential(&received, &random_key).valid);
    }
}
