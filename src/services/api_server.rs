// src/services/api_server.rs
//! API Server for the DID vault.
//!
//! Thin request/response mapping over the core operations, built with Axum:
//! - DID creation and resolution
//! - Verifiable credential issuance (build + sign + tokenize)
//! - Credential inspection and signature verification
//! - Health check
//!
//! Every endpoint answers with a uniform `{success, data, message|error}`
//! envelope. Generation/issuance errors map to HTTP failure responses here;
//! verification failures are ordinary 200 responses carrying
//! `valid: false`, since the verifier reports rather than throws.

use crate::errors::VaultError;
use crate::models::credential::VerifiableCredential;
use crate::services::credential_engine::CredentialEngine;
use crate::services::verifier::verify_credential;
use crate::wallet::key_management::{create_did_document, extract_public_key, generate_identity};
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// API request structures

/// Request payload for issuing a verifiable credential
#[derive(Deserialize)]
struct IssueVcRequest {
    #[serde(rename = "holderDID")]
    holder_did: Option<String>,
    #[serde(rename = "holderPublicKey")]
    holder_public_key: Option<String>,
    #[serde(rename = "credentialSubject")]
    credential_subject: Option<Map<String, Value>>,
}

/// Request payload for credential inspection and verification
#[derive(Deserialize)]
struct VerifyVcRequest {
    vc: Option<VerifiableCredential>,
    #[serde(rename = "issuerPublicKey")]
    issuer_public_key: Option<String>,
}

/// Shared handler state: the engine behind an `Arc`, read-only after startup.
#[derive(Clone)]
struct AppState {
    engine: Arc<CredentialEngine>,
}

/// HTTP server wiring the core operations to routes.
pub struct ApiServer {
    engine: Arc<CredentialEngine>,
}

impl ApiServer {
    /// Creates a server around an already-initialized engine.
    ///
    /// The engine must be fully constructed before `run` is called; there is
    /// no lazy issuer initialization to race against.
    pub fn new(engine: CredentialEngine) -> Self {
        ApiServer {
            engine: Arc::new(engine),
        }
    }

    /// Builds the router with all API routes and permissive CORS.
    pub fn router(&self) -> Router {
        let state = AppState {
            engine: self.engine.clone(),
        };
        Router::new()
            .route("/api/create-did", post(create_did))
            .route("/api/did-info/:did", get(did_info))
            .route("/api/issue-vc", post(issue_vc))
            .route("/api/vc-info", post(vc_info))
            .route("/api/verify-vc", post(verify_vc))
            .route("/api/verify-signature", post(verify_signature))
            .route("/health", get(health))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Binds and serves until the process is stopped.
    pub async fn run(self, addr: SocketAddr) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("API server listening on http://{}", addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Maps core errors to HTTP status codes: caller mistakes are 400, broken
/// configuration or environment is 500.
fn error_status(err: &VaultError) -> StatusCode {
    match err {
        VaultError::MalformedIdentifier(_) | VaultError::TokenFormatInvalid(_) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "success": false, "error": error.into() })),
    )
}

/// POST /api/create-did
///
/// Generates a fresh identity and its DID document. The private key appears
/// in this response and nowhere else; the client must store it.
async fn create_did(State(_state): State<AppState>) -> (StatusCode, Json<Value>) {
    log::info!("processing /api/create-did");
    match generate_identity() {
        Ok(identity) => {
            let document = create_did_document(&identity.did, &identity.public_key);
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": {
                        "did": identity.did,
                        "publicKey": identity.public_key,
                        "privateKey": identity.private_key,
                        "didDocument": document,
                        "createdAt": identity.created_at,
                    },
                    "message": "DID created successfully. Store the private key securely!",
                })),
            )
        }
        Err(e) => {
            log::error!("create-did failed: {}", e);
            failure(error_status(&e), e.to_string())
        }
    }
}

/// GET /api/did-info/:did
///
/// Validates a DID and resolves it to a mock DID document. Stands in for a
/// real DID resolution service.
async fn did_info(
    State(_state): State<AppState>,
    Path(did): Path<String>,
) -> (StatusCode, Json<Value>) {
    log::info!("resolving DID {}", did);
    match extract_public_key(&did) {
        Ok(public_key) => {
            let document = create_did_document(&did, &public_key);
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "data": {
                        "did": did,
                        "publicKey": public_key,
                        "didDocument": document,
                    },
                })),
            )
        }
        Err(e) => failure(error_status(&e), e.to_string()),
    }
}

/// POST /api/issue-vc
///
/// The backend acts as the fixed issuer (e.g. a university): builds, signs,
/// and tokenizes a credential for the supplied holder.
async fn issue_vc(
    State(state): State<AppState>,
    Json(request): Json<IssueVcRequest>,
) -> (StatusCode, Json<Value>) {
    let (holder_did, holder_public_key) = match (request.holder_did, request.holder_public_key) {
        (Some(did), Some(key)) => (did, key),
        _ => {
            return failure(
                StatusCode::BAD_REQUEST,
                "Missing required fields: holderDID, holderPublicKey",
            )
        }
    };
    log::info!("issuing credential for {}", holder_did);

    let claims = request.credential_subject.unwrap_or_default();
    match state.engine.issue(&holder_did, &holder_public_key, claims) {
        Ok((signed, token)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "vc": signed,
                    "vcToken": token,
                    "issuer": {
                        "did": state.engine.issuer().did(),
                        "publicKey": state.engine.issuer().public_key(),
                    },
                    "holder": {
                        "did": holder_did,
                        "publicKey": holder_public_key,
                    },
                },
                "message": "VC issued successfully",
            })),
        ),
        Err(e) => {
            log::error!("issue-vc failed: {}", e);
            failure(error_status(&e), e.to_string())
        }
    }
}

/// POST /api/vc-info
///
/// Surfaces credential metadata without verifying anything, for display
/// ahead of a verification call.
async fn vc_info(
    State(_state): State<AppState>,
    Json(request): Json<VerifyVcRequest>,
) -> (StatusCode, Json<Value>) {
    let vc = match request.vc {
        Some(vc) => vc,
        None => return failure(StatusCode::BAD_REQUEST, "Missing VC in request body"),
    };
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "type": vc.credential_type,
                "issuer": vc.issuer,
                "issuanceDate": vc.issuance_date,
                "credentialSubject": vc.credential_subject,
                "hasSignature": vc.proof.is_some(),
                "signatureType": vc.proof.as_ref().map(|p| p.proof_type.clone()),
                "context": vc.context,
            },
        })),
    )
}

/// POST /api/verify-vc
///
/// Full verification envelope: signature check against the supplied issuer
/// key (defaulting to the configured issuer), proof details, and the
/// recovered signer.
async fn verify_vc(
    State(state): State<AppState>,
    Json(request): Json<VerifyVcRequest>,
) -> (StatusCode, Json<Value>) {
    let vc = match request.vc {
        Some(vc) => vc,
        None => return failure(StatusCode::BAD_REQUEST, "Missing VC in request body"),
    };
    let claimed_key = request
        .issuer_public_key
        .unwrap_or_else(|| state.engine.issuer().public_key().to_string());

    log::info!("verifying credential issued by {}", vc.issuer);
    let result = verify_credential(&vc, &claimed_key);

    let message = if result.valid {
        "Credential is valid and authentic!".to_string()
    } else {
        format!(
            "Verification failed: {}",
            result.reason.as_deref().unwrap_or("unknown")
        )
    };

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "valid": result.valid,
                "issuer": result.issuer,
                "credentialType": vc.credential_type,
                "credentialSubject": vc.credential_subject,
                "issuanceDate": vc.issuance_date,
                "proofDetails": {
                    "type": vc.proof.as_ref().map(|p| p.proof_type.clone()),
                    "verificationMethod": result.verification_method,
                    "created": vc.proof.as_ref().map(|p| p.created.clone()),
                },
                "verification": {
                    "signatureValid": result.valid,
                    "recoveredAddress": result.recovered_address,
                    "reason": result.reason,
                    "timestamp": result.timestamp,
                },
            },
            "message": message,
        })),
    )
}

/// POST /api/verify-signature
///
/// Lower-level check: requires both a proof-bearing credential and an
/// explicit issuer key.
async fn verify_signature(
    State(_state): State<AppState>,
    Json(request): Json<VerifyVcRequest>,
) -> (StatusCode, Json<Value>) {
    let vc = match request.vc {
        Some(vc) if vc.proof.is_some() => vc,
        _ => return failure(StatusCode::BAD_REQUEST, "VC must have a proof/signature"),
    };
    let claimed_key = match request.issuer_public_key {
        Some(key) => key,
        None => return failure(StatusCode::BAD_REQUEST, "issuerPublicKey is required"),
    };

    let result = verify_credential(&vc, &claimed_key);
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "valid": result.valid,
                "issuer": result.issuer,
                "recoveredAddress": result.recovered_address,
                "reason": result.reason,
            },
        })),
    )
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "Server is running" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::credential_engine::IssuerConfig;
    use crate::wallet::key_management::generate_identity;

    const TEST_ISSUER_KEY: &str =
        "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn test_state() -> AppState {
        let issuer = IssuerConfig::from_private_key(TEST_ISSUER_KEY).unwrap();
        AppState {
            engine: Arc::new(CredentialEngine::new(issuer)),
        }
    }

    #[tokio::test]
    async fn test_create_did_returns_key_bundle() {
        let (status, Json(body)) = create_did(State(test_state())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        let did = body["data"]["did"].as_str().unwrap();
        assert!(did.starts_with("did:ethr:0x"));
        assert!(body["data"]["privateKey"].as_str().unwrap().starts_with("0x"));
        assert_eq!(body["data"]["didDocument"]["id"], json!(did));
    }

    #[tokio::test]
    async fn test_did_info_rejects_malformed() {
        let (status, Json(body)) =
            did_info(State(test_state()), Path("did:ethr:garbage".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_issue_and_verify_flow() {
        let state = test_state();
        let holder = generate_identity().unwrap();

        let (status, Json(body)) = issue_vc(
            State(state.clone()),
            Json(IssueVcRequest {
                holder_did: Some(holder.did.clone()),
                holder_public_key: Some(holder.public_key.clone()),
                credential_subject: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["vcToken"].as_str().unwrap().contains('.'));

        let vc: VerifiableCredential =
            serde_json::from_value(body["data"]["vc"].clone()).unwrap();

        // Defaulting to the configured issuer key verifies cleanly
        let (status, Json(body)) = verify_vc(
            State(state),
            Json(VerifyVcRequest {
                vc: Some(vc),
                issuer_public_key: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["valid"], json!(true));
    }

    #[tokio::test]
    async fn test_issue_requires_holder_fields() {
        let (status, Json(body)) = issue_vc(
            State(test_state()),
            Json(IssueVcRequest {
                holder_did: None,
                holder_public_key: None,
                credential_subject: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_verify_signature_requires_proof_and_key() {
        let state = test_state();
        let holder = generate_identity().unwrap();
        let unsigned = state
            .engine
            .build_credential(&holder.did, &holder.public_key, Map::new())
            .unwrap();

        let (status, _) = verify_signature(
            State(state.clone()),
            Json(VerifyVcRequest {
                vc: Some(unsigned),
                issuer_public_key: Some(state.engine.issuer().public_key().to_string()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
