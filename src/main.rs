// src/main.rs

//! # DID Vault — Main Entry Point
//!
//! Backend for a decentralized-identity demo: DID generation, verifiable
//! credential issuance, and signature verification.
//!
//! ## Architecture Overview
//! 1. **Wallet Layer**: secp256k1 key generation and `did:ethr` derivation
//! 2. **Services Layer**: credential engine, verifier, and API endpoints
//! 3. **Models**: W3C-shaped credential and DID document structures
//! 4. **Utils**: keccak-256 hashing and the shared canonicalization
//!
//! ## Environment Variables
//! - `ISSUER_PRIVATE_KEY`: (Optional) issuer signing key; falls back to the
//!   fixed demo key so the demo runs with zero setup
//! - `PORT`: (Optional) listen port (default: 5000)

use crate::services::api_server::ApiServer;
use crate::services::credential_engine::{CredentialEngine, IssuerConfig};
use dotenv::dotenv;
use std::net::SocketAddr;

// Module declarations (organized by functional domain)
mod errors; // Error taxonomy
mod models; // Data structures
mod services; // Business logic and API
mod utils; // Hashing and canonicalization helpers
mod wallet; // Cryptographic key operations

/// Demo issuer key, matching the simulated university issuer. Override with
/// `ISSUER_PRIVATE_KEY` for anything beyond a local demo.
const DEMO_ISSUER_KEY: &str = "0x0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Main application entry point.
///
/// The issuer configuration is built eagerly, before the server accepts any
/// request, so issuance never races against key initialization.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let issuer_key =
        std::env::var("ISSUER_PRIVATE_KEY").unwrap_or_else(|_| DEMO_ISSUER_KEY.to_string());
    let issuer = IssuerConfig::from_private_key(&issuer_key)?;
    log::info!("issuer DID initialized: {}", issuer.did());

    let engine = CredentialEngine::new(issuer);
    let api_server = ApiServer::new(engine);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("DID vault backend running at http://{}", addr);
    println!("Available endpoints:");
    println!("- POST /api/create-did");
    println!("- GET  /api/did-info/:did");
    println!("- POST /api/issue-vc");
    println!("- POST /api/vc-info");
    println!("- POST /api/verify-vc");
    println!("- POST /api/verify-signature");

    api_server.run(addr).await
}
