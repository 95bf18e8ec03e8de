// src/services/mod.rs
//! Business logic and API: credential issuance, verification, HTTP surface.

pub mod api_server;
pub mod credential_engine;
pub mod verifier;
