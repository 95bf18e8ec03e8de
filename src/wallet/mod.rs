// src/wallet/mod.rs
//! Cryptographic key operations and DID derivation.

pub mod key_management;
