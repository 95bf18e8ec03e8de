// src/models/mod.rs
//! Data structures shared across the DID vault.

pub mod credential;
pub mod did;
