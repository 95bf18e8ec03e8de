// src/utils/crypto.rs
//! Cryptographic utilities built on Ethereum-compatible primitives.
//!
//! Uses Keccak-256 for all hashing and recoverable secp256k1 ECDSA
//! signatures, so credentials signed here verify with standard Ethereum
//! tooling.

use ethers::types::{Address, RecoveryMessage, Signature};
use ethers::utils::{keccak256, to_checksum};
use std::str::FromStr;

/// Computes a Keccak-256 hash of the input data.
///
/// # Arguments
/// * `data` - Binary data to hash
///
/// # Returns
/// Fixed-size 32-byte array containing the digest.
pub fn hash_data(data: &[u8]) -> [u8; 32] {
    keccak256(data)
}

/// Formats an address as an EIP-55 checksummed hex string with 0x prefix.
pub fn checksum_address(addr: &Address) -> String {
    to_checksum(addr, None)
}

/// Recovers the signer address from a serialized recoverable signature.
///
/// # Arguments
/// * `digest` - The 32-byte digest that was signed
/// * `signature` - 0x-prefixed hex of the 65-byte signature (r || s || v)
///
/// # Returns
/// The recovered signer address, or a description of why recovery failed
/// (malformed hex, bad length, invalid recovery id). The error is a plain
/// string because verification folds it into a result value rather than
/// propagating it.
pub fn recover_signer(digest: [u8; 32], signature: &str) -> Result<Address, String> {
    let sig = Signature::from_str(signature)
        .map_err(|e| format!("malformed signature: {}", e))?;
    sig.recover(RecoveryMessage::Hash(digest.into()))
        .map_err(|e| format!("signature recovery failed: {}", e))
}
