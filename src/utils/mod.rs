// src/utils/mod.rs
//! Helper functions: hashing, canonical serialization, timestamps.

pub mod canonical;
pub mod crypto;

use chrono::{SecondsFormat, Utc};

/// Current UTC time as an ISO-8601 string with millisecond precision,
/// e.g. `2026-08-30T12:34:56.789Z`.
pub fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
