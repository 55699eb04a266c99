//! Core utilities for the Yahoo Fantasy Sports client
//!
//! This module consolidates the pieces every resource builds on:
//! - `config`: Endpoint, response format and credential file location
//! - `decode`: Normalizers for counted arrays, flattened key arrays and tuple wrappers
//! - `de`: Serde helpers for loosely typed wire scalars

pub mod config;
pub mod de;
pub mod decode;

// Re-export commonly used items for convenience
pub use config::{ApiConfig, DEFAULT_BASE_URL, DEFAULT_FORMAT};
pub use decode::{
    decode_counted_array, encode_counted_array, flatten_field_array, flatten_keyed_array,
    merge_mixed, unwrap_tuple,
};
