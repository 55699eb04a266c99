//! Yahoo Fantasy Sports API client.
//!
//! - `http`: Transport capability and the reqwest implementation
//! - `api`: The authenticated API handle
//! - `resources`: Typed resources decoded from API payloads

pub mod api;
pub mod http;
pub mod resources;

pub use api::FantasyApi;

#[cfg(test)]
pub(crate) mod testing;
