//! Authentication and authorization core.
//!
//! - `token`: HS256 bearer token issuance and verification
//! - `service`: registration and login workflows over a `CredentialStore`
//! - `gate`: per-route role checks as an axum extractor
//! - `claims`, `role`, `identity`: the shared data model

pub mod claims;
pub mod deadline;
pub mod gate;
pub mod handlers;
pub mod identity;
pub mod password;
pub mod role;
pub mod service;
pub mod store;
pub mod token;
