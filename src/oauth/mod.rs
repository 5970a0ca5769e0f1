//! OAuth endpoint handlers.
//!
//! # Data Flow
//! ```text
//! GET  /oauth2.0/authorize → authorize.rs → provider (verbatim relay)
//! POST /oauth2.0/token     → token.rs     → provider → reshape → registry write
//! GET  /oauth2.0/me        → me.rs        → provider ×2 → identity.rs
//! ```

pub mod authorize;
pub mod bearer;
pub mod identity;
pub mod me;
pub mod token;

pub use authorize::authorize_handler;
pub use identity::{Gender, IdentityRecord};
pub use me::me_handler;
pub use token::{normalize_token_response, token_handler, TokenOutcome};
