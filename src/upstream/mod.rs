//! Upstream identity provider access.
//!
//! # Data Flow
//! ```text
//! oauth handlers
//!     → client.rs (build URL, forward query/form, send)
//!     → provider (/oauth2.0/*, /user/get_user_info)
//!     → RawResponse (authorize) or JsonResponse (everything else)
//!     → error.rs (transport / status / malformed)
//! ```

pub mod client;
pub mod error;

pub use client::{ClientBuildError, JsonResponse, RawResponse, UpstreamClient};
pub use error::UpstreamError;
