//! Token registry.
//!
//! Maps every access token this proxy issued to the client id that requested
//! it. The provider's profile endpoint needs that client id, and the token
//! alone does not carry it.
//!
//! # Design Decisions
//! - One registry per process, created at startup and handed to handlers
//! - Entries live until the process exits: no expiry, no eviction, no delete
//! - Re-issuing a token supersedes the previous entry

use std::sync::Arc;

use dashmap::DashMap;

use crate::observability::metrics;

/// A thread-safe token → client id map.
#[derive(Clone, Default)]
pub struct TokenRegistry {
    inner: Arc<DashMap<String, String>>,
}

impl TokenRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember which client obtained `token`.
    pub fn record(&self, token: impl Into<String>, client_id: impl Into<String>) {
        self.inner.insert(token.into(), client_id.into());
        metrics::record_registry_size(self.inner.len());
    }

    /// The client id recorded for `token`, if this proxy issued it.
    pub fn client_id_for(&self, token: &str) -> Option<String> {
        self.inner.get(token).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for TokenRegistry {
    // Tokens are credentials; only the count is printable.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRegistry")
            .field("len", &self.inner.len())
            .finish()
    }
}
