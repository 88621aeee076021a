//! Bearer token holder
//!
//! The token is an explicit dependency: the HTTP client reads it per request
//! and the kiosk subscribes to it to notice authentication loss. Backed by a
//! `watch` channel so every clone sees the same value.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Shared handle to the current bearer token
#[derive(Clone)]
pub struct Credentials {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl Credentials {
    /// Unauthenticated credentials
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Credentials restored from a persisted token
    pub fn with_token(token: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(Some(token.into()));
        Self { tx: Arc::new(tx) }
    }

    /// Store a freshly issued token
    pub fn set_token(&self, token: impl Into<String>) {
        self.tx.send_replace(Some(token.into()));
        tracing::debug!("Credentials updated");
    }

    /// Drop the token. Returns whether one was present.
    pub fn clear(&self) -> bool {
        let cleared = self.tx.send_if_modified(|token| token.take().is_some());
        if cleared {
            tracing::info!("Credentials cleared");
        }
        cleared
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    /// `Authorization` header value
    pub fn bearer(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|t| format!("Bearer {}", t))
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    /// Receiver that wakes on every login / logout
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
