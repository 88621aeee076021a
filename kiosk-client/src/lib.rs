//! Kiosk Client - HTTP client for the ordering backend
//!
//! Provides the REST calls the kiosk makes (token, menu, order create /
//! append / checkout / fetch) behind the [`KioskApi`] trait, with the bearer
//! token threaded in explicitly through [`Credentials`].

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use api::KioskApi;
pub use auth::Credentials;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient};

// Re-export shared types for convenience
pub use shared::client::{LoginForm, TokenResponse};
