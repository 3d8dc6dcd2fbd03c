//! HTTP transport adapter.
//!
//! Translates wire requests into [`crate::services::SecretService`] calls
//! and maps the core error taxonomy onto HTTP status codes. Authentication
//! happens here, before the core is reached.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::services::{CounterService, SecretService};

pub use auth::{issue_token, AuthenticatedPrincipal};
pub use error::ApiError;
pub use routes::build_router;
pub use server::start_api_server;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<SecretService>,
    pub counters: Arc<CounterService>,
    pub auth: AuthConfig,
    pub hostname: String,
}

impl ApiState {
    pub fn new(
        service: Arc<SecretService>,
        counters: Arc<CounterService>,
        auth: AuthConfig,
        hostname: String,
    ) -> Self {
        Self { service, counters, auth, hostname }
    }
}
