//! Application configuration.
//!
//! Settings are loaded from the environment exactly once at startup and
//! passed by reference into each component's constructor; no component reads
//! ambient global state directly.

pub mod settings;

pub use settings::{
    AuthConfig, BackendKind, DatabaseConfig, ObservabilityConfig, ServerConfig, Settings,
};
