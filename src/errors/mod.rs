//! # Error Handling
//!
//! Error types for the cachette secret storage service, built on `thiserror`.
//!
//! The repository layer is the sole origin of [`CachetteError::NotFound`] and
//! [`CachetteError::Connection`]; the service layer propagates them unchanged
//! and the transport layer maps them onto wire status codes.

/// Custom result type for cachette operations
pub type Result<T> = std::result::Result<T, CachetteError>;

/// Main error type for the cachette service
#[derive(thiserror::Error, Debug)]
pub enum CachetteError {
    /// The requested secret does not exist or has expired. Callers cannot
    /// distinguish "never existed" from "expired" from this error alone.
    #[error("secret not found: {id}")]
    NotFound { id: String },

    /// The storage backend is unreachable or misconfigured, or an
    /// init/ping/close/timeout failure occurred.
    #[error("storage connection error: {context}")]
    Connection {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An operation was invoked after `close` released the repository.
    #[error("repository is closed")]
    Closed,

    /// Invalid configuration, fatal at startup
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal errors (corrupt stored payload and similar)
    #[error("internal error: {0}")]
    Internal(String),
}

impl CachetteError {
    /// Create a not-found error for the given secret id
    pub fn not_found<S: Into<String>>(id: S) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a connection error without an underlying source
    pub fn connection<S: Into<String>>(context: S) -> Self {
        Self::Connection { context: context.into(), source: None }
    }

    /// Create a connection error wrapping an underlying backend error
    pub fn connection_with_source<S: Into<String>>(
        context: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Connection { context: context.into(), source: Some(source) }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error means the secret is absent (or expired)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sqlx::Error> for CachetteError {
    fn from(error: sqlx::Error) -> Self {
        Self::Connection {
            context: "database operation failed".to_string(),
            source: Some(Box::new(error)),
        }
    }
}

impl From<redis::RedisError> for CachetteError {
    fn from(error: redis::RedisError) -> Self {
        Self::Connection {
            context: "redis operation failed".to_string(),
            source: Some(Box::new(error)),
        }
    }
}
