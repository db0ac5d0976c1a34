//! Error types module
//!
//! Errors raised around the licensing core. The evaluation functions never
//! fail; missing data is modelled as a restrictive answer. Errors come from
//! data access, record validation, and the `require_*` service operations that
//! turn a restrictive answer into a hard failure.
//!
//! The `Database` variant carries a `sqlx::Error` when the `sqlx` feature is on
//! and a plain message otherwise.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected outcomes: bad input, limits and entitlement denials
    Warn,
    /// Unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Usage limit exceeded: {resource} usage {used}/{limit}")]
    UsageLimitExceeded {
        resource: String,
        used: i64,
        limit: i64,
    },

    #[error("Subscription required: {0}")]
    SubscriptionRequired(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

impl AppError {
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::Database(_) => LogLevel::Error,
            AppError::InvalidInput(_)
            | AppError::UsageLimitExceeded { .. }
            | AppError::SubscriptionRequired(_) => LogLevel::Warn,
        }
    }

    /// Whether the error is a licensing denial rather than a failure to decide.
    pub fn is_entitlement_denial(&self) -> bool {
        matches!(
            self,
            AppError::UsageLimitExceeded { .. } | AppError::SubscriptionRequired(_)
        )
    }
}
