//! Error types for jsonwrap-core.
//!
//! Only two failure classes are hard errors during hydration:
//! - malformed JSON text (`WrapError::Syntax`)
//! - a class whose zero-argument constructor fails (`WrapError::Construction`)
//!
//! Unresolved `$class` markers and schema/input shape mismatches are not
//! errors; hydration degrades to plain structures in those cases.

use thiserror::Error;

/// Result alias used across the crate.
pub type WrapResult<T> = Result<T, WrapError>;

/// Unified error type for jsonwrap-core.
#[derive(Debug, Error)]
pub enum WrapError {
    /// Input text is not valid JSON.
    #[error("syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A class default constructor failed. Every class must construct without
    /// arguments and without failing, so this is a contract violation by the
    /// class declaration and is never recovered from.
    #[error("default constructor of class `{class}` failed: {source}")]
    Construction {
        class: String,
        #[source]
        source: ConstructError,
    },

    /// Hydration was requested for a class name that was never registered.
    #[error("unknown class: {0}")]
    UnknownClass(String),

    /// Input exceeded a configured boundary limit.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Configuration rejected by `validate_config`.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Caller supplied an argument the API cannot use.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl WrapError {
    pub fn construction(class: impl Into<String>, source: ConstructError) -> Self {
        Self::Construction {
            class: class.into(),
            source,
        }
    }

    pub fn limit_exceeded(msg: impl Into<String>) -> Self {
        Self::LimitExceeded(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Returns true for malformed-input errors.
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax(_))
    }
}

/// Failure reported by a class default constructor.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ConstructError(#[from] anyhow::Error);

impl ConstructError {
    pub fn msg(msg: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self(anyhow::Error::msg(msg))
    }
}
