//! # Engine Error Types
//!
//! Errors are reserved for initialization and configuration. Capacity
//! overflows during a frame are not errors: the offending call returns
//! `false`, `0`, `None` or a zero rect and the frame continues.

use thiserror::Error;

/// Errors loading a [`crate::ContextConfig`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("invalid config syntax: {0}")]
    Parse(String),

    /// The config file could not be read.
    #[error("cannot read config {path}: {reason}")]
    Io {
        /// File path.
        path: String,
        /// OS error text.
        reason: String,
    },

    /// The config parsed but holds an unusable value.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors creating a [`crate::Context`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// A limit was zero.
    #[error("limit `{field}` must be greater than zero")]
    InvalidLimits {
        /// Name of the offending field.
        field: &'static str,
    },

    /// The memory block is smaller than [`crate::Context::memory_footprint`].
    #[error("memory block too small: need {required} bytes, have {available}")]
    InsufficientMemory {
        /// Bytes needed.
        required: usize,
        /// Bytes supplied.
        available: usize,
    },

    /// Both the renderer and a vector font claim to draw text.
    #[error("renderer text and vector font are mutually exclusive")]
    ConflictingTextBackends,

    /// A vector font was supplied but the renderer cannot fill paths.
    #[error("vector font needs a renderer with path support")]
    MissingPathSupport,

    /// The config was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias for config loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for context creation.
pub type InitResult<T> = Result<T, InitError>;
