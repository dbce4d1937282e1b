//! Error types for Reelkit.
//!
//! These cover configuration and persistence faults. User-correctable edit
//! failures and export rejections have their own types in the timeline and
//! export crates.

use thiserror::Error;

/// Main error type for Reelkit operations.
#[derive(Error, Debug)]
pub enum ReelkitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Timeline invariant violated: {0}")]
    Invariant(String),
}

/// Result type alias for Reelkit operations.
pub type Result<T> = std::result::Result<T, ReelkitError>;
