//! # Error Types
//!
//! Error handling for the level container, schema and loader.
//!
//! This module defines every error variant that can occur while sealing,
//! opening, parsing or loading level data.
//!
//! ## Error Categories
//! - **I/O Errors**: File system and network fetch failures
//! - **Format Errors**: Truncated containers, bad magic, unsupported versions
//! - **Cryptographic Errors**: Authentication and decryption failures
//! - **Schema Errors**: Malformed plaintext, out-of-range level records
//! - **Configuration Errors**: Invalid or unreadable configuration
//!
//! Format and cryptographic errors are recoverable by design: the loader treats
//! any of them as "level data unavailable" and never crashes.
//!
//! ## Example Usage
//! ```rust
//! use level_vault::error::{LevelError, Result};
//! use level_vault::utils::crypto::LevelCrypto;
//! use tracing::warn;
//!
//! fn open(bytes: &[u8]) -> Result<Vec<u8>> {
//!     LevelCrypto::new().decrypt(bytes)
//! }
//!
//! match open(&[0u8; 4]) {
//!     Err(LevelError::TruncatedContainer) => {}
//!     other => warn!(?other, "unexpected result"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Source errors
    pub const ERR_TRAILING_DATA: &str = "Unexpected bytes after container";
    pub const ERR_EMPTY_SOURCE: &str = "Level source produced no container";

    /// Cryptographic errors
    pub const ERR_AUTHENTICATION_FAILED: &str = "Container authentication failed";

    /// Schema errors
    pub const ERR_LEVEL_NUMBER: &str = "Level number must be at least 1";
}

/// LevelError is the primary error type for all level data operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum LevelError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Json(#[from] serde_json::Error),

    #[error("Container is truncated")]
    TruncatedContainer,

    #[error("Invalid payload length: {0}")]
    InvalidPayloadLength(i32),

    #[error("Invalid tag length: {0}")]
    InvalidTagLength(usize),

    #[error("Container too large: {0} bytes")]
    OversizedContainer(usize),

    #[error("{}", constants::ERR_AUTHENTICATION_FAILED)]
    AuthenticationFailed,

    #[error("Invalid format magic")]
    InvalidMagic,

    #[error("Unsupported format version: {0}")]
    UnsupportedVersion(u8),

    #[error("Invalid IV length: {0}")]
    InvalidIvLength(u8),

    #[error("Invalid cipher length: {0}")]
    InvalidCipherLength(i32),

    #[error("Decryption failed")]
    DecryptionFailure,

    #[error("Encryption failed")]
    EncryptionFailure,

    #[error("Randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Timeout occurred")]
    Timeout,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl LevelError {
    /// Whether this error was raised by container framing or cryptography,
    /// i.e. the input bytes themselves are unusable.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            LevelError::TruncatedContainer
                | LevelError::InvalidPayloadLength(_)
                | LevelError::InvalidTagLength(_)
                | LevelError::OversizedContainer(_)
                | LevelError::AuthenticationFailed
                | LevelError::InvalidMagic
                | LevelError::UnsupportedVersion(_)
                | LevelError::InvalidIvLength(_)
                | LevelError::InvalidCipherLength(_)
                | LevelError::DecryptionFailure
        )
    }
}

/// Type alias for Results using LevelError
pub type Result<T> = std::result::Result<T, LevelError>;
