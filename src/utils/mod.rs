//! # Utility Modules
//!
//! Supporting utilities for cryptography, logging, metrics and timing.
//!
//! ## Components
//! - **Crypto**: AES-256-CBC + HMAC-SHA256 container sealing
//! - **Logging**: Structured logging setup from [`crate::config::LoggingConfig`]
//! - **Metrics**: Per-database loader counters
//! - **Timeout**: Async timeout wrappers
//!
//! ## Security
//! - Cryptographically secure IVs (getrandom)
//! - Constant-time tag comparison (subtle)
//! - Key material wiped on drop (zeroize)

pub mod crypto;
pub mod logging;
pub mod metrics;
pub mod timeout;

pub use crypto::LevelCrypto;
pub use metrics::{LoaderMetrics, MetricsSnapshot};
