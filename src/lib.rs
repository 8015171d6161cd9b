//! # level-vault
//!
//! Tamper-evident storage and loading of grid puzzle level data.
//!
//! Levels are authored as JSON, sealed into a single authenticated, encrypted
//! container (`levels.dat`) and shipped with the game or served over HTTP. At
//! runtime a [`LevelDatabase`] fetches the container once, verifies and
//! decrypts it, and serves fully populated [`Level`] grids by level number.
//!
//! ## Layers
//! - [`core`]: binary framing of the container and framed block
//! - [`utils::crypto`]: AES-256-CBC + HMAC-SHA256 sealing ([`LevelCrypto`])
//! - [`schema`]: JSON wire records and the in-memory level model
//! - [`loader`]: storage locations and the caching database
//! - [`export`]: build-time conversions between JSON folders and containers
//!
//! ## Example
//! ```no_run
//! use level_vault::{LevelDatabase, LevelSource};
//!
//! # async fn run() -> level_vault::error::Result<()> {
//! let db = LevelDatabase::new(LevelSource::parse("levels.dat")?);
//! match db.get(5).await {
//!     Some(level) => println!("{} x {}", level.columns(), level.rows()),
//!     None => println!("level 5 not available"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod loader;
pub mod schema;
pub mod utils;

pub use crate::core::container::Container;
pub use crate::core::frame::FramedBlock;
pub use error::{LevelError, Result};
pub use loader::{LevelDatabase, LevelSource};
pub use schema::{Cell, Grid, Level, LevelCollectionDto, LevelConfigDto};
pub use utils::crypto::LevelCrypto;
