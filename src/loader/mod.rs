//! # Level Loading
//!
//! Fetches the level container from its storage location, authenticates and
//! decrypts it, and serves reconstructed levels from an in-memory cache.
//!
//! ## Components
//! - **LevelSource**: local file, `http(s)` URL or in-memory bytes behind one `fetch` call
//! - **LevelDatabase**: single shared bulk load, cache keyed by level number
//!
//! ## Failure Handling
//! A missing file, a container that fails verification, a stalled download or
//! unparseable plaintext all end the same way: the database is marked loaded
//! with no levels, a warning is logged, and every lookup resolves to `None`.

pub mod database;
pub mod source;

pub use database::LevelDatabase;
pub use source::LevelSource;
