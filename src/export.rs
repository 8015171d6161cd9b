//! # Level Export
//!
//! File-level conversions between authored level data and the shipped container.
//!
//! - [`write_container`] / [`read_container`]: the encrypted `levels.dat`
//! - [`write_json_dir`]: one indented `level_<n>.json` per level, for review and diffing
//! - [`read_json_dir`]: gather a folder of per-level JSON files into one collection
//!
//! These run at build time, so they use blocking file I/O.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::{LevelError, Result};
use crate::schema::{LevelCollectionDto, LevelConfigDto};
use crate::utils::crypto::LevelCrypto;

/// File name used for a level in a JSON export directory
pub fn level_file_name(level: i32) -> String {
    format!("level_{level}.json")
}

/// Serialize and seal a collection into a single container file
#[instrument(skip_all, fields(path = %path.as_ref().display(), levels = collection.levels.len()))]
pub fn write_container<P: AsRef<Path>>(
    collection: &LevelCollectionDto,
    crypto: &LevelCrypto,
    path: P,
) -> Result<usize> {
    let plaintext = collection.to_json_vec()?;
    let sealed = crypto.encrypt(&plaintext)?;
    fs::write(path.as_ref(), &sealed)?;
    info!(bytes = sealed.len(), "Wrote level container");
    Ok(sealed.len())
}

/// Open a container file and parse its plaintext
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn read_container<P: AsRef<Path>>(crypto: &LevelCrypto, path: P) -> Result<LevelCollectionDto> {
    let data = fs::read(path.as_ref())?;
    let plaintext = crypto.decrypt(&data)?;
    LevelCollectionDto::from_json_slice(&plaintext)
}

/// Write every level as its own indented JSON file; returns the written paths
#[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub fn write_json_dir<P: AsRef<Path>>(
    collection: &LevelCollectionDto,
    dir: P,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(collection.levels.len());
    for level in &collection.levels {
        let path = dir.join(level_file_name(level.level));
        fs::write(&path, level.to_json_pretty()?)?;
        debug!(level = level.level, path = %path.display(), "Wrote level file");
        written.push(path);
    }
    info!(files = written.len(), "Exported levels as JSON");
    Ok(written)
}

/// Read every `*.json` file in `dir` as one level record, ordered by level number
#[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub fn read_json_dir<P: AsRef<Path>>(dir: P) -> Result<LevelCollectionDto> {
    let mut levels = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let data = fs::read(&path)?;
        let level = LevelConfigDto::from_json_slice(&data).map_err(|e| {
            LevelError::SchemaError(format!("{}: {e}", path.display()))
        })?;
        levels.push(level);
    }
    levels.sort_by_key(|level| level.level);
    info!(levels = levels.len(), "Collected level files");
    Ok(LevelCollectionDto { levels })
}
