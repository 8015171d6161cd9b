use std::fmt;
use std::io;
use std::path::PathBuf;

use bytes::Bytes;
use futures::StreamExt;
use reqwest::Url;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;
use tokio_util::io::StreamReader;
use tracing::{debug, instrument};

use crate::core::codec::ContainerCodec;
use crate::core::container::Container;
use crate::error::{constants, LevelError, Result};

/// Where the level container lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSource {
    /// A file on the local filesystem
    File(PathBuf),
    /// An `http://` or `https://` resource
    Remote(Url),
    /// Container bytes already in memory, e.g. embedded with `include_bytes!`
    Memory(Bytes),
}

impl LevelSource {
    /// Resolve a location string.
    ///
    /// `http://` and `https://` select a remote fetch, `file://` and bare paths
    /// the local filesystem. Other schemes are rejected.
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(LevelError::ConfigError(
                "Source location cannot be empty".to_string(),
            ));
        }

        if let Some(path) = location.strip_prefix("file://") {
            return Ok(LevelSource::File(PathBuf::from(path)));
        }

        if location.starts_with("http://") || location.starts_with("https://") {
            return Url::parse(location)
                .map(LevelSource::Remote)
                .map_err(|e| LevelError::ConfigError(format!("Invalid source URL: {e}")));
        }

        if let Some((scheme, _)) = location.split_once("://") {
            return Err(LevelError::ConfigError(format!(
                "Unsupported source scheme: '{scheme}'"
            )));
        }

        Ok(LevelSource::File(PathBuf::from(location)))
    }

    /// Read exactly one container, refusing anything larger than `max_size` bytes.
    ///
    /// File and remote sources are framed incrementally, so an oversized length
    /// prefix is rejected before the rest of the body is read.
    #[instrument(skip(self), fields(source = %self), level = "debug")]
    pub async fn fetch(&self, max_size: usize) -> Result<Container> {
        match self {
            LevelSource::File(path) => {
                let file = tokio::fs::File::open(path).await?;
                let container = read_single(file, max_size).await?;
                debug!(len = container.encoded_len(), "Read container from file");
                Ok(container)
            }
            LevelSource::Remote(url) => {
                let response = reqwest::get(url.clone())
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| LevelError::FetchError(e.to_string()))?;

                if let Some(len) = response.content_length() {
                    if len > max_size as u64 {
                        return Err(LevelError::OversizedContainer(
                            usize::try_from(len).unwrap_or(usize::MAX),
                        ));
                    }
                }

                let body = response
                    .bytes_stream()
                    .map(|chunk| chunk.map_err(|e| io::Error::new(io::ErrorKind::Other, e)));
                let container = read_single(StreamReader::new(Box::pin(body)), max_size).await?;
                debug!(len = container.encoded_len(), "Downloaded container");
                Ok(container)
            }
            LevelSource::Memory(bytes) => {
                if bytes.len() > max_size {
                    return Err(LevelError::OversizedContainer(bytes.len()));
                }
                Container::from_bytes(bytes)
            }
        }
    }
}

/// Frame one container from `reader`; anything after it is an error
async fn read_single<R>(reader: R, max_size: usize) -> Result<Container>
where
    R: AsyncRead + Unpin,
{
    let mut frames = FramedRead::new(reader, ContainerCodec::new(max_size));
    let container = frames
        .next()
        .await
        .ok_or_else(|| LevelError::FetchError(constants::ERR_EMPTY_SOURCE.into()))??;
    if frames.next().await.is_some() {
        return Err(LevelError::FetchError(constants::ERR_TRAILING_DATA.into()));
    }
    Ok(container)
}

impl fmt::Display for LevelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelSource::File(path) => write!(f, "{}", path.display()),
            LevelSource::Remote(url) => write!(f, "{url}"),
            LevelSource::Memory(bytes) => write!(f, "<memory: {} bytes>", bytes.len()),
        }
    }
}
