use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{LevelError, Result};

/// Default upper bound for fetching the level container
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Whole milliseconds in `duration`, saturating at `u64::MAX`
pub fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Run a fallible future, failing with `LevelError::Timeout` once `duration` elapses
pub async fn with_timeout_error<F, T>(future: F, duration: Duration) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_ms = saturating_millis(duration), "Operation timed out");
            Err(LevelError::Timeout)
        }
    }
}
