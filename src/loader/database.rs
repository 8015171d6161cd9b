use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{SourceConfig, MAX_CONTAINER_SIZE};
use crate::error::Result;
use crate::loader::source::LevelSource;
use crate::schema::{Level, LevelCollectionDto};
use crate::utils::crypto::LevelCrypto;
use crate::utils::metrics::{LoaderMetrics, Timer};
use crate::utils::timeout::{with_timeout_error, DEFAULT_FETCH_TIMEOUT};

type LevelIndex = HashMap<u32, Arc<Level>>;
type PendingIndex = Shared<BoxFuture<'static, Arc<LevelIndex>>>;

/// Lazily loaded, process-lifetime cache of levels keyed by level number.
///
/// The first lookup spawns a single bulk load of the whole container onto the
/// Tokio runtime. Every lookup, including ones that arrive while it is in
/// flight, awaits that same task; a caller that gives up early does not cancel
/// it. If the load fails the cache stays empty for good and every lookup
/// reports "not found".
pub struct LevelDatabase {
    source: LevelSource,
    crypto: LevelCrypto,
    fetch_timeout: Duration,
    max_container_size: usize,
    max_grid_dimension: Option<usize>,
    cache: OnceLock<PendingIndex>,
    metrics: Arc<LoaderMetrics>,
}

impl LevelDatabase {
    pub fn new(source: LevelSource) -> Self {
        Self {
            source,
            crypto: LevelCrypto::new(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_container_size: MAX_CONTAINER_SIZE,
            max_grid_dimension: None,
            cache: OnceLock::new(),
            metrics: Arc::new(LoaderMetrics::new()),
        }
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let source = LevelSource::parse(&config.location)?;
        Ok(Self::new(source)
            .with_fetch_timeout(config.fetch_timeout)
            .with_max_container_size(config.max_container_size)
            .with_max_grid_dimension(config.max_grid_dimension))
    }

    pub fn with_crypto(mut self, crypto: LevelCrypto) -> Self {
        self.crypto = crypto;
        self
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn with_max_container_size(mut self, max_container_size: usize) -> Self {
        self.max_container_size = max_container_size;
        self
    }

    /// Skip level records declaring more rows or columns than `max`; `None` builds every record
    pub fn with_max_grid_dimension(mut self, max: Option<usize>) -> Self {
        self.max_grid_dimension = max;
        self
    }

    pub fn source(&self) -> &LevelSource {
        &self.source
    }

    pub fn metrics(&self) -> &LoaderMetrics {
        &self.metrics
    }

    /// Look up a level, loading the container first if nothing has been loaded yet
    pub async fn get(&self, level: u32) -> Option<Arc<Level>> {
        let found = self.index().await.get(&level).cloned();
        self.metrics.lookup(found.is_some());
        if found.is_none() {
            debug!(level, "Level not found");
        }
        found
    }

    /// Continuation-style lookup: runs on the Tokio runtime and hands the
    /// result, `None` for "not found", to `on_loaded`.
    ///
    /// The returned handle only reports when `on_loaded` has run. Callers that
    /// just want the continuation may drop it; the lookup still completes.
    pub fn load<F>(self: &Arc<Self>, level: u32, on_loaded: F) -> JoinHandle<()>
    where
        F: FnOnce(Option<Arc<Level>>) + Send + 'static,
    {
        let database = Arc::clone(self);
        tokio::spawn(async move {
            let result = database.get(level).await;
            on_loaded(result);
        })
    }

    /// Run the bulk load now if it has not happened yet; returns the number of cached levels
    pub async fn preload(&self) -> usize {
        self.index().await.len()
    }

    /// Whether the bulk load has completed, successfully or not
    pub fn is_loaded(&self) -> bool {
        self.loaded().is_some()
    }

    pub fn len(&self) -> usize {
        self.loaded().map_or(0, |index| index.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached level numbers in ascending order
    pub fn level_numbers(&self) -> Vec<u32> {
        let mut numbers: Vec<u32> = self
            .loaded()
            .map(|index| index.keys().copied().collect())
            .unwrap_or_default();
        numbers.sort_unstable();
        numbers
    }

    fn loaded(&self) -> Option<&Arc<LevelIndex>> {
        self.cache.get().and_then(|pending| pending.peek())
    }

    async fn index(&self) -> Arc<LevelIndex> {
        self.cache.get_or_init(|| self.spawn_bulk_load()).clone().await
    }

    fn spawn_bulk_load(&self) -> PendingIndex {
        let job = BulkLoad {
            source: self.source.clone(),
            crypto: self.crypto.clone(),
            fetch_timeout: self.fetch_timeout,
            max_container_size: self.max_container_size,
            max_grid_dimension: self.max_grid_dimension,
            metrics: Arc::clone(&self.metrics),
        };
        let metrics = Arc::clone(&self.metrics);
        let task = tokio::spawn(job.run());

        async move {
            match task.await {
                Ok(index) => Arc::new(index),
                Err(e) => {
                    metrics.bulk_load_failed();
                    error!(error = %e, "Level load task did not complete");
                    Arc::new(LevelIndex::new())
                }
            }
        }
        .boxed()
        .shared()
    }
}

/// Everything one bulk load needs, owned so it can run detached from any lookup
struct BulkLoad {
    source: LevelSource,
    crypto: LevelCrypto,
    fetch_timeout: Duration,
    max_container_size: usize,
    max_grid_dimension: Option<usize>,
    metrics: Arc<LoaderMetrics>,
}

impl BulkLoad {
    #[instrument(skip(self), fields(source = %self.source))]
    async fn run(self) -> LevelIndex {
        self.metrics.bulk_load_started();
        let _timer = Timer::start("bulk_load");

        match self.fetch_and_build().await {
            Ok(index) => {
                self.metrics.levels_cached(index.len() as u64);
                info!(levels = index.len(), "Level data loaded");
                index
            }
            Err(e) => {
                if e.is_integrity_error() {
                    self.metrics.integrity_failure();
                }
                self.metrics.bulk_load_failed();
                warn!(error = %e, "Level data unavailable");
                LevelIndex::new()
            }
        }
    }

    async fn fetch_and_build(&self) -> Result<LevelIndex> {
        let container = with_timeout_error(
            self.source.fetch(self.max_container_size),
            self.fetch_timeout,
        )
        .await?;
        self.metrics.bytes_read(container.encoded_len() as u64);

        let plaintext = self.crypto.open(&container)?;
        let collection = LevelCollectionDto::from_json_slice(&plaintext)?;
        Ok(self.build_index(&collection))
    }

    fn build_index(&self, collection: &LevelCollectionDto) -> LevelIndex {
        let mut index = LevelIndex::with_capacity(collection.levels.len());
        for record in &collection.levels {
            match Level::from_dto_bounded(record, self.max_grid_dimension) {
                Ok(level) => {
                    let number = level.level;
                    if index.insert(number, Arc::new(level)).is_some() {
                        debug!(level = number, "Duplicate level number, later record wins");
                    }
                }
                Err(e) => {
                    self.metrics.level_rejected();
                    warn!(error = %e, "Skipping level record");
                }
            }
        }
        index
    }
}

impl std::fmt::Debug for LevelDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelDatabase")
            .field("source", &self.source)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("loaded", &self.is_loaded())
            .field("levels", &self.len())
            .finish_non_exhaustive()
    }
}
