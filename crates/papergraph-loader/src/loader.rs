//! Chunked loader: manifest → statistics → five collections → merged graph.
//!
//! Collections are loaded concurrently; chunks within one collection are
//! fetched strictly in manifest order. Every finished chunk adds its manifest
//! `size` to the running byte count and produces one progress report naming
//! that chunk.

use std::fmt;
use std::sync::Mutex;

use futures_util::future::try_join5;
use papergraph_model::{
    AuthorData, CHUNK_DIR, Collection, DataChunk, DataManifest, ExportedData, Link,
    MANIFEST_FILENAME, NetworkData, Node, PaperData, Statistics, VenueData,
};
use serde::de::DeserializeOwned;

use crate::error::LoadError;
use crate::source::ChunkSource;

/// Label of the report after the statistics chunk
pub const STATISTICS_LABEL: &str = "statistics";
/// Label of the final report
pub const DONE_LABEL: &str = "done";

/// One progress report.
#[derive(Debug, Clone, Copy)]
pub struct LoadProgress<'a> {
    /// Bytes loaded over manifest `totalSize`, in [0, 100]
    pub percent: f64,
    /// Chunk that just completed, or a phase label
    pub label: &'a str,
    pub statistics: Statistics,
}

/// Receives progress and failure notifications during `load()`.
pub trait LoadObserver: Sync {
    fn on_progress(&self, _progress: &LoadProgress<'_>) {}

    /// Called once, right before `load()` returns the error
    fn on_error(&self, _error: &LoadError) {}
}

/// Observer that ignores everything
pub struct NoProgress;

impl LoadObserver for NoProgress {}

/// Where a load call currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    ManifestLoading,
    StatisticsLoading,
    ChunksLoading,
    Merged,
    Done,
    Failed,
}

impl fmt::Display for LoadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::ManifestLoading => "manifest-loading",
            Self::StatisticsLoading => "statistics-loading",
            Self::ChunksLoading => "chunks-loading",
            Self::Merged => "merged",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Successful load
#[derive(Debug)]
pub struct LoadResult {
    pub data: ExportedData,
    /// Manifest `totalSize`
    pub total_size: u64,
    /// Filenames in completion order, statistics first
    pub loaded_chunks: Vec<String>,
}

/// Progress percentage, clamped. An empty export counts as complete.
pub fn progress_percent(loaded: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (loaded as f64 * 100.0 / total as f64).clamp(0.0, 100.0)
}

fn chunk_resource(filename: &str) -> String {
    format!("{CHUNK_DIR}/{filename}")
}

fn decode<T: DeserializeOwned>(resource: &str, bytes: &[u8]) -> Result<T, LoadError> {
    serde_json::from_slice(bytes).map_err(|source| LoadError::Decode {
        resource: resource.to_string(),
        source,
    })
}

#[derive(Default)]
struct Counters {
    loaded_size: u64,
    loaded_chunks: Vec<String>,
}

/// State of one `load()` call.
struct LoadContext<'a, O: ?Sized> {
    observer: &'a O,
    manifest: DataManifest,
    statistics: Statistics,
    counters: Mutex<Counters>,
}

impl<O: LoadObserver + ?Sized> LoadContext<'_, O> {
    /// Account for a finished chunk and report it.
    ///
    /// Counting and reporting share one lock so reports stay non-decreasing.
    fn chunk_loaded(&self, chunk: &DataChunk, label: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
        counters.loaded_size += chunk.size;
        counters.loaded_chunks.push(chunk.filename.clone());
        let percent = progress_percent(counters.loaded_size, self.manifest.total_size);
        self.observer.on_progress(&LoadProgress {
            percent,
            label,
            statistics: self.statistics,
        });
    }

    fn into_loaded_chunks(self) -> Vec<String> {
        self.counters
            .into_inner()
            .unwrap_or_else(|e| e.into_inner())
            .loaded_chunks
    }
}

/// Loads an export from a [`ChunkSource`].
pub struct DataLoader<S> {
    source: S,
}

impl<S: ChunkSource> DataLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and merge the whole export.
    ///
    /// On failure the observer's `on_error` runs once and partial data is
    /// dropped.
    pub async fn load<O: LoadObserver + ?Sized>(
        &self,
        observer: &O,
    ) -> Result<LoadResult, LoadError> {
        let mut phase = LoadPhase::Idle;
        let result = self.run(observer, &mut phase).await;
        if let Err(e) = &result {
            log::debug!("load failed during {phase}: {e}");
            enter(&mut phase, LoadPhase::Failed);
            observer.on_error(e);
        }
        result
    }

    async fn run<O: LoadObserver + ?Sized>(
        &self,
        observer: &O,
        phase: &mut LoadPhase,
    ) -> Result<LoadResult, LoadError> {
        enter(phase, LoadPhase::ManifestLoading);
        let bytes = self
            .source
            .fetch(MANIFEST_FILENAME)
            .await
            .map_err(LoadError::ManifestFetchFailed)?;
        let manifest: DataManifest = decode(MANIFEST_FILENAME, &bytes)?;
        log::info!(
            "Manifest v{} from {}: {} chunks, {} bytes",
            manifest.version,
            self.source.location(),
            manifest.chunks.total_chunks(),
            manifest.total_size
        );

        enter(phase, LoadPhase::StatisticsLoading);
        let stats_chunk = manifest.chunks.statistics.clone();
        let bytes = self
            .source
            .fetch(&chunk_resource(&stats_chunk.filename))
            .await
            .map_err(LoadError::StatisticsFetchFailed)?;
        let statistics: Statistics = decode(&stats_chunk.filename, &bytes)?;

        let ctx = LoadContext {
            observer,
            manifest,
            statistics,
            counters: Mutex::new(Counters::default()),
        };
        ctx.chunk_loaded(&stats_chunk, STATISTICS_LABEL);

        enter(phase, LoadPhase::ChunksLoading);
        let (nodes, links, authors, papers, venues) = try_join5(
            self.load_collection::<Node, O>(&ctx, Collection::NetworkNodes),
            self.load_collection::<Link, O>(&ctx, Collection::NetworkLinks),
            self.load_collection::<AuthorData, O>(&ctx, Collection::Authors),
            self.load_collection::<PaperData, O>(&ctx, Collection::Papers),
            self.load_collection::<VenueData, O>(&ctx, Collection::Venues),
        )
        .await?;

        enter(phase, LoadPhase::Merged);
        let data = ExportedData {
            statistics,
            network: NetworkData { nodes, links },
            authors,
            papers,
            venues,
        };
        observer.on_progress(&LoadProgress {
            percent: 100.0,
            label: DONE_LABEL,
            statistics,
        });

        enter(phase, LoadPhase::Done);
        let total_size = ctx.manifest.total_size;
        Ok(LoadResult {
            data,
            total_size,
            loaded_chunks: ctx.into_loaded_chunks(),
        })
    }

    /// Fetch one collection's chunks in order and concatenate them.
    async fn load_collection<T: DeserializeOwned, O: LoadObserver + ?Sized>(
        &self,
        ctx: &LoadContext<'_, O>,
        collection: Collection,
    ) -> Result<Vec<T>, LoadError> {
        let chunks = ctx.manifest.chunks.collection(collection);
        let mut records = Vec::with_capacity(ctx.manifest.chunks.record_count(collection));
        for (index, chunk) in chunks.iter().enumerate() {
            let bytes = self
                .source
                .fetch(&chunk_resource(&chunk.filename))
                .await
                .map_err(|source| LoadError::ChunkFetchFailed {
                    collection,
                    index,
                    source,
                })?;
            let part: Vec<T> = decode(&chunk.filename, &bytes)?;
            if part.len() != chunk.count {
                log::warn!(
                    "{}: manifest says {} records, got {}",
                    chunk.filename,
                    chunk.count,
                    part.len()
                );
            }
            records.extend(part);
            ctx.chunk_loaded(chunk, &chunk.filename);
        }
        log::debug!("{collection}: {} records", records.len());
        Ok(records)
    }
}

fn enter(phase: &mut LoadPhase, next: LoadPhase) {
    log::debug!("load phase: {phase} -> {next}");
    *phase = next;
}
