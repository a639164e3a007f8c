//! Loader error type

use papergraph_core::HttpError;
use papergraph_model::Collection;

/// Why a `load()` call failed. Any failure aborts the whole load.
#[derive(Debug)]
pub enum LoadError {
    ManifestFetchFailed(HttpError),
    StatisticsFetchFailed(HttpError),
    ChunkFetchFailed {
        collection: Collection,
        index: usize,
        source: HttpError,
    },
    /// Resource arrived but is not the JSON we expected
    Decode {
        resource: String,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ManifestFetchFailed(e) => write!(f, "failed to load data manifest: {e}"),
            Self::StatisticsFetchFailed(e) => write!(f, "failed to load statistics: {e}"),
            Self::ChunkFetchFailed {
                collection,
                index,
                source,
            } => write!(
                f,
                "failed to load {} chunk {index}: {source}",
                collection.role()
            ),
            Self::Decode { resource, source } => {
                write!(f, "failed to decode {resource}: {source}")
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ManifestFetchFailed(e) | Self::StatisticsFetchFailed(e) => Some(e),
            Self::ChunkFetchFailed { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
        }
    }
}

impl LoadError {
    /// HTTP status behind the failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ManifestFetchFailed(e) | Self::StatisticsFetchFailed(e) => e.status(),
            Self::ChunkFetchFailed { source, .. } => source.status(),
            Self::Decode { .. } => None,
        }
    }
}
