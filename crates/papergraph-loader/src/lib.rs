//! papergraph-loader: fetch an export (manifest + chunks) and merge it back
//! into one [`ExportedData`](papergraph_model::ExportedData).
//!
//! ```no_run
//! use papergraph_loader::{DataLoader, HttpSource, NoProgress};
//!
//! # async fn demo() -> Result<(), papergraph_loader::LoadError> {
//! let loader = DataLoader::new(HttpSource::new("https://example.org/graph"));
//! let result = loader.load(&NoProgress).await?;
//! println!("{} papers", result.data.papers.len());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;
pub mod source;

pub use error::LoadError;
pub use loader::{
    DONE_LABEL, DataLoader, LoadObserver, LoadPhase, LoadProgress, LoadResult, NoProgress,
    STATISTICS_LABEL, progress_percent,
};
pub use source::{ChunkSource, DirSource, HttpSource};
