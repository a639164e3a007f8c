//! Data manifest: the contract between exporter and loader.
//!
//! Layout under the asset root:
//! ```text
//! {root}/
//! ├── data-manifest.json
//! └── data-chunks/
//!     ├── statistics.json
//!     ├── network-nodes-0.json
//!     ├── network-links-0.json
//!     ├── authors-0.json
//!     ├── papers-0.json
//!     └── venues-0.json
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::Statistics;

/// Manifest schema version written by the exporter.
pub const MANIFEST_VERSION: &str = "1.0.0";

/// Manifest filename at the asset root.
pub const MANIFEST_FILENAME: &str = "data-manifest.json";

/// Directory (under the asset root) holding chunk files.
pub const CHUNK_DIR: &str = "data-chunks";

/// Filename of the singleton statistics chunk.
pub const STATISTICS_FILENAME: &str = "statistics.json";

/// Chunked collection in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    NetworkNodes,
    NetworkLinks,
    Authors,
    Papers,
    Venues,
}

impl Collection {
    /// All chunked collections, in manifest order
    pub const ALL: [Collection; 5] = [
        Self::NetworkNodes,
        Self::NetworkLinks,
        Self::Authors,
        Self::Papers,
        Self::Venues,
    ];

    /// Filename prefix: `{prefix}-{index}.json`
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::NetworkNodes => "network-nodes",
            Self::NetworkLinks => "network-links",
            Self::Authors => "authors",
            Self::Papers => "papers",
            Self::Venues => "venues",
        }
    }

    /// Records per chunk file
    pub fn chunk_size(self) -> usize {
        match self {
            Self::NetworkNodes => 5000,
            Self::NetworkLinks => 10000,
            Self::Authors => 2000,
            Self::Papers => 500,
            Self::Venues => 500,
        }
    }

    /// Human-readable role of one chunk, used in error messages
    pub fn role(self) -> &'static str {
        match self {
            Self::NetworkNodes => "network node",
            Self::NetworkLinks => "network link",
            Self::Authors => "author",
            Self::Papers => "paper",
            Self::Venues => "venue",
        }
    }

    pub fn chunk_filename(self, index: usize) -> String {
        format!("{}-{index}.json", self.file_prefix())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

/// One chunk file as described by the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataChunk {
    pub filename: String,
    /// Exact byte length of the serialized file
    pub size: u64,
    /// Records in the file (1 for the statistics chunk)
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestChunks {
    pub statistics: DataChunk,
    pub network_nodes: Vec<DataChunk>,
    pub network_links: Vec<DataChunk>,
    pub authors: Vec<DataChunk>,
    pub papers: Vec<DataChunk>,
    pub venues: Vec<DataChunk>,
}

impl ManifestChunks {
    pub fn collection(&self, collection: Collection) -> &[DataChunk] {
        match collection {
            Collection::NetworkNodes => &self.network_nodes,
            Collection::NetworkLinks => &self.network_links,
            Collection::Authors => &self.authors,
            Collection::Papers => &self.papers,
            Collection::Venues => &self.venues,
        }
    }

    /// Statistics chunk plus every collection chunk
    pub fn total_chunks(&self) -> usize {
        1 + Collection::ALL
            .iter()
            .map(|&c| self.collection(c).len())
            .sum::<usize>()
    }

    /// Sum of every chunk's `size`, statistics included
    pub fn sum_sizes(&self) -> u64 {
        self.statistics.size
            + Collection::ALL
                .iter()
                .flat_map(|&c| self.collection(c))
                .map(|chunk| chunk.size)
                .sum::<u64>()
    }

    /// Sum of record counts for one collection
    pub fn record_count(&self, collection: Collection) -> usize {
        self.collection(collection).iter().map(|c| c.count).sum()
    }

    /// Every chunk, statistics first, then collections in manifest order
    pub fn iter(&self) -> impl Iterator<Item = &DataChunk> {
        std::iter::once(&self.statistics)
            .chain(Collection::ALL.iter().flat_map(|&c| self.collection(c)))
    }
}

/// Index of every chunk plus aggregate statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataManifest {
    pub version: String,
    pub statistics: Statistics,
    pub chunks: ManifestChunks,
    /// Denominator for loader progress
    pub total_size: u64,
}

impl DataManifest {
    /// Build a manifest, deriving `total_size` from the chunks.
    pub fn new(statistics: Statistics, chunks: ManifestChunks) -> Self {
        let total_size = chunks.sum_sizes();
        Self {
            version: MANIFEST_VERSION.to_string(),
            statistics,
            chunks,
            total_size,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// `total_size` agrees with the chunk sizes
    pub fn is_consistent(&self) -> bool {
        self.total_size == self.chunks.sum_sizes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(filename: &str, size: u64, count: usize) -> DataChunk {
        DataChunk {
            filename: filename.into(),
            size,
            count,
        }
    }

    fn sample() -> DataManifest {
        DataManifest::new(
            Statistics {
                author_count: 2,
                paper_count: 1,
                venue_count: 0,
            },
            ManifestChunks {
                statistics: chunk(STATISTICS_FILENAME, 100, 1),
                network_nodes: vec![chunk("network-nodes-0.json", 900, 3)],
                network_links: vec![
                    chunk("network-links-0.json", 40, 2),
                    chunk("network-links-1.json", 20, 1),
                ],
                authors: vec![],
                papers: vec![],
                venues: vec![],
            },
        )
    }

    #[test]
    fn total_size_sums_all_chunks() {
        let m = sample();
        assert_eq!(m.total_size, 1060);
        assert!(m.is_consistent());
    }

    #[test]
    fn total_chunks_counts_statistics() {
        assert_eq!(sample().chunks.total_chunks(), 4);
    }

    #[test]
    fn record_count_per_collection() {
        let m = sample();
        assert_eq!(m.chunks.record_count(Collection::NetworkLinks), 3);
        assert_eq!(m.chunks.record_count(Collection::Papers), 0);
    }

    #[test]
    fn iter_starts_with_statistics() {
        let m = sample();
        let names: Vec<_> = m.chunks.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(
            names,
            [
                "statistics.json",
                "network-nodes-0.json",
                "network-links-0.json",
                "network-links-1.json"
            ]
        );
    }

    #[test]
    fn wire_keys_are_camel_case() {
        let json = sample().to_pretty_json().unwrap();
        assert!(json.contains("\"networkNodes\""));
        assert!(json.contains("\"networkLinks\""));
        assert!(json.contains("\"totalSize\": 1060"));
        assert!(json.contains("\"version\": \"1.0.0\""));
    }

    #[test]
    fn parse_roundtrip_keeps_sizes() {
        let m = sample();
        let parsed = DataManifest::from_json(&m.to_pretty_json().unwrap()).unwrap();
        assert_eq!(parsed, m);
    }

    #[test]
    fn tampered_total_is_inconsistent() {
        let mut m = sample();
        m.total_size += 1;
        assert!(!m.is_consistent());
    }

    #[test]
    fn chunk_filenames() {
        assert_eq!(Collection::Papers.chunk_filename(3), "papers-3.json");
        assert_eq!(
            Collection::NetworkNodes.chunk_filename(0),
            "network-nodes-0.json"
        );
    }

    #[test]
    fn chunk_size_policy() {
        assert_eq!(Collection::NetworkNodes.chunk_size(), 5000);
        assert_eq!(Collection::NetworkLinks.chunk_size(), 10000);
        assert_eq!(Collection::Authors.chunk_size(), 2000);
        assert_eq!(Collection::Papers.chunk_size(), 500);
        assert_eq!(Collection::Venues.chunk_size(), 500);
    }
}
