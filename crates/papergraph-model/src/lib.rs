//! papergraph-model: wire types for the exported paper graph
//!
//! The exporter writes these types as JSON chunk files plus a manifest;
//! the loader reads them back. Both sides depend on this crate so the
//! on-disk format has a single definition.

pub mod data;
pub mod manifest;

pub use data::{
    AuthorData, ExportedData, Link, LinkType, NetworkData, Node, NodeType, PaperData,
    Statistics, VenueData,
};
pub use manifest::{
    CHUNK_DIR, Collection, DataChunk, DataManifest, MANIFEST_FILENAME, MANIFEST_VERSION,
    ManifestChunks, STATISTICS_FILENAME,
};
