//! papergraph-export: relational paper graph → chunked JSON + manifest
//!
//! One pass over the papers builds deduplicated author/paper/venue maps and
//! the node/link lists ([`graph`]). Each collection is then sliced into
//! fixed-size chunk files ([`chunk`]) and indexed by a manifest ([`runner`]).

pub mod chunk;
pub mod graph;
pub mod runner;
pub mod source;
pub mod verify;

pub use chunk::{write_chunk, write_collection};
pub use graph::{ExportGraph, GraphBuilder, PaperContribution, UNKNOWN_VENUE, build_graph};
pub use runner::{ExportConfig, ExportSummary, run};
pub use source::{AuthorRecord, GraphSource, PaperRecord, VenueRecord};
pub use verify::{ChunkCheck, VerifyReport, verify_export};
