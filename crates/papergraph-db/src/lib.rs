//! papergraph-db: DuckDB store for ingested papers
//!
//! Holds papers with per-step processing status, their authors, Semantic
//! Scholar metadata, venues and citation edges, plus a log of every outbound
//! request. The store is the exporter's [`GraphSource`](papergraph_export::GraphSource).

mod graph;
pub mod ids;
mod requests;
pub mod schema;
pub mod store;

pub use store::{Database, PaperRow, SavedPaper, Status, Step, StoreStats};
