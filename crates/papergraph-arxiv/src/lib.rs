//! papergraph-arxiv: paper metadata from the arXiv Atom API

pub mod client;
pub mod parser;

pub use client::{ArxivClient, DEFAULT_BASE_URL, normalize_arxiv_id};
pub use parser::{ArxivPaper, parse_feed};
