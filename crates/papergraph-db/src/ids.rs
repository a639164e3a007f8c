//! Deterministic entity ids.
//!
//! Ids are the first 16 hex chars of a blake3 hash over a kind tag and the
//! natural key, so re-ingesting the same paper or author yields the same id.

fn derive(kind: &str, key: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(kind.as_bytes());
    hasher.update(&[0]);
    hasher.update(key.as_bytes());
    hasher.finalize().to_hex()[..16].to_string()
}

pub fn paper_id(arxiv_id: &str) -> String {
    derive("paper", arxiv_id)
}

/// Authors are identified by name only
pub fn author_id(name: &str) -> String {
    derive("author", name.trim())
}

/// At most one venue per paper
pub fn venue_id(paper_id: &str) -> String {
    derive("venue", paper_id)
}
