//! Chunk writer: one pretty-printed JSON file per slice of a collection

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use papergraph_model::{Collection, DataChunk};
use serde::Serialize;

/// Serialize `value` into `dir/filename` and describe the written file.
///
/// `size` is the exact byte length written.
pub fn write_chunk<T: Serialize + ?Sized>(
    dir: &Path,
    filename: &str,
    value: &T,
    count: usize,
) -> Result<DataChunk> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {filename}"))?;
    let path = dir.join(filename);
    fs::write(&path, json.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::debug!("wrote {filename} ({count} records, {} bytes)", json.len());
    Ok(DataChunk {
        filename: filename.to_string(),
        size: json.len() as u64,
        count,
    })
}

/// Split `records` into contiguous chunks of the collection's chunk size.
///
/// An empty collection writes no files.
pub fn write_collection<T: Serialize>(
    dir: &Path,
    collection: Collection,
    records: &[T],
) -> Result<Vec<DataChunk>> {
    records
        .chunks(collection.chunk_size())
        .enumerate()
        .map(|(i, slice)| write_chunk(dir, &collection.chunk_filename(i), slice, slice.len()))
        .collect()
}
