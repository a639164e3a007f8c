//! Check an export on disk against its manifest.

use std::fs;

use anyhow::{Context, Result};
use papergraph_model::{Collection, DataChunk, DataManifest};

use crate::runner::ExportConfig;

/// Verification result for a single chunk file.
#[derive(Debug)]
pub struct ChunkCheck {
    pub filename: String,
    pub expected_size: u64,
    /// `None` when the file is missing
    pub actual_size: Option<u64>,
    pub expected_count: usize,
    /// `None` when the file is missing or does not parse
    pub actual_count: Option<usize>,
    pub ok: bool,
}

/// Whole-export verification report.
#[derive(Debug)]
pub struct VerifyReport {
    pub manifest: DataManifest,
    pub chunks: Vec<ChunkCheck>,
    pub total_size_ok: bool,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.total_size_ok && self.chunks.iter().all(|c| c.ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ChunkCheck> {
        self.chunks.iter().filter(|c| !c.ok)
    }
}

fn record_count(bytes: &[u8], is_statistics: bool) -> Option<usize> {
    if is_statistics {
        serde_json::from_slice::<serde_json::Value>(bytes)
            .ok()
            .filter(|v| v.is_object())
            .map(|_| 1)
    } else {
        serde_json::from_slice::<Vec<serde_json::Value>>(bytes)
            .ok()
            .map(|v| v.len())
    }
}

fn check_chunk(config: &ExportConfig, chunk: &DataChunk, is_statistics: bool) -> ChunkCheck {
    let path = config.chunk_dir().join(&chunk.filename);
    let (actual_size, actual_count) = match fs::read(&path) {
        Ok(bytes) => (
            Some(bytes.len() as u64),
            record_count(&bytes, is_statistics),
        ),
        Err(e) => {
            log::debug!("{}: {e}", path.display());
            (None, None)
        }
    };

    ChunkCheck {
        filename: chunk.filename.clone(),
        expected_size: chunk.size,
        actual_size,
        expected_count: chunk.count,
        actual_count,
        ok: actual_size == Some(chunk.size) && actual_count == Some(chunk.count),
    }
}

/// Read the manifest and check every chunk it lists.
pub fn verify_export(config: &ExportConfig) -> Result<VerifyReport> {
    let manifest_path = config.manifest_path();
    let text = fs::read_to_string(&manifest_path)
        .with_context(|| format!("no manifest at {}", manifest_path.display()))?;
    let manifest = DataManifest::from_json(&text)
        .with_context(|| format!("invalid manifest {}", manifest_path.display()))?;

    let mut chunks = vec![check_chunk(config, &manifest.chunks.statistics, true)];
    for collection in Collection::ALL {
        for chunk in manifest.chunks.collection(collection) {
            chunks.push(check_chunk(config, chunk, false));
        }
    }

    let total_size_ok = manifest.is_consistent();
    Ok(VerifyReport {
        manifest,
        chunks,
        total_size_ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::run;
    use crate::source::PaperRecord;
    use tempfile::TempDir;

    fn exported() -> (TempDir, ExportConfig) {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path());
        let papers: Vec<PaperRecord> = (0..5)
            .map(|i| PaperRecord {
                id: format!("p{i}"),
                title: Some(format!("Paper {i}")),
                ..Default::default()
            })
            .collect();
        run(&papers, &config).unwrap();
        (dir, config)
    }

    #[test]
    fn fresh_export_verifies() {
        let (_dir, config) = exported();
        let report = verify_export(&config).unwrap();
        assert!(report.is_ok());
        assert_eq!(report.chunks.len(), report.manifest.chunks.total_chunks());
    }

    #[test]
    fn missing_chunk_fails() {
        let (_dir, config) = exported();
        fs::remove_file(config.chunk_dir().join("papers-0.json")).unwrap();

        let report = verify_export(&config).unwrap();
        assert!(!report.is_ok());
        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].filename, "papers-0.json");
        assert_eq!(failed[0].actual_size, None);
    }

    #[test]
    fn modified_chunk_fails() {
        let (_dir, config) = exported();
        fs::write(config.chunk_dir().join("network-nodes-0.json"), "[]").unwrap();

        let report = verify_export(&config).unwrap();
        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].actual_count, Some(0));
    }

    #[test]
    fn tampered_total_size_fails() {
        let (_dir, config) = exported();
        let mut manifest =
            DataManifest::from_json(&fs::read_to_string(config.manifest_path()).unwrap())
                .unwrap();
        manifest.total_size += 10;
        fs::write(config.manifest_path(), manifest.to_pretty_json().unwrap()).unwrap();

        let report = verify_export(&config).unwrap();
        assert!(!report.total_size_ok);
        assert!(!report.is_ok());
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn no_manifest_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(verify_export(&ExportConfig::new(dir.path())).is_err());
    }
}
