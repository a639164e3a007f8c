//! Export entry point: source → graph → chunks → manifest

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use papergraph_model::{
    CHUNK_DIR, Collection, DataManifest, MANIFEST_FILENAME, ManifestChunks, STATISTICS_FILENAME,
    Statistics,
};

use crate::chunk::{write_chunk, write_collection};
use crate::graph::build_graph;
use crate::source::GraphSource;

/// Where the export lands.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Static asset root; gets `data-manifest.json` and `data-chunks/`
    pub public_dir: PathBuf,
}

impl ExportConfig {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    pub fn chunk_dir(&self) -> PathBuf {
        self.public_dir.join(CHUNK_DIR)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.public_dir.join(MANIFEST_FILENAME)
    }
}

/// Export execution summary
#[derive(Debug)]
pub struct ExportSummary {
    pub statistics: Statistics,
    pub node_count: usize,
    pub link_count: usize,
    /// Chunk files written, statistics included
    pub chunk_count: usize,
    pub total_size: u64,
    pub elapsed: Duration,
}

/// Remove chunk files from a previous export.
fn remove_stale_chunks(chunk_dir: &Path) -> Result<usize> {
    // Directory names may contain glob metacharacters like `[v1]`
    let dir = glob::Pattern::escape(&chunk_dir.to_string_lossy());
    let pattern = format!("{dir}/*.json");
    let mut removed = 0;
    for entry in glob::glob(&pattern).context("Invalid chunk glob pattern")? {
        let path = entry.context("Failed to read chunk directory entry")?;
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove stale chunk {}", path.display()))?;
        removed += 1;
    }
    Ok(removed)
}

/// Run a full export. Any error aborts; output may then be incomplete.
pub fn run<S: GraphSource + ?Sized>(source: &S, config: &ExportConfig) -> Result<ExportSummary> {
    let start = Instant::now();

    log::info!("Reading papers...");
    let papers = source.papers().context("Failed to read papers")?;
    log::info!("Found {} papers", papers.len());

    let graph = build_graph(&papers);
    log::info!(
        "Graph: {} nodes, {} links ({} authors, {} papers, {} venues)",
        graph.nodes.len(),
        graph.links.len(),
        graph.statistics.author_count,
        graph.statistics.paper_count,
        graph.statistics.venue_count
    );

    let chunk_dir = config.chunk_dir();
    fs::create_dir_all(&chunk_dir)
        .with_context(|| format!("Failed to create {}", chunk_dir.display()))?;
    let removed = remove_stale_chunks(&chunk_dir)?;
    if removed > 0 {
        log::debug!("removed {removed} stale chunk files");
    }

    let chunks = ManifestChunks {
        statistics: write_chunk(&chunk_dir, STATISTICS_FILENAME, &graph.statistics, 1)?,
        network_nodes: write_collection(&chunk_dir, Collection::NetworkNodes, &graph.nodes)?,
        network_links: write_collection(&chunk_dir, Collection::NetworkLinks, &graph.links)?,
        authors: write_collection(&chunk_dir, Collection::Authors, &graph.authors)?,
        papers: write_collection(&chunk_dir, Collection::Papers, &graph.papers)?,
        venues: write_collection(&chunk_dir, Collection::Venues, &graph.venues)?,
    };

    let manifest = DataManifest::new(graph.statistics, chunks);
    let manifest_path = config.manifest_path();
    let json = manifest
        .to_pretty_json()
        .context("Failed to serialize manifest")?;
    fs::write(&manifest_path, json)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    let summary = ExportSummary {
        statistics: manifest.statistics,
        node_count: graph.nodes.len(),
        link_count: graph.links.len(),
        chunk_count: manifest.chunks.total_chunks(),
        total_size: manifest.total_size,
        elapsed: start.elapsed(),
    };

    log::info!(
        "Wrote {} chunks ({} bytes) to {}",
        summary.chunk_count,
        summary.total_size,
        chunk_dir.display()
    );
    log::info!("Manifest: {}", manifest_path.display());
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AuthorRecord, PaperRecord, VenueRecord};
    use papergraph_model::PaperData;
    use rustc_hash::FxHashSet;
    use tempfile::TempDir;

    fn sample_papers(n: usize) -> Vec<PaperRecord> {
        (0..n)
            .map(|i| PaperRecord {
                id: format!("p{i}"),
                arxiv_id: Some(format!("2501.{i:05}")),
                title: Some(format!("Paper {i}")),
                authors: vec![
                    AuthorRecord {
                        id: format!("a{}", i % 7),
                        name: format!("Author {}", i % 7),
                        affiliation: None,
                    },
                    AuthorRecord {
                        id: format!("a{}", 100 + i),
                        name: format!("Author {}", 100 + i),
                        affiliation: Some("Lab".into()),
                    },
                ],
                venue: (i % 2 == 0).then(|| VenueRecord {
                    id: format!("v{}", i % 3),
                    venue: Some(format!("Venue {}", i % 3)),
                    volume: None,
                    issue: None,
                    pages: None,
                }),
                references: if i > 0 { vec![format!("p{}", i - 1)] } else { vec![] },
                ..Default::default()
            })
            .collect()
    }

    fn read_manifest(config: &ExportConfig) -> DataManifest {
        let text = fs::read_to_string(config.manifest_path()).unwrap();
        DataManifest::from_json(&text).unwrap()
    }

    #[test]
    fn total_size_matches_files_on_disk() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path());
        let summary = run(&sample_papers(1200), &config).unwrap();

        let manifest = read_manifest(&config);
        assert_eq!(manifest.total_size, summary.total_size);
        assert!(manifest.is_consistent());

        let mut on_disk = 0;
        for chunk in manifest.chunks.iter() {
            let len = fs::metadata(config.chunk_dir().join(&chunk.filename))
                .unwrap()
                .len();
            assert_eq!(len, chunk.size, "{}", chunk.filename);
            on_disk += len;
        }
        assert_eq!(on_disk, manifest.total_size);
    }

    #[test]
    fn paper_count_matches_distinct_ids() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path());
        let mut papers = sample_papers(1200);
        papers.push(papers[3].clone());
        run(&papers, &config).unwrap();

        let manifest = read_manifest(&config);
        assert_eq!(manifest.chunks.papers.len(), 3);

        let mut ids = FxHashSet::default();
        for chunk in &manifest.chunks.papers {
            let text = fs::read_to_string(config.chunk_dir().join(&chunk.filename)).unwrap();
            let part: Vec<PaperData> = serde_json::from_str(&text).unwrap();
            assert_eq!(part.len(), chunk.count);
            ids.extend(part.into_iter().map(|p| p.id));
        }
        assert_eq!(manifest.statistics.paper_count, ids.len());
        assert_eq!(ids.len(), 1200);
    }

    #[test]
    fn repeated_export_is_stable() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path());
        let papers = sample_papers(50);

        run(&papers, &config).unwrap();
        let first = read_manifest(&config);
        run(&papers, &config).unwrap();
        let second = read_manifest(&config);

        assert_eq!(first.statistics, second.statistics);
        for c in Collection::ALL {
            assert_eq!(first.chunks.record_count(c), second.chunks.record_count(c));
        }
        assert_eq!(first, second);
    }

    #[test]
    fn smaller_export_removes_stale_chunks() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path());

        run(&sample_papers(1200), &config).unwrap();
        assert!(config.chunk_dir().join("papers-2.json").exists());

        run(&sample_papers(10), &config).unwrap();
        let manifest = read_manifest(&config);

        assert!(!config.chunk_dir().join("papers-2.json").exists());
        let files = fs::read_dir(config.chunk_dir()).unwrap().count();
        assert_eq!(files, manifest.chunks.total_chunks());
    }

    #[test]
    fn stale_chunks_removed_under_bracketed_dir() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path().join("site[v1]*?"));

        run(&sample_papers(1200), &config).unwrap();
        assert!(config.chunk_dir().join("papers-2.json").exists());

        run(&sample_papers(10), &config).unwrap();
        let manifest = read_manifest(&config);

        assert!(!config.chunk_dir().join("papers-2.json").exists());
        let files = fs::read_dir(config.chunk_dir()).unwrap().count();
        assert_eq!(files, manifest.chunks.total_chunks());
    }

    #[test]
    fn statistics_chunk_is_one_record() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path());
        run(&sample_papers(3), &config).unwrap();

        let manifest = read_manifest(&config);
        assert_eq!(manifest.chunks.statistics.filename, STATISTICS_FILENAME);
        assert_eq!(manifest.chunks.statistics.count, 1);

        let text = fs::read_to_string(config.chunk_dir().join(STATISTICS_FILENAME)).unwrap();
        let stats: Statistics = serde_json::from_str(&text).unwrap();
        assert_eq!(stats, manifest.statistics);
    }

    #[test]
    fn empty_source_still_writes_manifest() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path());
        let summary = run(&Vec::<PaperRecord>::new(), &config).unwrap();

        assert_eq!(summary.chunk_count, 1);
        let manifest = read_manifest(&config);
        assert!(manifest.chunks.network_nodes.is_empty());
        assert_eq!(manifest.total_size, manifest.chunks.statistics.size);
    }

    struct Broken;

    impl GraphSource for Broken {
        fn papers(&self) -> Result<Vec<PaperRecord>> {
            anyhow::bail!("database is locked")
        }
    }

    #[test]
    fn source_error_aborts() {
        let dir = TempDir::new().unwrap();
        let config = ExportConfig::new(dir.path());
        let err = run(&Broken, &config).unwrap_err();
        assert!(format!("{err:#}").contains("database is locked"));
        assert!(!config.manifest_path().exists());
    }
}
