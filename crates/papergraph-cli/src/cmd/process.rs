//! `papergraph process` - fetch arXiv metadata

use anyhow::Result;
use clap::Args;
use papergraph_arxiv::{ArxivClient, ArxivPaper, normalize_arxiv_id};
use papergraph_core::{RequestRecorder, SharedProgress, fmt_num, is_shutdown_requested};
use papergraph_db::{Database, PaperRow, Status, Step};
use papergraph_semantic_scholar::schema::ARXIV_ABS_URL;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Process only this paper (created if absent)
    pub arxiv_id: Option<String>,

    /// Maximum number of pending papers to process
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

/// Per-run outcome counts
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ProcessCounts {
    pub completed: usize,
    pub failed: usize,
}

fn select_papers(db: &Database, args: &ProcessArgs) -> Result<Vec<PaperRow>> {
    if let Some(input) = &args.arxiv_id {
        let Some(arxiv_id) = normalize_arxiv_id(input) else {
            anyhow::bail!("not an arXiv URL or id: {input:?}");
        };
        let (paper, _) = db.ensure_paper(&arxiv_id, &format!("{ARXIV_ABS_URL}/{arxiv_id}"))?;
        return Ok(vec![paper]);
    }
    let mut pending = db.pending(Step::Arxiv)?;
    if let Some(limit) = args.limit {
        pending.truncate(limit);
    }
    Ok(pending)
}

/// Where paper metadata comes from
pub trait MetadataSource {
    fn fetch_metadata(
        &self,
        arxiv_id: &str,
        recorder: &dyn RequestRecorder,
    ) -> Result<ArxivPaper>;
}

impl MetadataSource for ArxivClient {
    fn fetch_metadata(
        &self,
        arxiv_id: &str,
        recorder: &dyn RequestRecorder,
    ) -> Result<ArxivPaper> {
        self.fetch_paper(arxiv_id, recorder)
    }
}

/// Fetch and store metadata for one paper.
fn process_one(
    db: &Database,
    source: &dyn MetadataSource,
    paper: &PaperRow,
) -> Result<ArxivPaper> {
    db.set_status(&paper.id, Step::Arxiv, Status::Processing)?;
    let meta = source.fetch_metadata(&paper.arxiv_id, db)?;
    db.save_arxiv_metadata(&paper.id, &meta)?;
    Ok(meta)
}

pub fn run(args: ProcessArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let db = super::open_database(config)?;
    let client = ArxivClient::new(&config.arxiv.base_url);

    let papers = select_papers(&db, &args)?;
    if papers.is_empty() {
        eprintln!("No pending papers.");
        return Ok(());
    }

    let counts = process_all(&db, &client, &papers, progress)?;

    eprintln!(
        "Processed {} papers: {} completed, {} failed",
        fmt_num(counts.completed + counts.failed),
        fmt_num(counts.completed),
        fmt_num(counts.failed)
    );
    Ok(())
}

/// Process `papers` in order. A failing record is marked failed and the
/// batch moves on.
pub fn process_all(
    db: &Database,
    source: &dyn MetadataSource,
    papers: &[PaperRow],
    progress: &SharedProgress,
) -> Result<ProcessCounts> {
    let bar = progress.records_bar("arxiv", papers.len() as u64);
    let mut counts = ProcessCounts::default();

    for paper in papers {
        if is_shutdown_requested() {
            log::warn!("Shutdown requested, stopping before {}", paper.arxiv_id);
            break;
        }
        bar.set_message(paper.arxiv_id.clone());
        match process_one(db, source, paper) {
            Ok(meta) => {
                log::info!(
                    "{}: {}",
                    paper.arxiv_id,
                    meta.title.as_deref().unwrap_or("(untitled)")
                );
                counts.completed += 1;
            }
            Err(e) => {
                log::warn!("{}: {e:#}", paper.arxiv_id);
                if let Err(e) = db.set_status(&paper.id, Step::Arxiv, Status::Failed) {
                    log::warn!("{}: could not mark failed: {e:#}", paper.arxiv_id);
                }
                counts.failed += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
    Ok(counts)
}
