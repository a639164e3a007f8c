//! `papergraph references` / `papergraph citations` - grow the citation graph
//! from Semantic Scholar

use anyhow::Result;
use clap::Args;
use comfy_table::Cell;
use papergraph_core::{RequestRecorder, SharedProgress, fmt_num, is_shutdown_requested};
use papergraph_db::{Database, PaperRow, Status, Step};
use papergraph_semantic_scholar::{Direction, RelatedPaper, S2Client};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RelatedArgs {
    /// Maximum number of pending papers to process
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,
}

/// Where related papers come from
pub trait RelatedSource {
    fn fetch_related_papers(
        &self,
        arxiv_id: &str,
        direction: Direction,
        recorder: &dyn RequestRecorder,
    ) -> Result<Vec<RelatedPaper>>;
}

impl RelatedSource for S2Client {
    fn fetch_related_papers(
        &self,
        arxiv_id: &str,
        direction: Direction,
        recorder: &dyn RequestRecorder,
    ) -> Result<Vec<RelatedPaper>> {
        self.fetch_related(arxiv_id, direction, recorder)
    }
}

/// What happened to the related papers of one or more papers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelatedCounts {
    /// New paper rows
    pub added: usize,
    /// Related papers already in the store
    pub existing: usize,
    /// New reference edges
    pub linked: usize,
    /// Self references
    pub skipped: usize,
    /// Entries or edges that could not be stored
    pub errors: usize,
}

impl RelatedCounts {
    /// Something went wrong and nothing was stored
    fn nothing_stored(&self) -> bool {
        self.errors > 0 && self.added + self.existing == 0
    }
}

impl std::ops::AddAssign for RelatedCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.added += rhs.added;
        self.existing += rhs.existing;
        self.linked += rhs.linked;
        self.skipped += rhs.skipped;
        self.errors += rhs.errors;
    }
}

/// Totals of one batch run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub completed: usize,
    pub failed: usize,
    pub related: RelatedCounts,
}

fn step(direction: Direction) -> Step {
    match direction {
        Direction::References => Step::References,
        Direction::Citations => Step::Citations,
    }
}

/// Store related papers of `paper` and link them in the right direction.
pub fn save_related(
    db: &Database,
    paper: &PaperRow,
    related: &[RelatedPaper],
    direction: Direction,
) -> RelatedCounts {
    let mut counts = RelatedCounts::default();
    for entry in related {
        if entry.arxiv_id == paper.arxiv_id {
            counts.skipped += 1;
            continue;
        }
        let saved = match db.save_related_paper(entry) {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("{}: cannot store {}: {e:#}", paper.arxiv_id, entry.arxiv_id);
                counts.errors += 1;
                continue;
            }
        };
        if saved.created {
            counts.added += 1;
        } else {
            counts.existing += 1;
        }

        // paper_references always points from the citing paper to the cited one
        let edge = match direction {
            Direction::References => db.add_reference(&paper.id, &saved.id),
            Direction::Citations => db.add_reference(&saved.id, &paper.id),
        };
        match edge {
            Ok(true) => counts.linked += 1,
            Ok(false) => {}
            Err(e) => {
                log::warn!("{}: {e:#}", paper.arxiv_id);
                counts.errors += 1;
            }
        }
    }
    counts
}

/// Fetch, store and link the related papers of one paper.
fn process_one(
    db: &Database,
    source: &dyn RelatedSource,
    paper: &PaperRow,
    direction: Direction,
) -> Result<RelatedCounts> {
    let step = step(direction);
    db.set_status(&paper.id, step, Status::Processing)?;
    let related = source.fetch_related_papers(&paper.arxiv_id, direction, db)?;
    let counts = save_related(db, paper, &related, direction);
    if counts.nothing_stored() {
        anyhow::bail!("none of {} related papers could be stored", counts.errors);
    }
    db.set_status(&paper.id, step, Status::Completed)?;
    Ok(counts)
}

/// Process `papers` in order. A failing record is marked failed and the
/// batch moves on.
pub fn process_all(
    db: &Database,
    source: &dyn RelatedSource,
    papers: &[PaperRow],
    direction: Direction,
    progress: &SharedProgress,
) -> BatchCounts {
    let bar = progress.records_bar(direction.field(), papers.len() as u64);
    let mut batch = BatchCounts::default();

    for paper in papers {
        if is_shutdown_requested() {
            log::warn!("Shutdown requested, stopping before {}", paper.arxiv_id);
            break;
        }
        bar.set_message(paper.arxiv_id.clone());
        match process_one(db, source, paper, direction) {
            Ok(counts) => {
                log::info!(
                    "{}: {} added, {} existing, {} linked, {} skipped",
                    paper.arxiv_id,
                    counts.added,
                    counts.existing,
                    counts.linked,
                    counts.skipped
                );
                batch.related += counts;
                batch.completed += 1;
            }
            Err(e) => {
                log::warn!("{}: {direction}: {e:#}", paper.arxiv_id);
                if let Err(e) = db.set_status(&paper.id, step(direction), Status::Failed) {
                    log::warn!("{}: could not mark failed: {e:#}", paper.arxiv_id);
                }
                batch.failed += 1;
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();
    batch
}

pub fn run(
    args: RelatedArgs,
    direction: Direction,
    config: &Config,
    progress: &SharedProgress,
) -> Result<()> {
    let db = super::open_database(config)?;
    let client = S2Client::new(&config.s2.api_url, config.s2.api_key.clone());
    if client.api_key.is_none() {
        log::warn!("No S2 API key configured; requests will be heavily rate limited");
    }

    let mut papers = db.pending(step(direction))?;
    if let Some(limit) = args.limit {
        papers.truncate(limit);
    }
    if papers.is_empty() {
        eprintln!("No papers with pending {direction}.");
        return Ok(());
    }

    let batch = process_all(&db, &client, &papers, direction, progress);
    let total = batch.related;

    let mut table = super::table(&[
        "Papers", "Failed", "Added", "Existing", "Linked", "Skipped", "Errors",
    ]);
    table.add_row(vec![
        Cell::new(fmt_num(batch.completed)),
        Cell::new(fmt_num(batch.failed)),
        Cell::new(fmt_num(total.added)),
        Cell::new(fmt_num(total.existing)),
        Cell::new(fmt_num(total.linked)),
        Cell::new(fmt_num(total.skipped)),
        Cell::new(fmt_num(total.errors)),
    ]);
    eprintln!("\n{table}");
    Ok(())
}
