//! DuckDB-backed paper store

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use duckdb::{Connection, OptionalExt, params};
use papergraph_arxiv::ArxivPaper;
use papergraph_semantic_scholar::RelatedPaper;

use crate::ids::{author_id, paper_id, venue_id};
use crate::schema::SCHEMA;

/// Processing state of one step for one paper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => anyhow::bail!("unknown status: {other}"),
        }
    }
}

/// Which per-paper step a status belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// arXiv metadata fetch
    Arxiv,
    /// Semantic Scholar references fetch
    References,
    /// Semantic Scholar citations fetch
    Citations,
}

impl Step {
    fn status_column(self) -> &'static str {
        match self {
            Self::Arxiv => "arxiv_status",
            Self::References => "references_status",
            Self::Citations => "citations_status",
        }
    }

    fn timestamp_column(self) -> &'static str {
        match self {
            Self::Arxiv => "processed_at",
            Self::References => "references_fetched_at",
            Self::Citations => "citations_fetched_at",
        }
    }
}

/// A row of `papers`, minus timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRow {
    pub id: String,
    pub arxiv_id: String,
    pub arxiv_url: Option<String>,
    pub title: Option<String>,
    pub arxiv_status: Status,
    pub references_status: Status,
    pub citations_status: Status,
}

const PAPER_COLUMNS: &str =
    "id, arxiv_id, arxiv_url, title, arxiv_status, references_status, citations_status";

fn read_paper_row(row: &duckdb::Row<'_>) -> duckdb::Result<(PaperRow, [String; 3])> {
    Ok((
        PaperRow {
            id: row.get(0)?,
            arxiv_id: row.get(1)?,
            arxiv_url: row.get(2)?,
            title: row.get(3)?,
            arxiv_status: Status::Pending,
            references_status: Status::Pending,
            citations_status: Status::Pending,
        },
        [row.get(4)?, row.get(5)?, row.get(6)?],
    ))
}

fn finish_paper_row((mut paper, statuses): (PaperRow, [String; 3])) -> Result<PaperRow> {
    paper.arxiv_status = statuses[0].parse()?;
    paper.references_status = statuses[1].parse()?;
    paper.citations_status = statuses[2].parse()?;
    Ok(paper)
}

/// What [`Database::save_related_paper`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPaper {
    pub id: String,
    /// The paper row did not exist before
    pub created: bool,
}

/// Paper counts per arXiv status
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub papers: u64,
    pub pending: u64,
    pub completed: u64,
    pub failed: u64,
    pub authors: u64,
    pub references: u64,
}

/// Relational store for papers, authors, venues and citation edges.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database file and ensure the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database {}", path.display()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open DuckDB in-memory connection")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create schema")?;
        Ok(Self { conn })
    }

    /// Underlying connection, for ad-hoc queries
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn find_paper(&self, arxiv_id: &str) -> Result<Option<PaperRow>> {
        let sql = format!("SELECT {PAPER_COLUMNS} FROM papers WHERE arxiv_id = ?");
        let row = self
            .conn
            .query_row(&sql, params![arxiv_id], read_paper_row)
            .optional()
            .with_context(|| format!("Failed to look up paper {arxiv_id}"))?;
        row.map(finish_paper_row).transpose()
    }

    /// Create a pending paper if absent. Returns the row and whether it was created.
    pub fn ensure_paper(&self, arxiv_id: &str, arxiv_url: &str) -> Result<(PaperRow, bool)> {
        if let Some(existing) = self.find_paper(arxiv_id)? {
            return Ok((existing, false));
        }
        self.conn
            .execute(
                "INSERT INTO papers (id, arxiv_id, arxiv_url) VALUES (?, ?, ?)",
                params![paper_id(arxiv_id), arxiv_id, arxiv_url],
            )
            .with_context(|| format!("Failed to create paper {arxiv_id}"))?;
        log::debug!("created paper {arxiv_id}");
        let created = self
            .find_paper(arxiv_id)?
            .with_context(|| format!("paper {arxiv_id} missing after insert"))?;
        Ok((created, true))
    }

    /// Papers whose `step` is pending, oldest first
    pub fn pending(&self, step: Step) -> Result<Vec<PaperRow>> {
        let sql = format!(
            "SELECT {PAPER_COLUMNS} FROM papers WHERE {} = 'pending' ORDER BY seq",
            step.status_column()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_paper_row)?
            .collect::<duckdb::Result<Vec<_>>>()
            .context("Failed to query pending papers")?;
        rows.into_iter().map(finish_paper_row).collect()
    }

    /// Set a step's status. `Completed` also stamps the step's timestamp.
    pub fn set_status(&self, paper_id: &str, step: Step, status: Status) -> Result<()> {
        let stamp = if status == Status::Completed {
            format!(", {} = now()", step.timestamp_column())
        } else {
            String::new()
        };
        let sql = format!(
            "UPDATE papers SET {} = ?{stamp} WHERE id = ?",
            step.status_column()
        );
        let updated = self
            .conn
            .execute(&sql, params![status.as_str(), paper_id])
            .with_context(|| format!("Failed to set {step:?} status of {paper_id}"))?;
        anyhow::ensure!(updated == 1, "no paper with id {paper_id}");
        Ok(())
    }

    /// Run `f` in one transaction; any error rolls everything back.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.conn
            .execute_batch("BEGIN TRANSACTION")
            .context("Failed to begin transaction")?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT")
                    .context("Failed to commit transaction")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    log::warn!("rollback failed: {rollback}");
                }
                Err(e)
            }
        }
    }

    /// Store arXiv metadata and authors, then mark the arXiv step completed.
    ///
    /// All-or-nothing: on error the row keeps its previous metadata and status.
    pub fn save_arxiv_metadata(&self, paper_id: &str, paper: &ArxivPaper) -> Result<()> {
        self.transaction(|db| {
            db.replace_authors(paper_id, paper.authors.iter().map(String::as_str))
                .with_context(|| format!("Failed to save authors for {paper_id}"))?;
            db.conn
                .execute(
                    "UPDATE papers SET title = ?, abstract = ?, authors_text = ?, \
                     published_date = ?, journal_ref = ?, arxiv_status = 'completed', \
                     processed_at = now() WHERE id = ?",
                    params![
                        paper.title,
                        paper.abstract_text,
                        paper.authors_text(),
                        paper.published_date,
                        paper.journal_ref,
                        paper_id
                    ],
                )
                .with_context(|| format!("Failed to save arXiv metadata for {paper_id}"))?;
            Ok(())
        })
    }

    /// Link `names` to the paper in order, replacing existing links.
    ///
    /// Links that survive are updated in place rather than deleted and
    /// re-inserted, so this is safe inside a transaction.
    fn replace_authors<'a>(
        &self,
        paper_id: &str,
        names: impl Iterator<Item = &'a str>,
    ) -> Result<()> {
        let mut wanted: Vec<(String, &str)> = Vec::new();
        for name in names {
            let id = author_id(name);
            if !wanted.iter().any(|(seen, _)| *seen == id) {
                wanted.push((id, name.trim()));
            }
        }

        let mut stmt = self
            .conn
            .prepare("SELECT author_id FROM paper_authors WHERE paper_id = ?")?;
        let existing = stmt
            .query_map(params![paper_id], |row| row.get::<_, String>(0))?
            .collect::<duckdb::Result<Vec<_>>>()?;
        for stale in existing
            .iter()
            .filter(|id| !wanted.iter().any(|(w, _)| w == *id))
        {
            self.conn.execute(
                "DELETE FROM paper_authors WHERE paper_id = ? AND author_id = ?",
                params![paper_id, stale],
            )?;
        }

        for (position, (author, name)) in wanted.iter().enumerate() {
            self.conn.execute(
                "INSERT INTO authors (id, name) VALUES (?, ?) ON CONFLICT DO NOTHING",
                params![author, name],
            )?;
            self.conn.execute(
                "INSERT INTO paper_authors (paper_id, author_id, position) VALUES (?, ?, ?) \
                 ON CONFLICT (paper_id, author_id) DO UPDATE SET position = excluded.position",
                params![paper_id, author, position as i32],
            )?;
        }
        Ok(())
    }

    fn author_link_count(&self, paper_id: &str) -> Result<u64> {
        let n: i64 = self.conn.query_row(
            "SELECT count(*) FROM paper_authors WHERE paper_id = ?",
            params![paper_id],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }

    /// Create-if-absent a paper seen through Semantic Scholar and attach its
    /// S2 metadata, authors and venue. Existing data is never overwritten.
    pub fn save_related_paper(&self, related: &RelatedPaper) -> Result<SavedPaper> {
        let (row, created) = self.ensure_paper(&related.arxiv_id, &related.arxiv_url)?;
        if created {
            self.conn
                .execute(
                    "UPDATE papers SET title = ?, abstract = ?, authors_text = ?, \
                     published_date = ? WHERE id = ?",
                    params![
                        related.title,
                        related.abstract_text,
                        related.authors,
                        related.published_date,
                        row.id
                    ],
                )
                .with_context(|| format!("Failed to save {}", related.arxiv_id))?;
        }

        if self.author_link_count(&row.id)? == 0 && !related.author_details.is_empty() {
            self.replace_authors(
                &row.id,
                related.author_details.iter().map(|a| a.name.as_str()),
            )?;
        }

        if let Some(s2_id) = &related.s2_paper_id {
            let inserted = self
                .conn
                .execute(
                    "INSERT INTO s2_papers (paper_id, s2_paper_id, url, citation_count, \
                     influential_citation_count, open_access_pdf_url, publication_types) \
                     VALUES (?, ?, ?, ?, ?, ?, ?) ON CONFLICT DO NOTHING",
                    params![
                        row.id,
                        s2_id,
                        related.url,
                        related.citation_count,
                        related.influential_citation_count,
                        related.open_access_pdf_url,
                        related.publication_types
                    ],
                )
                .with_context(|| format!("Failed to save S2 data for {}", related.arxiv_id))?;
            if inserted > 0 {
                for field in &related.fields_of_study {
                    if let Some(name) = &field.field {
                        self.conn.execute(
                            "INSERT INTO s2_fields (paper_id, category, field) VALUES (?, ?, ?)",
                            params![row.id, field.category, name],
                        )?;
                    }
                }
            } else {
                log::debug!("{}: S2 data already stored", related.arxiv_id);
            }
        }

        if related.has_venue() {
            self.conn
                .execute(
                    "INSERT INTO venues (id, paper_id, venue, volume, issue, pages) \
                     VALUES (?, ?, ?, ?, ?, ?) ON CONFLICT DO NOTHING",
                    params![
                        venue_id(&row.id),
                        row.id,
                        related.venue,
                        related.volume,
                        related.issue,
                        related.pages
                    ],
                )
                .with_context(|| format!("Failed to save venue for {}", related.arxiv_id))?;
        }

        Ok(SavedPaper {
            id: row.id,
            created,
        })
    }

    /// Record that `paper_id` cites `reference_id`. Returns whether the edge is new.
    pub fn add_reference(&self, paper_id: &str, reference_id: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT count(*) > 0 FROM paper_references WHERE paper_id = ? AND reference_id = ?",
            params![paper_id, reference_id],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(false);
        }
        self.conn
            .execute(
                "INSERT INTO paper_references (paper_id, reference_id) VALUES (?, ?)",
                params![paper_id, reference_id],
            )
            .with_context(|| format!("Failed to link {paper_id} -> {reference_id}"))?;
        Ok(true)
    }

    pub fn stats(&self) -> Result<StoreStats> {
        self.conn
            .query_row(
                "SELECT
                    (SELECT count(*) FROM papers),
                    (SELECT count(*) FROM papers WHERE arxiv_status = 'pending'),
                    (SELECT count(*) FROM papers WHERE arxiv_status = 'completed'),
                    (SELECT count(*) FROM papers WHERE arxiv_status = 'failed'),
                    (SELECT count(*) FROM authors),
                    (SELECT count(*) FROM paper_references)",
                [],
                |row| {
                    Ok(StoreStats {
                        papers: row.get::<_, i64>(0)? as u64,
                        pending: row.get::<_, i64>(1)? as u64,
                        completed: row.get::<_, i64>(2)? as u64,
                        failed: row.get::<_, i64>(3)? as u64,
                        authors: row.get::<_, i64>(4)? as u64,
                        references: row.get::<_, i64>(5)? as u64,
                    })
                },
            )
            .context("Failed to query store stats")
    }
}
