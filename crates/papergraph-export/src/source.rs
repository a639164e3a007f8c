//! Exporter input: papers joined with their related records

/// Author linked to a paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorRecord {
    pub id: String,
    pub name: String,
    pub affiliation: Option<String>,
}

/// Venue a paper appeared in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VenueRecord {
    pub id: String,
    pub venue: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
}

/// One paper with everything the exporter needs to emit its nodes and links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperRecord {
    pub id: String,
    pub arxiv_id: Option<String>,
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub published_date: Option<String>,
    pub journal_ref: Option<String>,
    /// From the Semantic Scholar projection, if fetched
    pub citation_count: Option<i64>,
    pub venue: Option<VenueRecord>,
    pub authors: Vec<AuthorRecord>,
    /// Ids of papers this paper cites
    pub references: Vec<String>,
    /// Ids of papers citing this paper
    pub cited_by: Vec<String>,
}

/// A relational snapshot the exporter can read in one go.
pub trait GraphSource {
    fn papers(&self) -> anyhow::Result<Vec<PaperRecord>>;
}

impl GraphSource for [PaperRecord] {
    fn papers(&self) -> anyhow::Result<Vec<PaperRecord>> {
        Ok(self.to_vec())
    }
}

impl GraphSource for Vec<PaperRecord> {
    fn papers(&self) -> anyhow::Result<Vec<PaperRecord>> {
        Ok(self.clone())
    }
}
