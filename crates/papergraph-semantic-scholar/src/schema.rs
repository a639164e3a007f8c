//! Graph API response types and the flattened [`RelatedPaper`] row.

use serde::Deserialize;

/// Base URL for arXiv abstract pages
pub const ARXIV_ABS_URL: &str = "https://arxiv.org/abs";

/// `GET /paper/arXiv:{id}?fields=references.…` (or `citations.…`)
#[derive(Debug, Deserialize)]
pub struct PaperResponse {
    #[serde(default)]
    pub references: Option<Vec<S2Paper>>,
    #[serde(default)]
    pub citations: Option<Vec<S2Paper>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S2Paper {
    pub paper_id: Option<String>,
    pub external_ids: Option<ExternalIds>,
    pub title: Option<String>,
    pub r#abstract: Option<String>,
    pub authors: Option<Vec<S2Author>>,
    pub year: Option<i32>,
    pub url: Option<String>,
    pub citation_count: Option<i64>,
    pub influential_citation_count: Option<i64>,
    pub open_access_pdf: Option<OpenAccessPdf>,
    pub publication_types: Option<Vec<String>>,
    pub s2_fields_of_study: Option<Vec<FieldOfStudy>>,
    pub venue: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExternalIds {
    #[serde(rename = "ArXiv")]
    pub arxiv: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S2Author {
    pub author_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct OpenAccessPdf {
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldOfStudy {
    pub category: Option<String>,
    pub field: Option<String>,
}

/// A referenced or citing paper that has an arXiv id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedPaper {
    pub arxiv_id: String,
    pub arxiv_url: String,
    pub title: Option<String>,
    /// Author names joined with ", "
    pub authors: Option<String>,
    pub abstract_text: Option<String>,
    /// `{year}-01-01`; the API only gives a year here
    pub published_date: Option<String>,
    pub s2_paper_id: Option<String>,
    pub url: Option<String>,
    pub citation_count: Option<i64>,
    pub influential_citation_count: Option<i64>,
    pub open_access_pdf_url: Option<String>,
    /// Joined with ", "
    pub publication_types: Option<String>,
    pub fields_of_study: Vec<FieldOfStudy>,
    pub venue: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub pages: Option<String>,
    pub author_details: Vec<S2Author>,
}

impl RelatedPaper {
    /// Flatten an API entry. Entries without an arXiv id are dropped.
    pub fn from_s2(paper: S2Paper) -> Option<Self> {
        let arxiv_id = paper.external_ids.and_then(|ids| ids.arxiv)?;
        let author_details = paper.authors.unwrap_or_default();
        let authors = (!author_details.is_empty()).then(|| {
            author_details
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        });
        Some(Self {
            arxiv_url: format!("{ARXIV_ABS_URL}/{arxiv_id}"),
            arxiv_id,
            title: paper.title,
            authors,
            abstract_text: paper.r#abstract,
            published_date: paper.year.map(|y| format!("{y}-01-01")),
            s2_paper_id: paper.paper_id,
            url: paper.url,
            citation_count: paper.citation_count,
            influential_citation_count: paper.influential_citation_count,
            open_access_pdf_url: paper.open_access_pdf.and_then(|p| p.url),
            publication_types: paper.publication_types.map(|t| t.join(", ")),
            fields_of_study: paper.s2_fields_of_study.unwrap_or_default(),
            venue: paper.venue.filter(|v| !v.is_empty()),
            volume: paper.volume,
            issue: paper.issue,
            pages: paper.pages,
            author_details,
        })
    }

    /// Has any venue information worth storing
    pub fn has_venue(&self) -> bool {
        self.venue.is_some() || self.volume.is_some() || self.issue.is_some() || self.pages.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_entry_is_flattened() {
        let json = r#"{
            "externalIds": {"ArXiv": "2401.00002", "DOI": "10.1/x"},
            "title": "Reference Paper 1",
            "authors": [{"authorId": "1", "name": "Author 1"}, {"authorId": null, "name": "Author 2"}],
            "year": 2023,
            "paperId": "paper-1",
            "url": "https://example.com/paper1",
            "citationCount": 5,
            "influentialCitationCount": 3,
            "openAccessPdf": {"url": "https://example.com/pdf1"},
            "publicationTypes": ["JournalArticle", "Review"],
            "s2FieldsOfStudy": [{"field": "AI", "category": "CS"}],
            "venue": "Journal 1"
        }"#;
        let paper: S2Paper = serde_json::from_str(json).unwrap();
        let related = RelatedPaper::from_s2(paper).unwrap();

        assert_eq!(related.arxiv_id, "2401.00002");
        assert_eq!(related.arxiv_url, "https://arxiv.org/abs/2401.00002");
        assert_eq!(related.authors.as_deref(), Some("Author 1, Author 2"));
        assert_eq!(related.published_date.as_deref(), Some("2023-01-01"));
        assert_eq!(related.publication_types.as_deref(), Some("JournalArticle, Review"));
        assert_eq!(related.open_access_pdf_url.as_deref(), Some("https://example.com/pdf1"));
        assert_eq!(related.citation_count, Some(5));
        assert_eq!(related.author_details.len(), 2);
        assert_eq!(related.author_details[1].author_id, None);
        assert!(related.has_venue());
    }

    #[test]
    fn entry_without_arxiv_id_is_dropped() {
        let paper: S2Paper =
            serde_json::from_str(r#"{"externalIds": {"DOI": "10.1234/test"}, "title": "x"}"#)
                .unwrap();
        assert!(RelatedPaper::from_s2(paper).is_none());

        let paper: S2Paper = serde_json::from_str(r#"{"title": "no ids"}"#).unwrap();
        assert!(RelatedPaper::from_s2(paper).is_none());
    }

    #[test]
    fn sparse_entry_keeps_nones() {
        let paper: S2Paper = serde_json::from_str(
            r#"{"externalIds": {"ArXiv": "1706.03762"}, "venue": "", "s2FieldsOfStudy": null}"#,
        )
        .unwrap();
        let related = RelatedPaper::from_s2(paper).unwrap();
        assert_eq!(related.authors, None);
        assert_eq!(related.published_date, None);
        assert_eq!(related.venue, None);
        assert!(!related.has_venue());
        assert!(related.fields_of_study.is_empty());
    }
}
