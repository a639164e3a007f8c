//! Semantic Scholar graph API client

use std::time::Instant;

use anyhow::Context;
use papergraph_core::{
    RequestRecord, RequestRecorder, RequestSource, RetryPolicy, get_text, retry_rate_limited,
};

use crate::schema::{PaperResponse, RelatedPaper};

/// Default graph API root
pub const DEFAULT_API_URL: &str = "https://api.semanticscholar.org/graph/v1";

/// Per-paper fields requested for each related paper
const RELATED_FIELDS: &[&str] = &[
    "title",
    "authors",
    "externalIds",
    "year",
    "publicationDate",
    "abstract",
    "venue",
    "citationCount",
    "influentialCitationCount",
    "s2FieldsOfStudy",
    "openAccessPdf",
    "publicationTypes",
    "url",
    "paperId",
];

/// Which side of the citation graph to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Papers the given paper cites
    References,
    /// Papers citing the given paper
    Citations,
}

impl Direction {
    pub fn field(self) -> &'static str {
        match self {
            Self::References => "references",
            Self::Citations => "citations",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

/// Graph API client settings.
#[derive(Debug, Clone)]
pub struct S2Client {
    pub api_url: String,
    /// Sent as `x-api-key`; unauthenticated requests are heavily rate limited
    pub api_key: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for S2Client {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            retry: RetryPolicy::from_config(),
        }
    }
}

impl S2Client {
    pub fn new(api_url: &str, api_key: Option<String>) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            ..Self::default()
        }
    }

    /// `{api_url}/paper/arXiv:{id}?fields=references.title,…`
    pub fn related_url(&self, arxiv_id: &str, direction: Direction) -> String {
        let prefix = direction.field();
        let fields: Vec<String> = RELATED_FIELDS
            .iter()
            .map(|f| format!("{prefix}.{f}"))
            .collect();
        format!(
            "{}/paper/arXiv:{arxiv_id}?fields={}",
            self.api_url,
            fields.join(",")
        )
    }

    pub fn fetch_references(
        &self,
        arxiv_id: &str,
        recorder: &dyn RequestRecorder,
    ) -> anyhow::Result<Vec<RelatedPaper>> {
        self.fetch_related(arxiv_id, Direction::References, recorder)
    }

    pub fn fetch_citations(
        &self,
        arxiv_id: &str,
        recorder: &dyn RequestRecorder,
    ) -> anyhow::Result<Vec<RelatedPaper>> {
        self.fetch_related(arxiv_id, Direction::Citations, recorder)
    }

    /// Fetch related papers, retrying on 429. Every attempt is recorded.
    pub fn fetch_related(
        &self,
        arxiv_id: &str,
        direction: Direction,
        recorder: &dyn RequestRecorder,
    ) -> anyhow::Result<Vec<RelatedPaper>> {
        let url = self.related_url(arxiv_id, direction);
        log::debug!("GET {url}");

        let recorded_headers = [("Accept", "application/json")];
        let mut headers: Vec<(&str, &str)> = vec![("Accept", "application/json")];
        if let Some(key) = &self.api_key {
            headers.push(("x-api-key", key.as_str()));
        }

        let label = format!("{direction} of {arxiv_id}");
        let response = retry_rate_limited(&label, &self.retry, || {
            let started = Instant::now();
            let outcome = get_text(&url, &headers);
            recorder.record(
                &RequestRecord::from_outcome(
                    RequestSource::SemanticScholar,
                    &url,
                    Some(arxiv_id),
                    &outcome,
                    started,
                )
                .with_request_headers(&recorded_headers),
            );
            outcome?.error_for_status()
        })
        .with_context(|| format!("Semantic Scholar request failed for {arxiv_id}"))?;

        let related = parse_related(&response.body, direction)
            .with_context(|| format!("Invalid Semantic Scholar response for {arxiv_id}"))?;
        log::info!("{arxiv_id}: {} arXiv {direction}", related.len());
        Ok(related)
    }
}

/// Parse a paper response, keeping only entries with an arXiv id.
///
/// A response without the requested array yields an empty list.
pub fn parse_related(body: &str, direction: Direction) -> anyhow::Result<Vec<RelatedPaper>> {
    let response: PaperResponse = serde_json::from_str(body)?;
    let entries = match direction {
        Direction::References => response.references,
        Direction::Citations => response.citations,
    };
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(RelatedPaper::from_s2)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn related_url_prefixes_every_field() {
        let client = S2Client::new("https://api.example.org/graph/v1/", None);
        let url = client.related_url("2503.15888", Direction::Citations);

        assert!(url.starts_with("https://api.example.org/graph/v1/paper/arXiv:2503.15888?fields="));
        assert!(url.contains("citations.title,citations.authors,"));
        assert!(url.ends_with("citations.paperId"));
        assert!(!url.contains("references."));
    }

    #[test]
    fn missing_array_is_empty() {
        assert!(parse_related(r#"{"paperId": "x"}"#, Direction::References)
            .unwrap()
            .is_empty());
        assert!(parse_related(r#"{"references": null}"#, Direction::References)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn only_requested_direction_is_read() {
        let body = r#"{"citations": [{"externalIds": {"ArXiv": "2401.00002"}}]}"#;
        assert!(parse_related(body, Direction::References).unwrap().is_empty());
        assert_eq!(parse_related(body, Direction::Citations).unwrap().len(), 1);
    }

    #[test]
    fn non_json_body_is_error() {
        assert!(parse_related("<html>", Direction::References).is_err());
    }

    #[test]
    #[ignore = "hits the live Semantic Scholar API"]
    fn live_references() {
        let client = S2Client::default();
        let refs = client
            .fetch_references("1706.03762", &papergraph_core::NoopRecorder)
            .unwrap();
        assert!(!refs.is_empty());
    }
}
