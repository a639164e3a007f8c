//! arXiv API client

use std::time::Instant;

use anyhow::Context;
use papergraph_core::{RequestRecord, RequestRecorder, RequestSource, get_text};

use crate::parser::{ArxivPaper, parse_feed};

/// Default arXiv API host
pub const DEFAULT_BASE_URL: &str = "https://export.arxiv.org";

#[derive(Debug, Clone)]
pub struct ArxivClient {
    pub base_url: String,
}

impl Default for ArxivClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ArxivClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn query_url(&self, arxiv_id: &str) -> String {
        format!("{}/api/query?id_list={arxiv_id}", self.base_url)
    }

    /// Fetch and parse metadata for one paper. No retries.
    pub fn fetch_paper(
        &self,
        arxiv_id: &str,
        recorder: &dyn RequestRecorder,
    ) -> anyhow::Result<ArxivPaper> {
        let url = self.query_url(arxiv_id);
        log::debug!("GET {url}");

        let started = Instant::now();
        let outcome = get_text(&url, &[]);
        recorder.record(&RequestRecord::from_outcome(
            RequestSource::Arxiv,
            &url,
            Some(arxiv_id),
            &outcome,
            started,
        ));

        let response = outcome
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("arXiv request failed for {arxiv_id}"))?;
        log::debug!("{arxiv_id}: {} bytes", response.body.len());

        parse_feed(&response.body).with_context(|| format!("arXiv paper {arxiv_id}"))
    }
}

/// Extract an arXiv id from an abs/pdf URL or a bare id.
///
/// `https://arxiv.org/abs/2503.15888` → `2503.15888`
pub fn normalize_arxiv_id(input: &str) -> Option<String> {
    let last = input
        .trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .trim_end_matches(".pdf");
    (!last.is_empty()).then(|| last.to_string())
}
