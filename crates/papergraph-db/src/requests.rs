//! Request log backed by the `network_requests` table

use anyhow::{Context, Result};
use duckdb::params;
use papergraph_core::{RequestRecord, RequestRecorder};

use crate::store::Database;

impl Database {
    pub fn insert_request(&self, record: &RequestRecord) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO network_requests (source, request_url, request_method, \
                 request_headers, response_status, response_headers, response_body, \
                 duration_ms, success, error_message, arxiv_id) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    record.source.as_str(),
                    record.url,
                    record.method,
                    record.request_headers,
                    record.status.map(i32::from),
                    record.response_headers,
                    record.response_body,
                    record.duration.as_millis() as i64,
                    record.success,
                    record.error_message,
                    record.arxiv_id
                ],
            )
            .with_context(|| format!("Failed to record request to {}", record.url))?;
        Ok(())
    }

    /// Number of recorded requests, optionally only failed ones
    pub fn request_count(&self, failed_only: bool) -> Result<u64> {
        let n: i64 = self.conn().query_row(
            "SELECT count(*) FROM network_requests WHERE NOT ? OR NOT success",
            params![failed_only],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }
}

impl RequestRecorder for Database {
    fn record(&self, record: &RequestRecord) {
        if let Err(e) = self.insert_request(record) {
            log::warn!("{e:#}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use papergraph_core::{HttpError, RequestSource};

    use super::*;

    #[test]
    fn records_success_and_failure() {
        let db = Database::open_in_memory().unwrap();

        let failed: Result<papergraph_core::TextResponse, HttpError> =
            Err(HttpError::from_status(429, "Too Many Requests"));
        let record = RequestRecord::from_outcome(
            RequestSource::SemanticScholar,
            "https://api.example.org/paper/arXiv:1",
            Some("1"),
            &failed,
            Instant::now(),
        )
        .with_request_headers(&[("Accept", "application/json")]);
        db.record(&record);

        assert_eq!(db.request_count(false).unwrap(), 1);
        assert_eq!(db.request_count(true).unwrap(), 1);

        let (status, headers): (Option<i32>, Option<String>) = db
            .conn()
            .query_row(
                "SELECT response_status, request_headers FROM network_requests",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(status, Some(429));
        assert_eq!(headers.as_deref(), Some(r#"{"Accept":"application/json"}"#));
    }
}
