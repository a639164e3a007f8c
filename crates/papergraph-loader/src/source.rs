//! Where the loader reads the manifest and chunks from.
//!
//! Both sources use the exporter's layout: `data-manifest.json` at the root,
//! chunk files under `data-chunks/`.

use std::future::Future;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use papergraph_core::{HttpError, http_client};
use rustc_hash::FxHashMap;

/// Fetches raw resource bodies by root-relative path.
pub trait ChunkSource: Sync {
    /// Fetch `resource` (e.g. `data-chunks/papers-0.json`).
    ///
    /// A missing resource is `HttpError::Http { status: Some(404), .. }`.
    fn fetch(&self, resource: &str) -> impl Future<Output = Result<Vec<u8>, HttpError>> + Send;

    /// Human-readable location, for logs
    fn location(&self) -> String;
}

/// Static assets behind an HTTP base URL.
///
/// Exports are immutable once written, so bodies are cached by URL for the
/// lifetime of the source; a second load does not refetch.
pub struct HttpSource {
    base_url: String,
    client: reqwest::Client,
    cache: Mutex<FxHashMap<String, Vec<u8>>>,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, http_client().clone())
    }

    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn url(&self, resource: &str) -> String {
        format!("{}/{}", self.base_url, resource.trim_start_matches('/'))
    }

    fn cached(&self, url: &str) -> Option<Vec<u8>> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(url).cloned()
    }

    fn store(&self, url: String, body: &[u8]) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.insert(url, body.to_vec());
    }

    /// Number of cached bodies
    pub fn cached_len(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ChunkSource for HttpSource {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>, HttpError> {
        let url = self.url(resource);
        if let Some(body) = self.cached(&url) {
            log::trace!("cache hit: {url}");
            return Ok(body);
        }

        log::debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| HttpError::from_reqwest(&e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
            ));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| HttpError::from_reqwest(&e))?;

        self.store(url, &body);
        Ok(body.to_vec())
    }

    fn location(&self) -> String {
        self.base_url.clone()
    }
}

/// Exporter output on local disk.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ChunkSource for DirSource {
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>, HttpError> {
        let path = self.root.join(resource);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(HttpError::from_status(404, "Not Found"))
            }
            Err(e) => Err(HttpError::Io(e)),
        }
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let source = HttpSource::new("https://example.org/graph/");
        assert_eq!(
            source.url("data-chunks/papers-0.json"),
            "https://example.org/graph/data-chunks/papers-0.json"
        );
        assert_eq!(
            source.url("/data-manifest.json"),
            "https://example.org/graph/data-manifest.json"
        );
    }

    #[test]
    fn cache_roundtrip() {
        let source = HttpSource::new("http://localhost");
        assert!(source.cached("http://localhost/a").is_none());
        source.store("http://localhost/a".into(), b"[]");
        assert_eq!(source.cached("http://localhost/a").as_deref(), Some(&b"[]"[..]));
        assert_eq!(source.cached_len(), 1);
    }

    #[tokio::test]
    async fn dir_source_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirSource::new(dir.path());
        let err = source.fetch("data-manifest.json").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn dir_source_reads_nested_resource() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("data-chunks")).unwrap();
        std::fs::write(dir.path().join("data-chunks/venues-0.json"), "[]").unwrap();

        let source = DirSource::new(dir.path());
        let body = source.fetch("data-chunks/venues-0.json").await.unwrap();
        assert_eq!(body, b"[]");
    }
}
