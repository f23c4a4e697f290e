//! Mock board source for running without the live departure monitor.
//!
//! Loads saved departure pages from a directory and serves them as if
//! they were live responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::domain::StopId;
use crate::request::RequestContext;

use super::error::FetchError;
use super::source::{BoardSource, RawDocument, within_context};

/// Mock board source that serves pages from disk.
///
/// Useful for development and tests without network access. Pages are
/// served with no declared charset, like the live monitor.
#[derive(Debug, Clone)]
pub struct MockBoardSource {
    /// Pre-loaded pages, keyed by stop identifier.
    boards: Arc<HashMap<StopId, RawDocument>>,
    /// Artificial latency before answering.
    delay: Option<Duration>,
}

impl MockBoardSource {
    /// Load pages from a directory.
    ///
    /// Expects files named `{id}.html` (e.g. `7.html`).
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, FetchError> {
        let data_dir = data_dir.as_ref();
        let mut boards = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| {
            FetchError::Mock(format!("failed to read {}: {}", data_dir.display(), e))
        })?;

        for entry in entries {
            let entry = entry
                .map_err(|e| FetchError::Mock(format!("failed to read directory entry: {}", e)))?;

            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("html") {
                continue;
            }

            // "7.html" -> 7
            let id = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u32>().ok())
                .ok_or_else(|| FetchError::Mock(format!("invalid filename: {}", path.display())))?;

            let body = std::fs::read(&path)
                .map_err(|e| FetchError::Mock(format!("failed to read {}: {}", path.display(), e)))?;

            boards.insert(StopId::new(id), RawDocument::new(body, None));
        }

        if boards.is_empty() {
            return Err(FetchError::Mock(format!(
                "no mock board files found in {}",
                data_dir.display()
            )));
        }

        Ok(Self {
            boards: Arc::new(boards),
            delay: None,
        })
    }

    /// Build a source from in-memory pages.
    pub fn from_documents(documents: impl IntoIterator<Item = (StopId, RawDocument)>) -> Self {
        Self {
            boards: Arc::new(documents.into_iter().collect()),
            delay: None,
        }
    }

    /// Wait this long before answering each fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Stops with a saved page, in ascending order.
    pub fn available_stops(&self) -> Vec<StopId> {
        let mut stops: Vec<_> = self.boards.keys().copied().collect();
        stops.sort();
        stops
    }

    async fn lookup(&self, stop: StopId) -> Result<RawDocument, FetchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        // Unknown stops look like the upstream rejecting the code.
        self.boards
            .get(&stop)
            .cloned()
            .ok_or(FetchError::Status { status: 404 })
    }
}

impl BoardSource for MockBoardSource {
    fn fetch<'a>(
        &'a self,
        stop: StopId,
        ctx: &'a RequestContext,
    ) -> BoxFuture<'a, Result<RawDocument, FetchError>> {
        within_context(ctx, self.lookup(stop)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn load_mock_data() {
        let source = MockBoardSource::new("data/mock_boards").unwrap();
        assert!(source.available_stops().contains(&StopId::new(7)));
    }

    #[tokio::test]
    async fn serves_saved_page() {
        let source = MockBoardSource::new("data/mock_boards").unwrap();

        let doc = source.fetch(StopId::new(7), &ctx()).await.unwrap();

        assert!(!doc.body.is_empty());
        assert_eq!(doc.charset, None);
    }

    #[tokio::test]
    async fn unknown_stop_returns_error() {
        let source = MockBoardSource::new("data/mock_boards").unwrap();

        let err = source.fetch(StopId::new(123456), &ctx()).await.unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404 }));
    }

    #[test]
    fn ignores_other_files_and_rejects_empty_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("README.txt"), "not a board").unwrap();

        let err = MockBoardSource::new(dir.path()).unwrap_err();
        assert!(err.to_string().contains("no mock board files"));
    }

    #[test]
    fn rejects_non_numeric_filename() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("neumarkt.html"), "<html></html>").unwrap();

        assert!(MockBoardSource::new(dir.path()).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_delay() {
        let source = MockBoardSource::from_documents([(
            StopId::new(2),
            RawDocument::new("<html></html>", None),
        )])
        .with_delay(Duration::from_secs(10));

        let ctx = ctx();
        let token = ctx.cancellation().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let err = source.fetch(StopId::new(2), &ctx).await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
