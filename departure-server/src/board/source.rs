//! The seam between the pipeline and wherever boards come from.

use std::future::Future;

use futures::future::BoxFuture;
use tracing::debug;

use crate::domain::StopId;
use crate::request::RequestContext;

use super::error::FetchError;

/// Upstream response body, not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Response body bytes.
    pub body: Vec<u8>,
    /// Charset label from the `Content-Type` header, if the upstream sent one.
    pub charset: Option<String>,
}

impl RawDocument {
    pub fn new(body: impl Into<Vec<u8>>, charset: Option<String>) -> Self {
        Self {
            body: body.into(),
            charset,
        }
    }

    /// True if the upstream declared the body as UTF-8.
    pub fn is_utf8(&self) -> bool {
        self.charset
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case("utf-8") || c.eq_ignore_ascii_case("utf8"))
    }
}

/// Source of departure board documents.
///
/// Implementations issue at most one upstream request per call, never
/// retry, and must stop promptly with [`FetchError::Cancelled`] when the
/// context is cancelled.
pub trait BoardSource: Send + Sync {
    fn fetch<'a>(
        &'a self,
        stop: StopId,
        ctx: &'a RequestContext,
    ) -> BoxFuture<'a, Result<RawDocument, FetchError>>;
}

/// Run `fut` under the context's deadline and cancellation token.
///
/// Cancellation wins over a result that is ready at the same time. When
/// either fires, `fut` is dropped, which aborts any request in flight.
pub(crate) async fn within_context<T, F>(ctx: &RequestContext, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::select! {
        biased;
        () = ctx.cancellation().cancelled() => {
            debug!("board fetch cancelled");
            Err(FetchError::Cancelled)
        }
        result = tokio::time::timeout_at(ctx.deadline(), fut) => match result {
            Ok(result) => result,
            Err(_) => Err(FetchError::DeadlineExceeded),
        },
    }
}

/// Extract the `charset` parameter from a `Content-Type` value.
pub(crate) fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}
