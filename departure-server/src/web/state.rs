//! Application state for the web layer.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::request::RequestContext;
use crate::service::DepartureService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Resolve/fetch/parse pipeline
    pub service: Arc<DepartureService>,

    /// Deadline for each upstream fetch
    pub board_timeout: Duration,

    /// Overall limit for one inbound request
    pub request_timeout: Duration,

    /// Cancelled when the server shuts down
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create a new app state.
    pub fn new(service: DepartureService, board_timeout: Duration, shutdown: CancellationToken) -> Self {
        Self {
            service: Arc::new(service),
            board_timeout,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown,
        }
    }

    /// Set the overall inbound request limit.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Context for one request, cancelled on shutdown.
    pub fn request_context(&self) -> RequestContext {
        RequestContext::new(self.board_timeout).with_cancellation(self.shutdown.child_token())
    }
}
