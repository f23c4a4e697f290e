//! Resolve, fetch and parse in one call.

use std::fmt;
use std::sync::Arc;

use tracing::{Instrument, debug, info_span, warn};

use crate::board::{BoardParser, BoardSource, FetchError, ParseError};
use crate::domain::{Departures, StopId};
use crate::request::RequestContext;
use crate::stops::{NameResolver, ResolveError};

/// Pipeline stage a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    Fetch,
    Parse,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Resolve => "resolve",
            Stage::Fetch => "fetch",
            Stage::Parse => "parse",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse failure classification, independent of the underlying error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No gazetteer entry matched the query
    NotFound,
    /// The matched name has no identifier
    IdentifierNotConfigured,
    /// Network failure, timeout or non-success status
    UpstreamUnavailable,
    /// The caller cancelled
    Cancelled,
    /// The page has no departure table
    MalformedDocument,
}

/// A failed pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum DepartureError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl DepartureError {
    pub fn stage(&self) -> Stage {
        match self {
            DepartureError::Resolve(_) => Stage::Resolve,
            DepartureError::Fetch(_) => Stage::Fetch,
            DepartureError::Parse(_) => Stage::Parse,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DepartureError::Resolve(ResolveError::NotFound { .. }) => ErrorKind::NotFound,
            DepartureError::Resolve(ResolveError::IdentifierNotConfigured { .. }) => {
                ErrorKind::IdentifierNotConfigured
            }
            DepartureError::Fetch(FetchError::Cancelled) => ErrorKind::Cancelled,
            DepartureError::Fetch(_) => ErrorKind::UpstreamUnavailable,
            DepartureError::Parse(_) => ErrorKind::MalformedDocument,
        }
    }
}

/// Turns a free-text stop name into the stop's current departures.
#[derive(Clone)]
pub struct DepartureService {
    resolver: NameResolver,
    source: Arc<dyn BoardSource>,
    parser: BoardParser,
}

impl DepartureService {
    pub fn new(resolver: NameResolver, source: Arc<dyn BoardSource>, parser: BoardParser) -> Self {
        Self {
            resolver,
            source,
            parser,
        }
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    /// Resolve `query`, fetch that stop's board and parse it.
    ///
    /// The first failing stage ends the run; there are no partial results.
    /// Row-level problems are logged and do not fail the run.
    pub async fn resolve_and_fetch(
        &self,
        query: &str,
        ctx: &RequestContext,
    ) -> Result<Departures, DepartureError> {
        let stop = info_span!("resolve", query).in_scope(|| self.resolver.resolve(query))?;
        self.departures_for(stop, ctx)
            .instrument(info_span!("board", %stop))
            .await
    }

    /// Fetch and parse the board of an already resolved stop.
    pub async fn departures_for(
        &self,
        stop: StopId,
        ctx: &RequestContext,
    ) -> Result<Departures, DepartureError> {
        let doc = self
            .source
            .fetch(stop, ctx)
            .instrument(info_span!("fetch"))
            .await?;

        let board = info_span!("parse").in_scope(|| self.parser.parse(&doc))?;
        for diagnostic in &board.diagnostics {
            warn!(%stop, row = diagnostic.row, field = %diagnostic.field, "{}", diagnostic.message);
        }
        debug!(%stop, departures = board.departures.len(), "parsed departure board");

        Ok(board.departures)
    }
}
