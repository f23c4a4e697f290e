//! Free-text stop name resolution.

use std::sync::Arc;

use tracing::debug;

use crate::domain::StopId;

use super::directory::StopDirectory;
use super::error::ResolveError;
use super::matcher::Pattern;

/// Configuration for name matching.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfig {
    /// Match characters case-sensitively. Off by default.
    pub case_sensitive: bool,

    /// Minimum score the best candidate must reach.
    /// `None` accepts the best subsequence match however weak.
    pub min_score: Option<i64>,
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set case-sensitive matching.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Require a minimum match score.
    pub fn with_min_score(mut self, min_score: i64) -> Self {
        self.min_score = Some(min_score);
        self
    }
}

/// A gazetteer entry matching a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Canonical stop name.
    pub name: &'a str,
    /// Identifier, if the name is in the identifier map.
    pub id: Option<StopId>,
    /// Match score; higher is better.
    pub score: i64,
}

/// Resolves free-text queries to stop identifiers.
///
/// Cheap to clone; the directory is shared.
#[derive(Debug, Clone)]
pub struct NameResolver {
    directory: Arc<StopDirectory>,
    config: ResolverConfig,
}

impl NameResolver {
    pub fn new(directory: Arc<StopDirectory>, config: ResolverConfig) -> Self {
        Self { directory, config }
    }

    /// Resolve a query to the identifier of its best-matching stop.
    ///
    /// Fails with [`ResolveError::NotFound`] if nothing matches and with
    /// [`ResolveError::IdentifierNotConfigured`] if the matched name has no
    /// identifier.
    pub fn resolve(&self, query: &str) -> Result<StopId, ResolveError> {
        let name = self.best_match(query)?;

        let id = self
            .directory
            .id_of(name)
            .ok_or_else(|| ResolveError::IdentifierNotConfigured {
                name: name.to_string(),
            })?;

        debug!(query, name, %id, "resolved stop");
        Ok(id)
    }

    /// Find the canonical name that best matches the query.
    ///
    /// An exact (case-sensitive) gazetteer entry always wins. Otherwise the
    /// highest-scoring subsequence match wins, with ties going to the
    /// earliest gazetteer entry.
    pub fn best_match(&self, query: &str) -> Result<&str, ResolveError> {
        let not_found = || ResolveError::NotFound {
            query: query.to_string(),
        };

        if query.is_empty() {
            return Err(not_found());
        }

        if let Some(exact) = self.directory.names().iter().find(|name| *name == query) {
            return Ok(exact.as_str());
        }

        let pattern = Pattern::new(query, self.config.case_sensitive);
        let mut best: Option<(&str, i64)> = None;

        for name in self.directory.names() {
            let Some(scored) = pattern.score(name) else {
                continue;
            };
            // Strictly greater: the first of equally good names is kept.
            if best.is_none_or(|(_, score)| scored.score > score) {
                best = Some((name.as_str(), scored.score));
            }
        }

        let (name, score) = best.ok_or_else(not_found)?;

        if let Some(min) = self.config.min_score
            && score < min
        {
            debug!(query, name, score, min, "best match below minimum score");
            return Err(not_found());
        }

        debug!(query, name, score, "matched stop name");
        Ok(name)
    }

    /// Ranked matches for a query, best first, at most `limit` of them.
    ///
    /// Equal scores keep gazetteer order. The minimum score, if configured,
    /// filters the list.
    pub fn candidates(&self, query: &str, limit: usize) -> Vec<Candidate<'_>> {
        let pattern = Pattern::new(query, self.config.case_sensitive);
        if pattern.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<Candidate<'_>> = self
            .directory
            .names()
            .iter()
            .filter_map(|name| {
                let scored = pattern.score(name)?;
                Some(Candidate {
                    name: name.as_str(),
                    id: self.directory.id_of(name),
                    score: scored.score,
                })
            })
            .filter(|c| self.config.min_score.is_none_or(|min| c.score >= min))
            .collect();

        // Stable sort keeps gazetteer order among equal scores.
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(limit);
        matches
    }
}
