//! Stop name lookup.
//!
//! Maps a free-text stop name to the numeric identifier the upstream
//! departure monitor expects. The gazetteer and the identifier map are
//! loaded once at startup and shared read-only.

mod directory;
mod error;
mod matcher;
mod resolver;

pub use directory::StopDirectory;
pub use error::{ResolveError, StopDataError};
pub use matcher::{Pattern, Scored};
pub use resolver::{Candidate, NameResolver, ResolverConfig};
