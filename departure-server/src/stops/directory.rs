//! Static stop data: the gazetteer and the identifier map.

use std::collections::HashMap;
use std::path::Path;

use crate::domain::StopId;

use super::error::StopDataError;

/// Bundled gazetteer, one canonical stop name per line.
const BUNDLED_STOPS: &str = include_str!("../../data/stops.txt");

/// Bundled identifier map, a JSON object of `{ name: id }`.
const BUNDLED_STOP_IDS: &str = include_str!("../../data/stop_ids.json");

/// Read-only stop data shared by all requests.
///
/// Holds the ordered gazetteer of canonical stop names and the separately
/// maintained name → identifier map. The two tables are not required to
/// agree: a gazetteer name may have no identifier, and the map may contain
/// keys that are not in the gazetteer.
#[derive(Debug, Clone)]
pub struct StopDirectory {
    /// Canonical names in gazetteer order. Order decides resolver ties.
    names: Vec<String>,
    ids: HashMap<String, StopId>,
}

impl StopDirectory {
    /// Build a directory from already-loaded tables.
    ///
    /// Fails if either table is empty.
    pub fn new(names: Vec<String>, ids: HashMap<String, StopId>) -> Result<Self, StopDataError> {
        if names.is_empty() {
            return Err(StopDataError::Empty("gazetteer"));
        }
        if ids.is_empty() {
            return Err(StopDataError::Empty("identifier map"));
        }
        Ok(Self { names, ids })
    }

    /// Parse a directory from the gazetteer text and identifier map JSON.
    pub fn parse(stops: &str, stop_ids: &str) -> Result<Self, StopDataError> {
        let names = parse_gazetteer(stops);
        let ids: HashMap<String, StopId> = serde_json::from_str(stop_ids)?;
        Self::new(names, ids)
    }

    /// The stop data compiled into the binary.
    pub fn bundled() -> Result<Self, StopDataError> {
        Self::parse(BUNDLED_STOPS, BUNDLED_STOP_IDS)
    }

    /// Load the directory from a gazetteer file and an identifier map file.
    pub fn load(stops_path: &Path, stop_ids_path: &Path) -> Result<Self, StopDataError> {
        let stops = read(stops_path)?;
        let stop_ids = read(stop_ids_path)?;
        Self::parse(&stops, &stop_ids)
    }

    /// Canonical names in gazetteer order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Look up the identifier configured for a canonical name.
    pub fn id_of(&self, name: &str) -> Option<StopId> {
        self.ids.get(name).copied()
    }

    /// Gazetteer names with no entry in the identifier map.
    pub fn unmapped_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .filter(|name| !self.ids.contains_key(name.as_str()))
            .map(String::as_str)
    }

    /// Number of gazetteer entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if the gazetteer has no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of identifier map entries.
    pub fn id_count(&self) -> usize {
        self.ids.len()
    }
}

fn read(path: &Path) -> Result<String, StopDataError> {
    std::fs::read_to_string(path).map_err(|source| StopDataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One name per line; surrounding whitespace and blank lines are dropped.
fn parse_gazetteer(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
