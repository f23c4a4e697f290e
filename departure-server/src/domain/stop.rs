//! Stop identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric stop identifier used by the upstream departure monitor.
///
/// Identifiers only ever come out of the [`StopDirectory`] identifier map,
/// so holding a `StopId` means a canonical stop name was matched and
/// configured.
///
/// # Examples
///
/// ```
/// use departure_server::domain::StopId;
///
/// let appellhofplatz = StopId::new(7);
/// assert_eq!(appellhofplatz.get(), 7);
/// assert_eq!(appellhofplatz.to_string(), "7");
/// ```
///
/// [`StopDirectory`]: crate::stops::StopDirectory
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(u32);

impl StopId {
    /// Wrap a raw identifier.
    pub const fn new(id: u32) -> Self {
        StopId(id)
    }

    /// Returns the raw identifier.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_debug() {
        let id = StopId::new(313);
        assert_eq!(format!("{}", id), "313");
        assert_eq!(format!("{:?}", id), "StopId(313)");
    }

    #[test]
    fn deserializes_from_plain_integer() {
        let id: StopId = serde_json::from_str("7").unwrap();
        assert_eq!(id, StopId::new(7));
        assert_eq!(serde_json::to_string(&id).unwrap(), "7");
    }

    #[test]
    fn rejects_negative_identifier() {
        assert!(serde_json::from_str::<StopId>("-1").is_err());
    }
}
