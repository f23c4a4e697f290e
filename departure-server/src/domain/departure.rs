//! Departure records as served to clients.

use serde::Serialize;

/// Sentinel for an arrival time that could not be parsed.
pub const UNKNOWN_ARRIVAL: i32 = -1;

/// Time until a vehicle arrives at the stop.
///
/// Serializes to the integer wire format: `Now` is `0`, `InMinutes(n)` is
/// `n` and `Unknown` is the sentinel `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "i32")]
pub enum Arrival {
    /// Arriving now ("Sofort" on the board).
    Now,
    /// Arriving in the given number of minutes.
    InMinutes(u32),
    /// The board showed something we could not interpret.
    Unknown,
}

impl Arrival {
    /// Minutes until arrival, using `-1` for [`Arrival::Unknown`].
    ///
    /// Values beyond `i32::MAX` saturate; no real board shows those.
    pub fn minutes(self) -> i32 {
        match self {
            Arrival::Now => 0,
            Arrival::InMinutes(n) => i32::try_from(n).unwrap_or(i32::MAX),
            Arrival::Unknown => UNKNOWN_ARRIVAL,
        }
    }
}

impl From<Arrival> for i32 {
    fn from(arrival: Arrival) -> Self {
        arrival.minutes()
    }
}

/// A single row of a departure board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    /// Line designation, e.g. "5" or "136".
    pub line: String,
    /// Destination text, always UTF-8.
    pub destination: String,
    /// Time until arrival.
    #[serde(rename = "arrivalInMinutes")]
    pub arrival: Arrival,
}

/// Ordered departures for one stop.
///
/// Order matches the upstream board's row order. No sorting or
/// de-duplication is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Departures {
    pub departures: Vec<Departure>,
}

impl Departures {
    pub fn new(departures: Vec<Departure>) -> Self {
        Self { departures }
    }

    pub fn len(&self) -> usize {
        self.departures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.departures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Departure> {
        self.departures.iter()
    }
}

impl FromIterator<Departure> for Departures {
    fn from_iter<I: IntoIterator<Item = Departure>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
