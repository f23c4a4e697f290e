//! Domain types for the departure service.
//!
//! These are the values that flow out of the pipeline: stop identifiers
//! and the normalized departure board served to clients.

mod departure;
mod stop;

pub use departure::{Arrival, Departure, Departures, UNKNOWN_ARRIVAL};
pub use stop::StopId;
