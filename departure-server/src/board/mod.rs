//! KVB departure monitor access.
//!
//! Fetches the generated departure page for a stop identifier and turns
//! it into structured departures.
//!
//! Characteristics of the monitor page:
//! - Served without a charset in `Content-Type`; the body is ISO-8859-1
//! - Departures are rows of the second element under `body > div`, with
//!   a header row first
//! - Arrival cells read `Sofort` or `N Min`

mod client;
mod error;
mod mock;
mod parse;
mod source;

pub use client::{BoardClient, BoardConfig};
pub use error::{FetchError, ParseError};
pub use mock::MockBoardSource;
pub use parse::{
    BoardParser, DEFAULT_TABLE_SELECTOR, Field, ParsedBoard, RowDiagnostic, parse_arrival,
};
pub use source::{BoardSource, RawDocument};
