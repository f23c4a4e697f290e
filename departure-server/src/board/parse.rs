//! Departure table extraction.
//!
//! The departure monitor serves an HTML page in a legacy single-byte
//! encoding. The departure table has a fixed position in the page but no
//! stable classes or IDs, so rows are read purely by structure: the first
//! row is a header, and each data row has line, destination and arrival
//! columns in that order.
//!
//! Per-row problems never fail the parse. The affected field degrades (the
//! arrival to [`Arrival::Unknown`], the destination to its best-effort
//! text) and a [`RowDiagnostic`] is recorded.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;
use scraper::{ElementRef, Html, Selector};

use crate::domain::{Arrival, Departure, Departures};

use super::error::ParseError;
use super::source::RawDocument;

/// Location of the departure table: the second child of the content `div`.
pub const DEFAULT_TABLE_SELECTOR: &str = "body > div > table:nth-child(2)";

/// Arrival text meaning "arriving now".
const NOW_TOKEN: &str = "Sofort";

/// Minutes suffix stripped before parsing the arrival number.
const MINUTES_SUFFIX: &str = "Min";

/// Field of a row that a diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Destination,
    Arrival,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Destination => f.write_str("destination"),
            Field::Arrival => f.write_str("arrival"),
        }
    }
}

/// A non-fatal problem in one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDiagnostic {
    /// Index of the data row, starting at 0 after the header.
    pub row: usize,
    pub field: Field,
    pub message: String,
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} {}: {}", self.row, self.field, self.message)
    }
}

/// Parser output: the departures plus any per-row diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBoard {
    pub departures: Departures,
    pub diagnostics: Vec<RowDiagnostic>,
}

/// Parser for departure monitor pages.
#[derive(Debug, Clone)]
pub struct BoardParser {
    table: Selector,
    encoding: &'static Encoding,
}

impl BoardParser {
    /// Create a parser locating the table with `table_selector` and
    /// decoding destinations from `encoding`.
    pub fn new(table_selector: &str, encoding: &'static Encoding) -> Result<Self, ParseError> {
        let table = Selector::parse(table_selector).map_err(|e| ParseError::InvalidSelector {
            selector: table_selector.to_string(),
            message: format!("{e:?}"),
        })?;
        Ok(Self { table, encoding })
    }

    /// Parser for the KVB page layout, decoding ISO-8859-1.
    pub fn kvb() -> Result<Self, ParseError> {
        Self::new(DEFAULT_TABLE_SELECTOR, encoding_rs::WINDOWS_1252)
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Extract departures from a page.
    ///
    /// Fails only if the departure table is missing.
    pub fn parse(&self, doc: &RawDocument) -> Result<ParsedBoard, ParseError> {
        // Without a UTF-8 declaration, bytes map 1:1 to U+0000..U+00FF so
        // cell text can be turned back into the original bytes.
        let (text, legacy) = if doc.is_utf8() {
            (String::from_utf8_lossy(&doc.body), false)
        } else {
            (encoding_rs::mem::decode_latin1(&doc.body), true)
        };
        // Owned only if invalid UTF-8 was replaced with U+FFFD.
        let utf8_replaced = !legacy && matches!(text, Cow::Owned(_));

        let html = Html::parse_document(&text);
        let table = html.select(&self.table).next().ok_or_else(|| {
            ParseError::MalformedDocument("no departure table found".to_string())
        })?;

        let mut board = ParsedBoard::default();

        for (row, tr) in table_rows(table).into_iter().skip(1).enumerate() {
            let cells: Vec<String> = tr
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| matches!(el.value().name(), "td" | "th"))
                .map(|el| el.text().collect())
                .collect();
            let cell = |i: usize| cells.get(i).map(String::as_str).unwrap_or("");

            let line = cell(0).trim().to_string();

            let destination = if legacy {
                match self.decode_legacy(cell(1)) {
                    Ok(decoded) => decoded,
                    Err((best_effort, message)) => {
                        board.diagnostics.push(RowDiagnostic {
                            row,
                            field: Field::Destination,
                            message,
                        });
                        best_effort
                    }
                }
            } else {
                let text = cell(1);
                if utf8_replaced && text.contains(char::REPLACEMENT_CHARACTER) {
                    board.diagnostics.push(RowDiagnostic {
                        row,
                        field: Field::Destination,
                        message: format!("invalid UTF-8 bytes in {:?}", text),
                    });
                }
                text.to_string()
            };

            let arrival = parse_arrival(cell(2)).unwrap_or_else(|message| {
                board.diagnostics.push(RowDiagnostic {
                    row,
                    field: Field::Arrival,
                    message,
                });
                Arrival::Unknown
            });

            board.departures.departures.push(Departure {
                line,
                destination: destination.trim().to_string(),
                arrival,
            });
        }

        Ok(board)
    }

    /// Re-decode latin-1 transported text with the configured encoding.
    ///
    /// On failure returns the best-effort text and a message.
    fn decode_legacy(&self, text: &str) -> Result<String, (String, String)> {
        if !encoding_rs::mem::is_str_latin1(text) {
            return Err((
                text.to_string(),
                format!(
                    "text {:?} contains characters outside the single-byte range",
                    text
                ),
            ));
        }

        let bytes = encoding_rs::mem::encode_latin1_lossy(text);
        match self
            .encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
        {
            Some(decoded) => Ok(decoded.into_owned()),
            None => {
                let (lossy, _) = self.encoding.decode_without_bom_handling(&bytes);
                Err((
                    lossy.into_owned(),
                    format!("invalid {} bytes in {:?}", self.encoding.name(), text),
                ))
            }
        }
    }
}

/// Rows of a table in document order, looking through row groups.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

/// Normalize the arrival column.
///
/// `"Sofort"` is now, `"<n> Min"` is `n` minutes. Anything else is an error
/// carrying a message for the diagnostic.
pub fn parse_arrival(text: &str) -> Result<Arrival, String> {
    let trimmed = text.trim();
    if trimmed == NOW_TOKEN {
        return Ok(Arrival::Now);
    }

    let number: Cow<'_, str> = if trimmed.contains(MINUTES_SUFFIX) {
        Cow::Owned(trimmed.replace(MINUTES_SUFFIX, ""))
    } else {
        Cow::Borrowed(trimmed)
    };

    number
        .trim()
        .parse::<u32>()
        .map(Arrival::InMinutes)
        .map_err(|e| format!("unparseable arrival {:?}: {}", trimmed, e))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// "<n> Min" with arbitrary padding always yields n.
        #[test]
        fn minutes_roundtrip(n in 0u32..1000, pad in "[ \t]{0,3}") {
            let text = format!("{pad}{n}{pad}Min{pad}");
            prop_assert_eq!(parse_arrival(&text), Ok(Arrival::InMinutes(n)));
        }

        /// Text without digits never parses.
        #[test]
        fn letters_never_parse(s in "[a-zA-Z ]{0,12}") {
            prop_assume!(s.trim() != "Sofort");
            prop_assert!(parse_arrival(&s).is_err());
        }
    }
}
