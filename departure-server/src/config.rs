//! Server configuration from environment variables.
//!
//! Every variable is optional; unset variables take the defaults below.
//!
//! | variable | default |
//! |---|---|
//! | `BIND_ADDR` | `0.0.0.0:8080` |
//! | `BOARD_BASE_URL` | `https://www.kvb.koeln` |
//! | `BOARD_TIMEOUT_SECS` | `10` |
//! | `BOARD_ENCODING` | `iso-8859-1` |
//! | `STOPS_PATH`, `STOP_IDS_PATH` | bundled data |
//! | `MOCK_BOARDS_DIR` | unset |
//! | `MATCH_CASE_SENSITIVE` | `false` |
//! | `MATCH_MIN_SCORE` | unset |
//! | `REQUEST_TIMEOUT_SECS` | `15` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use encoding_rs::Encoding;

use crate::board::{BoardConfig, BoardParser, DEFAULT_TABLE_SELECTOR, ParseError};
use crate::stops::{ResolverConfig, StopDataError, StopDirectory};

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_BOARD_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BOARD_ENCODING: &str = "iso-8859-1";

/// Inbound request limit when `REQUEST_TIMEOUT_SECS` is unset.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest accepted value for either timeout.
const MAX_TIMEOUT_SECS: u64 = 60 * 60;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but its value cannot be used
    #[error("invalid value {value:?} for {var}: {message}")]
    Invalid {
        var: &'static str,
        value: String,
        message: String,
    },

    /// Only one of the two stop data paths is set
    #[error("STOPS_PATH and STOP_IDS_PATH must be set together")]
    PartialStopData,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind_addr: SocketAddr,
    /// Upstream client settings
    pub board: BoardConfig,
    /// Deadline for each upstream fetch
    pub board_timeout: Duration,
    /// Legacy charset of the upstream pages
    pub board_encoding: &'static Encoding,
    /// Gazetteer and identifier map files, instead of the bundled data
    pub stop_data: Option<(PathBuf, PathBuf)>,
    /// Serve saved pages from this directory instead of the live upstream
    pub mock_boards_dir: Option<PathBuf>,
    /// Name matching settings
    pub resolver: ResolverConfig,
    /// Overall limit for one inbound request
    pub request_timeout: Duration,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values count as unset.
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr =
            parse_var(&get, "BIND_ADDR")?.unwrap_or(SocketAddr::from(DEFAULT_BIND_ADDR));

        let mut board = BoardConfig::new();
        if let Some(url) = get("BOARD_BASE_URL") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("BOARD_BASE_URL", &url, "expected an http(s) URL"));
            }
            board = board.with_base_url(url);
        }

        let board_timeout_secs: u64 =
            parse_var(&get, "BOARD_TIMEOUT_SECS")?.unwrap_or(DEFAULT_BOARD_TIMEOUT_SECS);
        check_timeout("BOARD_TIMEOUT_SECS", board_timeout_secs)?;
        // The client-level timeout only backs up the per-request deadline.
        if board_timeout_secs > board.timeout_secs {
            board = board.with_timeout(board_timeout_secs);
        }

        let encoding_label = get("BOARD_ENCODING").unwrap_or_else(|| DEFAULT_BOARD_ENCODING.into());
        let board_encoding = Encoding::for_label(encoding_label.trim().as_bytes())
            .ok_or_else(|| invalid("BOARD_ENCODING", &encoding_label, "unknown encoding"))?;

        let stop_data = match (get("STOPS_PATH"), get("STOP_IDS_PATH")) {
            (Some(stops), Some(ids)) => Some((PathBuf::from(stops), PathBuf::from(ids))),
            (None, None) => None,
            _ => return Err(ConfigError::PartialStopData),
        };

        let mut resolver = ResolverConfig::new();
        if let Some(case_sensitive) = parse_var(&get, "MATCH_CASE_SENSITIVE")? {
            resolver = resolver.with_case_sensitive(case_sensitive);
        }
        if let Some(min_score) = parse_var(&get, "MATCH_MIN_SCORE")? {
            resolver = resolver.with_min_score(min_score);
        }

        let request_timeout_secs: u64 = parse_var(&get, "REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT.as_secs());
        check_timeout("REQUEST_TIMEOUT_SECS", request_timeout_secs)?;

        // The upstream deadline must fire before the inbound request times out.
        if board_timeout_secs >= request_timeout_secs {
            return Err(invalid(
                "BOARD_TIMEOUT_SECS",
                &board_timeout_secs.to_string(),
                format!("must be less than REQUEST_TIMEOUT_SECS ({request_timeout_secs})"),
            ));
        }

        Ok(Self {
            bind_addr,
            board,
            board_timeout: Duration::from_secs(board_timeout_secs),
            board_encoding,
            stop_data,
            mock_boards_dir: get("MOCK_BOARDS_DIR").map(PathBuf::from),
            resolver,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// Load the stop directory from the configured files, or the bundled data.
    pub fn load_directory(&self) -> Result<StopDirectory, StopDataError> {
        match &self.stop_data {
            Some((stops, ids)) => StopDirectory::load(stops, ids),
            None => StopDirectory::bundled(),
        }
    }

    /// Board parser for the configured encoding.
    pub fn parser(&self) -> Result<BoardParser, ParseError> {
        BoardParser::new(DEFAULT_TABLE_SELECTOR, self.board_encoding)
    }
}

fn parse_var<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(var)
        .map(|value| value.trim().parse().map_err(|e| invalid(var, &value, e)))
        .transpose()
}

fn check_timeout(var: &'static str, secs: u64) -> Result<(), ConfigError> {
    if secs == 0 {
        return Err(invalid(var, "0", "must be positive"));
    }
    if secs > MAX_TIMEOUT_SECS {
        return Err(invalid(
            var,
            &secs.to_string(),
            format!("must be at most {MAX_TIMEOUT_SECS}"),
        ));
    }
    Ok(())
}

fn invalid(var: &'static str, value: &str, message: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        message: message.to_string(),
    }
}
