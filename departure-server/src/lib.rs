//! KVB departure server.
//!
//! Answers "when does the next tram leave from this stop?" for stops of the
//! Cologne transit network: a free-text stop name is matched against the
//! stop gazetteer, the stop's live departure page is fetched from the KVB
//! departure monitor, and the page is turned into JSON.

pub mod board;
pub mod config;
pub mod domain;
pub mod request;
pub mod service;
pub mod stops;
pub mod web;
