//! Web layer for the departure server.
//!
//! Provides HTTP endpoints for stop departures and stop name search.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
