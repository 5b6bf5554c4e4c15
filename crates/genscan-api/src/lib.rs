//! Genscan API Library
//!
//! This crate provides the HTTP handlers, error mapping, and application setup
//! for the detection relay.

mod handlers;
mod utils;

pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
