//! # classhub-api
//!
//! HTTP and WebSocket surface for ClassHub. The WebSocket endpoint feeds
//! the realtime engine; the HTTP routes cover live rooms, roster sync and
//! health.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Backends, build_app, build_state, run_server};
pub use error::ApiError;
pub use state::AppState;
