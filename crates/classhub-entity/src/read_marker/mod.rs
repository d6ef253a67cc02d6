//! Per-user read position.

pub mod model;

pub use model::ReadMarker;
