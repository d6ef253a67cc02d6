//! # classhub-core
//!
//! Core crate for ClassHub. Contains configuration schemas, typed
//! identifiers, cursor-page types, the collaborator traits the rest of the
//! workspace is written against, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ClassHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
