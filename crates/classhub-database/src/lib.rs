//! # classhub-database
//!
//! The conversation store behind ClassHub's realtime subsystem. Callers
//! program against the [`ChatStore`] and [`LiveRoomStore`] traits; the
//! PostgreSQL implementation is built from per-entity sqlx repositories and
//! the in-memory implementation backs development and tests.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::memory::MemoryStore;
pub use store::postgres::PgStore;
pub use store::{ChatStore, LiveRoomStore, UnlinkOutcome};
