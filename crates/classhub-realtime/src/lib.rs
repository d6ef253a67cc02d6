//! # classhub-realtime
//!
//! The messaging engine behind `GET /ws`:
//!
//! - connection pool and per-connection outbound queues
//! - explicit conversation groups for fan-out
//! - ping/pong heartbeat
//! - typed client and server events with scoped error reporting
//! - dispatch of chat and live-room events onto the service layer

pub mod channel;
pub mod connection;
pub mod dispatch;
pub mod message;
pub mod metrics;
pub mod server;

pub use channel::registry::ChannelRegistry;
pub use connection::handle::{ConnectionHandle, ConnectionId};
pub use message::types::{ClientEvent, ServerEvent};
pub use metrics::{MetricsSnapshot, RealtimeMetrics};
pub use server::RealtimeEngine;
