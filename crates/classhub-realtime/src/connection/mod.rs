//! WebSocket connection lifecycle.

pub mod handle;
pub mod heartbeat;
pub mod pool;
