//! Live video rooms.

pub mod model;
pub mod status;

pub use model::{LiveRoom, LiveStatus};
pub use status::RoomStatus;
