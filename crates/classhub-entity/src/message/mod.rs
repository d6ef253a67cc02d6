//! Message entities.

pub mod kind;
pub mod model;
pub mod state;

pub use kind::MessageKind;
pub use model::{Message, MessageRow, NewMessage};
pub use state::MessageState;
