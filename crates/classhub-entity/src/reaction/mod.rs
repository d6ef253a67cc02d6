//! Message reactions.

pub mod model;
pub mod summary;

pub use model::Reaction;
pub use summary::ReactionSummary;
