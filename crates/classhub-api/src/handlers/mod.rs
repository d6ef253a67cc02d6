//! Route handlers organized by domain.

pub mod health;
pub mod live;
pub mod roster;
pub mod ws;
