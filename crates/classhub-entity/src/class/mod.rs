//! Class roster value objects.

pub mod roster;

pub use roster::ClassRoster;
