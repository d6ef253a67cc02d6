//! Collaborator traits defined in `classhub-core` and implemented by other crates.

pub mod cache;
pub mod presence;
pub mod storage;

pub use cache::CacheProvider;
pub use presence::PresenceStore;
pub use storage::ObjectStorage;
