//! # classhub-storage
//!
//! Object storage access for ClassHub. Uploads happen elsewhere; this crate
//! signs time-limited read URLs, deletes orphaned objects, and memoizes
//! signed URLs so repeated references to the same object do not re-invoke
//! the signer.

pub mod manager;
pub mod providers;
pub mod signed_url;

pub use manager::StorageManager;
pub use signed_url::SignedUrlCache;
