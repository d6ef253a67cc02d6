//! # classhub-cache
//!
//! TTL key-value cache providers for ClassHub:
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka)
//!   with per-entry expiry
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime from configuration. [`CacheManager`]
//! also serves as the [`PresenceStore`](classhub_core::traits::PresenceStore)
//! for live-room teacher presence.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
