//! Integration tests: the full app over in-memory backends.

mod helpers;
mod live_test;
mod roster_test;
mod ws_test;
