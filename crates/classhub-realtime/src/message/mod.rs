//! Wire events and their validation.

pub mod error;
pub mod types;
pub mod validator;
