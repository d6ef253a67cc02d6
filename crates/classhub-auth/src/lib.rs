//! # classhub-auth
//!
//! Token handling for ClassHub:
//!
//! - [`jwt`]: HS256 access tokens that identify callers. Issuance belongs to
//!   the identity service; the encoder exists for tooling and tests.
//! - [`join_token`]: signed credentials for the video-conferencing provider,
//!   bound to one room and minted fresh on every join.

pub mod join_token;
pub mod jwt;

pub use join_token::{JoinToken, JoinTokenMinter};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
