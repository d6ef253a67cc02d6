//! Join tokens for the video-conferencing provider.
//!
//! The claim layout follows the provider's JWT auth scheme: `iss` is the
//! app id, `sub` the provider domain, `room` the room name, and
//! `context.user` describes the participant.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use classhub_core::config::LiveConfig;
use classhub_core::error::AppError;
use classhub_core::types::{RoomId, UserId};
use classhub_entity::user::UserRole;

/// Participant block inside the join token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinUser {
    pub id: UserId,
    pub name: String,
    pub moderator: bool,
}

/// Context block inside the join token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinContext {
    pub user: JoinUser,
}

/// Claims of a join token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinClaims {
    pub aud: String,
    pub iss: String,
    pub sub: String,
    pub room: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub context: JoinContext,
}

/// A minted join token and when it stops being accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Mints join tokens. The only place in ClassHub that holds the provider
/// secret.
#[derive(Clone)]
pub struct JoinTokenMinter {
    encoding_key: EncodingKey,
    app_id: String,
    domain: String,
    audience: String,
    ttl: Duration,
}

impl std::fmt::Debug for JoinTokenMinter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinTokenMinter")
            .field("app_id", &self.app_id)
            .field("domain", &self.domain)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JoinTokenMinter {
    /// Creates a minter from live-room configuration.
    pub fn new(config: &LiveConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.app_secret.as_bytes()),
            app_id: config.app_id.clone(),
            domain: config.domain.clone(),
            audience: config.audience.clone(),
            ttl: Duration::from_secs(config.join_token_ttl_seconds),
        }
    }

    /// Mint a token admitting `user_id` to `room_id`. Teachers and admins
    /// join as moderators.
    pub fn mint(
        &self,
        room_id: RoomId,
        user_id: UserId,
        display_name: &str,
        role: UserRole,
    ) -> Result<JoinToken, AppError> {
        let now = Utc::now();
        let expires_at = now
            + chrono::Duration::from_std(self.ttl)
                .map_err(|e| AppError::configuration(format!("Invalid join token TTL: {e}")))?;

        let claims = JoinClaims {
            aud: self.audience.clone(),
            iss: self.app_id.clone(),
            sub: self.domain.clone(),
            room: room_id.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
            context: JoinContext {
                user: JoinUser {
                    id: user_id,
                    name: display_name.to_string(),
                    moderator: role.is_moderator(),
                },
            },
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode join token: {e}")))?;

        Ok(JoinToken { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

    fn decode_claims(config: &LiveConfig, token: &str) -> JoinClaims {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_issuer(&[config.app_id.as_str()]);
        decode::<JoinClaims>(
            token,
            &DecodingKey::from_secret(config.app_secret.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims
    }

    #[test]
    fn test_token_binds_room_and_user() {
        let config = LiveConfig::default();
        let minter = JoinTokenMinter::new(&config);
        let room_id = RoomId::new();
        let user_id = UserId::new();

        let minted = minter
            .mint(room_id, user_id, "Ms. Rivera", UserRole::Teacher)
            .unwrap();
        let claims = decode_claims(&config, &minted.token);

        assert_eq!(claims.room, room_id.to_string());
        assert_eq!(claims.sub, config.domain);
        assert_eq!(claims.context.user.id, user_id);
        assert_eq!(claims.context.user.name, "Ms. Rivera");
        assert!(claims.context.user.moderator);
        assert_eq!(claims.exp - claims.nbf, 600);
    }

    #[test]
    fn test_moderator_flag_follows_role() {
        let config = LiveConfig::default();
        let minter = JoinTokenMinter::new(&config);
        for (role, expected) in [
            (UserRole::Teacher, true),
            (UserRole::Admin, true),
            (UserRole::Student, false),
        ] {
            let minted = minter.mint(RoomId::new(), UserId::new(), "x", role).unwrap();
            assert_eq!(
                decode_claims(&config, &minted.token).context.user.moderator,
                expected
            );
        }
    }

    #[test]
    fn test_tokens_differ_across_rooms() {
        let minter = JoinTokenMinter::new(&LiveConfig::default());
        let user_id = UserId::new();
        let a = minter.mint(RoomId::new(), user_id, "x", UserRole::Student).unwrap();
        let b = minter.mint(RoomId::new(), user_id, "x", UserRole::Student).unwrap();
        assert_ne!(a.token, b.token);
    }
}
