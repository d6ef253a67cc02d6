//! JWT access token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use classhub_core::config::AuthConfig;
use classhub_core::error::AppError;

use super::claims::Claims;

/// Validates caller access tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish_non_exhaustive()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::unauthorized("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::unauthorized("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::unauthorized("Invalid token signature")
                    }
                    _ => AppError::unauthorized(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use classhub_core::error::ErrorKind;
    use classhub_core::types::UserId;
    use classhub_entity::user::UserRole;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_roundtrip_preserves_identity() {
        let config = config("test-secret");
        let user_id = UserId::new();
        let (token, _) = JwtEncoder::new(&config)
            .generate_access_token(user_id, UserRole::Teacher, "Ms. Rivera")
            .unwrap();

        let claims = JwtDecoder::new(&config).decode_access_token(&token).unwrap();
        assert_eq!(claims.user_id(), user_id);
        assert_eq!(claims.role, UserRole::Teacher);
        assert_eq!(claims.name, "Ms. Rivera");
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let (token, _) = JwtEncoder::new(&config("one"))
            .generate_access_token(UserId::new(), UserRole::Student, "Sam")
            .unwrap();

        let err = JwtDecoder::new(&config("two"))
            .decode_access_token(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut cfg = config("test-secret");
        cfg.leeway_seconds = 0;
        let claims = crate::jwt::Claims {
            sub: UserId::new(),
            role: UserRole::Student,
            name: "Sam".into(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let err = JwtDecoder::new(&cfg).decode_access_token(&token).unwrap_err();
        assert_eq!(err.message, "Token has expired");
    }
}
