//! HS256 token codec.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use campus_core::config::auth::AuthConfig;
use campus_core::error::AppError;
use campus_core::result::AppResult;
use campus_entity::user::RoleCode;

use super::claims::TokenClaims;

/// Clock skew tolerated when validating expiry, in seconds.
const VALIDATION_LEEWAY_SECS: u64 = 5;

/// Encodes and verifies signed session tokens.
///
/// Tokens are HS256-signed and carry the full claim set needed to
/// rebuild an authorization context without a database round trip.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    /// Creates a codec from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            ttl: Duration::days(config.token_ttl_days as i64),
        }
    }

    /// Token lifetime as configured.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a signed token for the given claims, stamping the expiry.
    ///
    /// The nil UUID is rejected as a user id: it would otherwise produce
    /// a signable token for a user that cannot exist.
    pub fn issue(
        &self,
        user_id: Uuid,
        role_code: RoleCode,
        school_id: Option<Uuid>,
        period_id: Option<Uuid>,
    ) -> AppResult<(String, TokenClaims)> {
        if user_id.is_nil() {
            return Err(AppError::token_invalid("Cannot issue token for nil user id"));
        }

        let claims = TokenClaims {
            user_id,
            role_code,
            school_id,
            period_id,
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::with_source(
                campus_core::error::ErrorKind::Internal,
                "Failed to sign token",
                e,
            ))?;

        Ok((token, claims))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Expiry is reported distinctly from every other failure mode so
    /// that clients can tell a stale credential from a forged one.
    pub fn parse(&self, token: &str) -> AppResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = VALIDATION_LEEWAY_SECS;
        validation.validate_exp = true;

        jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::token_expired("Session token has expired")
                }
                _ => AppError::token_invalid("Session token is invalid"),
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::error::ErrorKind;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig {
            token_secret: "test-secret-do-not-use".into(),
            token_ttl_days: 120,
            multi_device_login: false,
            password_min_length: 8,
        })
    }

    #[test]
    fn test_issue_and_parse() {
        let codec = codec();
        let user_id = Uuid::new_v4();
        let school_id = Uuid::new_v4();

        let (token, issued) = codec
            .issue(user_id, RoleCode::Teacher, Some(school_id), None)
            .unwrap();
        let parsed = codec.parse(&token).unwrap();

        assert_eq!(parsed, issued);
        assert_eq!(parsed.user_id, user_id);
        assert_eq!(parsed.role_code, RoleCode::Teacher);
        assert_eq!(parsed.school_id, Some(school_id));
        assert_eq!(parsed.period_id, None);
    }

    #[test]
    fn test_expiry_is_roughly_ttl_from_now() {
        let codec = codec();
        let (_, claims) = codec
            .issue(Uuid::new_v4(), RoleCode::Student, None, None)
            .unwrap();
        let expected = (Utc::now() + Duration::days(120)).timestamp();
        assert!((claims.exp - expected).abs() < 5);
    }

    #[test]
    fn test_nil_user_rejected() {
        let err = codec()
            .issue(Uuid::nil(), RoleCode::Student, None, None)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let codec = codec();
        let (token, _) = codec
            .issue(Uuid::new_v4(), RoleCode::Student, None, None)
            .unwrap();

        let mut tampered = token.into_bytes();
        let last = tampered.len() - 1;
        tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();

        let err = codec.parse(&tampered).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (token, _) = codec()
            .issue(Uuid::new_v4(), RoleCode::Student, None, None)
            .unwrap();

        let other = TokenCodec::new(&AuthConfig {
            token_secret: "another-secret".into(),
            token_ttl_days: 120,
            multi_device_login: false,
            password_min_length: 8,
        });
        let err = other.parse(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }

    #[test]
    fn test_expired_token_reported_as_expired() {
        let config = AuthConfig {
            token_secret: "test-secret-do-not-use".into(),
            token_ttl_days: 120,
            multi_device_login: false,
            password_min_length: 8,
        };
        let codec = TokenCodec::new(&config);

        // Sign an already-expired claim set directly, bypassing issue().
        let claims = TokenClaims {
            user_id: Uuid::new_v4(),
            role_code: RoleCode::Student,
            school_id: None,
            period_id: None,
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.token_secret.as_bytes()),
        )
        .unwrap();

        let err = codec.parse(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenExpired);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = codec().parse("not.a.token").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TokenInvalid);
    }
}
