use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::config::SigningSecret;
use crate::services::auth::claims::AccessTokenClaims;

pub const ACCESS_TOKEN_ALG: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token subject must not be empty")]
    EmptySubject,
    #[error("token ttl must be positive")]
    NonPositiveTtl,
    #[error("token ttl of {0} seconds is out of range")]
    TtlOutOfRange(u64),
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// A freshly minted access token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: i64,
    pub expires_in: u64,
}

/// HS256 access-token issuer.
///
/// Key material is not printable via Debug.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}

impl TokenIssuer {
    /// Fails when `ttl_seconds` cannot be represented as a positive `Duration`.
    pub fn new(secret: &SigningSecret, ttl_seconds: u64) -> Result<Self, TokenError> {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or(TokenError::TtlOutOfRange(ttl_seconds))?;
        if ttl <= Duration::zero() {
            return Err(TokenError::NonPositiveTtl);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        })
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl.num_seconds().max(0) as u64
    }

    /// Issue an access token for `subject` with the configured lifetime.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        self.issue_with_ttl(subject, self.ttl)
    }

    pub fn issue_with_ttl(&self, subject: &str, ttl: Duration) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, ttl, Utc::now().timestamp())
    }

    /// Clock-free form: `now` is unix seconds.
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: i64,
    ) -> Result<IssuedToken, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        if ttl <= Duration::zero() {
            return Err(TokenError::NonPositiveTtl);
        }

        let exp = now + ttl.num_seconds();
        let claims = AccessTokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp,
            jti: Some(Uuid::new_v4().to_string()),
        };

        let mut header = Header::new(ACCESS_TOKEN_ALG);
        header.typ = Some("JWT".to_string());
        let access_token =
            jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
                error!(error = %e, "failed to sign JWT");
                TokenError::Sign(e)
            })?;

        Ok(IssuedToken {
            access_token,
            expires_at: exp,
            expires_in: ttl.num_seconds() as u64,
        })
    }
}
