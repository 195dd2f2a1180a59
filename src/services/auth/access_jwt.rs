use chrono::Utc;
use jsonwebtoken::{DecodingKey, Validation, errors::ErrorKind};
use thiserror::Error;

use crate::config::SigningSecret;
use crate::services::auth::claims::AccessTokenClaims;
use crate::services::auth::jwt::ACCESS_TOKEN_ALG;

// Errors returned by access-token verification.
#[derive(Debug, Error)]
pub enum AccessJwtError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
}

/// Verified claims, as the rest of the app sees them.
///
/// `subject` may be empty here; callers that need an identity reject that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub jti: Option<String>,
}

impl From<AccessTokenClaims> for VerifiedToken {
    fn from(c: AccessTokenClaims) -> Self {
        Self {
            subject: c.sub,
            issued_at: c.iat,
            expires_at: c.exp,
            jti: c.jti,
        }
    }
}

/// Seam between the request gate and the token verifier.
pub trait VerifyToken: Send + Sync {
    /// `None` for anything that is not a valid, unexpired token. Never panics.
    fn verify(&self, token: &str) -> Option<VerifiedToken>;
}

/// HS256 access-token verifier.
///
/// Holds the current key first, then retired keys kept for rotation.
#[derive(Clone)]
pub struct TokenVerifier {
    keys: Vec<DecodingKey>,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenVerifier")
            .field("keys", &self.keys.len())
            .finish()
    }
}

impl TokenVerifier {
    pub fn new(current: &SigningSecret, previous: &[SigningSecret]) -> Self {
        let keys = std::iter::once(current)
            .chain(previous.iter())
            .map(|s| DecodingKey::from_secret(s.as_bytes()))
            .collect();

        // Expiry is checked by hand in `verify_at` so that `exp` itself is already expired
        // and tests can pin the clock.
        let mut validation = Validation::new(ACCESS_TOKEN_ALG);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Self { keys, validation }
    }

    /// Signature first, then expiry (`now >= exp` fails). `now` is unix seconds.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<VerifiedToken, AccessJwtError> {
        let claims = self.decode(token)?;
        if now >= claims.exp {
            return Err(AccessJwtError::Expired);
        }
        Ok(claims.into())
    }

    fn decode(&self, token: &str) -> Result<AccessTokenClaims, AccessJwtError> {
        let mut last_err = None;
        for key in &self.keys {
            match jsonwebtoken::decode::<AccessTokenClaims>(token, key, &self.validation) {
                Ok(data) => return Ok(data.claims),
                // Only a signature mismatch is worth retrying with a retired key.
                Err(e) if matches!(e.kind(), ErrorKind::InvalidSignature) => last_err = Some(e),
                Err(e) => return Err(e.into()),
            }
        }
        Err(last_err
            .unwrap_or_else(|| ErrorKind::InvalidSignature.into())
            .into())
    }
}

impl VerifyToken for TokenVerifier {
    fn verify(&self, token: &str) -> Option<VerifiedToken> {
        match self.verify_at(token, Utc::now().timestamp()) {
            Ok(v) => Some(v),
            Err(err) => {
                tracing::debug!(error = %err, "access token rejected");
                None
            }
        }
    }
}
