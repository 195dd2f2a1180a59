use tracing::{info, warn};

use crate::error::AppError;
use crate::services::auth::{
    access_jwt::{TokenVerifier, VerifiedToken, VerifyToken},
    credential_store::{CredentialStore, Principal},
    jwt::{IssuedToken, TokenIssuer},
};

/// Orchestrates login (credential check → token issuance) and token verification.
///
/// Everything inside is immutable after construction, so one instance is shared
/// by all requests behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct TokenService {
    credentials: CredentialStore,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl TokenService {
    pub fn new(credentials: CredentialStore, issuer: TokenIssuer, verifier: TokenVerifier) -> Self {
        Self {
            credentials,
            issuer,
            verifier,
        }
    }

    /// Check the credentials and issue an access token.
    ///
    /// Both "unknown user" and "wrong password" end in the same `InvalidCredentials`.
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AppError> {
        if !self.credentials.verify(username, password) {
            warn!("login rejected: invalid credentials");
            return Err(AppError::InvalidCredentials);
        }

        let issued = self.issuer.issue(username).map_err(|e| {
            warn!(error = %e, "failed to issue access token");
            AppError::Internal
        })?;

        info!(user = %username, expires_at = issued.expires_at, "login succeeded");
        Ok(issued)
    }

    pub fn principal(&self) -> &Principal {
        self.credentials.principal()
    }

    pub fn access_token_ttl_seconds(&self) -> u64 {
        self.issuer.ttl_seconds()
    }
}

impl VerifyToken for TokenService {
    fn verify(&self, token: &str) -> Option<VerifiedToken> {
        self.verifier.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningSecret;

    fn service() -> TokenService {
        let secret = SigningSecret::new("k".repeat(32)).unwrap();
        let store =
            CredentialStore::from_json(r#"{"username":"alice","password":"pw"}"#, true).unwrap();
        TokenService::new(
            store,
            TokenIssuer::new(&secret, 1800).unwrap(),
            TokenVerifier::new(&secret, &[]),
        )
    }

    #[test]
    fn login_issues_verifiable_token() {
        let svc = service();
        let issued = svc.login("alice", "pw").unwrap();

        assert_eq!(issued.expires_in, 1800);
        let v = svc.verify(&issued.access_token).unwrap();
        assert_eq!(v.subject, "alice");
    }

    #[test]
    fn wrong_password_and_unknown_user_look_the_same() {
        let svc = service();

        let a = svc.login("alice", "nope").unwrap_err();
        let b = svc.login("bob", "pw").unwrap_err();
        assert_eq!(a.to_string(), b.to_string());
        assert!(matches!(a, AppError::InvalidCredentials));
    }
}
