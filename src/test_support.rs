//! Shared fixtures for in-crate tests.

use std::sync::Arc;

use crate::config::SigningSecret;
use crate::middleware::auth::policy::RoutePolicy;
use crate::services::auth::{CredentialStore, TokenIssuer, TokenService, TokenVerifier};
use crate::state::AppState;

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "correct horse battery staple";

fn secret() -> SigningSecret {
    SigningSecret::new("test-signing-secret-0123456789abcdef").unwrap()
}

pub fn state() -> AppState {
    let raw = serde_json::json!({
        "username": USERNAME,
        "password": PASSWORD,
        "full_name": "Alice Admin",
    });
    let store = CredentialStore::from_json(&raw.to_string(), true).unwrap();
    let secret = secret();
    let auth = TokenService::new(
        store,
        TokenIssuer::new(&secret, 1800).unwrap(),
        TokenVerifier::new(&secret, &[]),
    );
    AppState::new(Arc::new(auth), RoutePolicy::default())
}

/// Token signed with the same secret `state()` verifies with.
pub fn token_for(subject: &str) -> String {
    TokenIssuer::new(&secret(), 1800)
        .unwrap()
        .issue(subject)
        .unwrap()
        .access_token
}

pub fn foreign_token(subject: &str) -> String {
    let other = SigningSecret::new("some-other-secret-fedcba9876543210").unwrap();
    TokenIssuer::new(&other, 1800)
        .unwrap()
        .issue(subject)
        .unwrap()
        .access_token
}
