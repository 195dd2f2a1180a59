/// Factory: build `TokenService` from application `Config`.
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::services::auth::{CredentialStore, TokenIssuer, TokenService, TokenVerifier};

pub fn build_token_service(config: &Config) -> Result<Arc<TokenService>> {
    // Plaintext passwords are tolerated only outside production.
    let allow_plaintext = !config.app_env.is_production();
    let credentials = CredentialStore::load(&config.credentials_file, allow_plaintext)
        .with_context(|| {
            format!(
                "loading admin credentials from {}",
                config.credentials_file.display()
            )
        })?;

    let issuer = TokenIssuer::new(&config.jwt_secret, config.access_token_ttl_seconds)
        .context("building access token issuer")?;
    let verifier = TokenVerifier::new(&config.jwt_secret, &config.jwt_previous_secrets);

    Ok(Arc::new(TokenService::new(credentials, issuer, verifier)))
}
