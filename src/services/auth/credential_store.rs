//! Single-principal credential store.
//!
//! The admin credentials are read once at startup from a JSON resource:
//!
//! ```json
//! { "username": "alice", "password_hash": "$argon2id$v=19$...", "full_name": "Alice" }
//! ```
//!
//! `password_hash` is either an argon2 PHC string or a bcrypt hash (`$2a$`, `$2b$`, `$2y$`).
//!
//! Any problem with that resource is a startup error; `verify` itself never fails,
//! it only answers yes/no.

use std::{fs, path::Path};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier as _},
};
use serde::Deserialize;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("cannot read credential file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed credential file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("credential file has an empty username")]
    EmptyUsername,
    #[error("credential file has neither `password` nor `password_hash`")]
    MissingVerifier,
    #[error("`password_hash` is not a valid argon2 or bcrypt hash: {0}")]
    InvalidHash(String),
    #[error("plaintext `password` is not accepted in production")]
    PlaintextInProduction,
}

#[derive(Debug, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    password_hash: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
}

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

/// How the principal's password is checked.
#[derive(Clone)]
pub enum PasswordVerifier {
    /// argon2 PHC string, validated at load time.
    Argon2(String),
    /// bcrypt modular-crypt string, validated at load time.
    Bcrypt(String),
    Plaintext(String),
}

impl PasswordVerifier {
    /// Pick the verifier for a configured hash, rejecting anything unparsable.
    fn from_hash(hash: String) -> Result<Self, CredentialError> {
        if BCRYPT_PREFIXES.iter().any(|p| hash.starts_with(p)) {
            // bcrypt exposes no standalone parser; a verify run reports a malformed hash.
            bcrypt::verify("", &hash).map_err(|e| CredentialError::InvalidHash(e.to_string()))?;
            return Ok(Self::Bcrypt(hash));
        }

        PasswordHash::new(&hash).map_err(|e| CredentialError::InvalidHash(e.to_string()))?;
        Ok(Self::Argon2(hash))
    }

    fn matches(&self, password: &str) -> bool {
        match self {
            Self::Argon2(phc) => match PasswordHash::new(phc) {
                Ok(parsed) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                // Validated at load; unreachable unless constructed by hand.
                Err(_) => false,
            },
            Self::Bcrypt(hash) => bcrypt::verify(password, hash).unwrap_or(false),
            Self::Plaintext(expected) => constant_time_eq(password, expected),
        }
    }
}

impl std::fmt::Debug for PasswordVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print verifier material
        match self {
            Self::Argon2(_) => f.write_str("Argon2([REDACTED])"),
            Self::Bcrypt(_) => f.write_str("Bcrypt([REDACTED])"),
            Self::Plaintext(_) => f.write_str("Plaintext([REDACTED])"),
        }
    }
}

/// The one administrative identity.
#[derive(Debug, Clone)]
pub struct Principal {
    pub username: String,
    pub full_name: Option<String>,
    verifier: PasswordVerifier,
}

impl Principal {
    pub fn new(username: impl Into<String>, verifier: PasswordVerifier) -> Self {
        Self {
            username: username.into(),
            full_name: None,
            verifier,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    principal: Principal,
}

impl CredentialStore {
    /// Read and validate the credential resource.
    ///
    /// `allow_plaintext` is false in production; a plaintext-only file is then rejected.
    pub fn load(path: &Path, allow_plaintext: bool) -> Result<Self, CredentialError> {
        let raw = fs::read_to_string(path).map_err(|source| CredentialError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw, allow_plaintext)
    }

    pub fn from_json(raw: &str, allow_plaintext: bool) -> Result<Self, CredentialError> {
        let file: CredentialFile = serde_json::from_str(raw)?;

        if file.username.trim().is_empty() {
            return Err(CredentialError::EmptyUsername);
        }

        let verifier = match (file.password_hash, file.password) {
            (Some(hash), plain) if !hash.is_empty() => {
                let verifier = PasswordVerifier::from_hash(hash)?;
                if plain.is_some() {
                    warn!("credential file has both `password` and `password_hash`; using the hash");
                }
                verifier
            }
            (_, Some(plain)) => {
                if !allow_plaintext {
                    return Err(CredentialError::PlaintextInProduction);
                }
                warn!("admin password is stored in plaintext; use `password_hash` instead");
                PasswordVerifier::Plaintext(plain)
            }
            _ => return Err(CredentialError::MissingVerifier),
        };

        let mut principal = Principal::new(file.username, verifier);
        principal.full_name = file.full_name;

        Ok(Self { principal })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Does `password` match the configured principal named `username`?
    ///
    /// The password check runs even for an unknown username, so both failures cost the same.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok = constant_time_eq(username, &self.principal.username);
        let password_ok = self.principal.verifier.matches(password);
        username_ok & password_ok
    }
}

fn constant_time_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}
