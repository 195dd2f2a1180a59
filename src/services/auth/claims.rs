use serde::{Deserialize, Serialize};

/// Access token (JWT) claims.
///
/// - `iat` / `exp` are unix seconds.
/// - `jti` is random per issuance, so two tokens are never byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub jti: Option<String>,
}
