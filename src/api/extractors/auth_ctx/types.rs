/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 * - リクエスト終了とともに破棄される (サーバー側に状態は残らない)
 */

use crate::services::auth::VerifiedToken;

/// 認証済みのリクエストに付与されるコンテキスト
///
/// - `subject` はトークンの sub (= 管理者の username)、空文字にはならない
/// - `jti` はログ相関用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub subject: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub jti: Option<String>,
}

impl From<VerifiedToken> for AuthCtx {
    fn from(v: VerifiedToken) -> Self {
        Self {
            subject: v.subject,
            issued_at: v.issued_at,
            expires_at: v.expires_at,
            jti: v.jti,
        }
    }
}
