/*
 * Responsibility
 * - GET /admin    : 管理画面シェル (exempt、クライアント側でトークン確認する)
 * - GET /admin/me : 保護対象。ゲートが付けた AuthCtx から管理者プロフィールを返す
 */
use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::api::dto::admin::AdminUserResponse;
use crate::api::extractors::AuthCtxExtractor;
use crate::state::AppState;

pub async fn portal() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the admin portal",
        "login": "/auth/login",
    }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Json<AdminUserResponse> {
    let principal = state.auth.principal();
    let full_name = (principal.username == ctx.subject)
        .then(|| principal.full_name.clone())
        .flatten();

    Json(AdminUserResponse {
        message: format!("Welcome to the admin portal, {}!", ctx.subject),
        username: ctx.subject,
        is_active: true,
        is_superuser: true,
        full_name,
        token_issued_at: ctx.issued_at,
        token_expires_at: ctx.expires_at,
    })
}
