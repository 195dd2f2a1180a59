/*
 * Responsibility
 * - GET /healthz (疎通用, 認証ゲートの exempt 対象)
 */
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
