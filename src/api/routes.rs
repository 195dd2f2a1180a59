/*
 * Responsibility
 * - URL 構造を定義
 * - 認証ゲートは Router 全体に掛ける (exempt/protected の判定は RoutePolicy 側)
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::api::handlers::{admin, auth, health::health};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health))
        .route("/auth/login", post(auth::login))
        .route("/auth/validate", get(auth::validate).post(auth::validate))
        .route("/admin", get(admin::portal))
        .route("/admin/me", get(admin::me))
}
