//! access token（JWT）検証 → AuthCtx を extensions に入れる
//!
//! - exempt/protected の判定とトークン検証は `policy` 側（axum 非依存）
//! - ここは判定結果を HTTP に写すだけ：
//!   - Forward       → そのまま next
//!   - Authenticated → AuthCtx を extensions に insert して next
//!   - Reject        → 401 `{"detail":"Unauthorized"}`、next は呼ばない（body も読まない）

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::AuthCtx;
use crate::error::AppError;
use crate::middleware::auth::policy::GateDecision;
use crate::state::AppState;

/// Router 全体に認証ゲートを掛ける。
///
/// 例：
/// ```ignore
/// let app = api::routes();
/// let app = middleware::auth::access::apply(app, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    // 非 UTF-8 のヘッダは「無い」扱い
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let decision = state
        .policy
        .evaluate(req.uri().path(), authorization, &*state.auth);

    match decision {
        GateDecision::Forward => Ok(next.run(req).await),
        GateDecision::Authenticated(verified) => {
            tracing::debug!(
                user = %verified.subject,
                jti = verified.jti.as_deref().unwrap_or("-"),
                path = %req.uri().path(),
                "request authenticated"
            );
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(AuthCtx::from(verified));
            Ok(next.run(req).await)
        }
        GateDecision::Reject(reason) => {
            tracing::warn!(
                path = %req.uri().path(),
                method = %req.method(),
                reason = reason.as_str(),
                "unauthorized request rejected"
            );
            Err(AppError::Unauthorized)
        }
    }
}
