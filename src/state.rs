/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: TokenService (認証情報 + 署名鍵, 起動後は不変)
 *   - policy: RoutePolicy (exempt/protected の静的な分類)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::middleware::auth::policy::RoutePolicy;
use crate::services::auth::TokenService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<TokenService>,
    pub policy: Arc<RoutePolicy>,
}

impl AppState {
    pub fn new(auth: Arc<TokenService>, policy: RoutePolicy) -> Self {
        Self {
            auth,
            policy: Arc::new(policy),
        }
    }
}
