use serde::Serialize;

/// The admin profile as seen by the dashboard.
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    pub username: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
    pub message: String,
    /// Unix seconds, from the presented token.
    pub token_issued_at: i64,
    pub token_expires_at: i64,
}
