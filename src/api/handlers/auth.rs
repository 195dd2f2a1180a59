/*
 * Responsibility
 * - POST /auth/login    : 認証情報の検証 → access token 発行
 * - GET|POST /auth/validate : Bearer トークンの検証結果を返す (ゲートの exempt 対象、自前で検証する)
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, header},
};

use crate::api::dto::auth::{LoginRequest, LoginResponse, ValidateResponse};
use crate::error::AppError;
use crate::middleware::auth::policy::{BearerParse, parse_bearer};
use crate::services::auth::VerifyToken;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = body.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let issued = state.auth.login(&req.username, &req.password)?;

    Ok(Json(LoginResponse {
        access_token: issued.access_token,
        token_type: "bearer",
        expires_in: issued.expires_in,
    }))
}

pub async fn validate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ValidateResponse>, AppError> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::TokenRejected("Missing Authorization header"))?;

    let token = match parse_bearer(auth) {
        BearerParse::Token(t) => t,
        BearerParse::WrongScheme => {
            return Err(AppError::TokenRejected("Invalid authorization scheme"));
        }
    };

    let verified = state
        .auth
        .verify(token)
        .ok_or(AppError::TokenRejected("Invalid or expired token"))?;

    if verified.subject.is_empty() {
        return Err(AppError::TokenRejected("Invalid token payload"));
    }

    Ok(Json(ValidateResponse {
        valid: true,
        user: verified.subject,
    }))
}
