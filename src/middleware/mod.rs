/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: リクエスト単位の認証ゲート (policy + axum middleware)
 * - cors / http: transport 寄りの横断的関心事
 */
pub mod auth;
pub mod cors;
pub mod http;
