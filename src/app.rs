/*
 * Responsibility
 * - Config読み込み → 依存生成 (認証情報・署名鍵) → Router 組み立て
 * - Middleware の適用 (認証ゲート / HTTP / CORS)
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware::{self, auth::policy::RoutePolicy};
use crate::services::auth::build_token_service;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,admin_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    // Configuration errors are fatal: no traffic is served without a valid gate.
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting admin gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_state(config: &Config) -> Result<AppState> {
    let auth = build_token_service(config)?;
    tracing::info!(
        user = %auth.principal().username,
        ttl_seconds = auth.access_token_ttl_seconds(),
        retired_keys = config.jwt_previous_secrets.len(),
        "admin credentials loaded"
    );
    Ok(AppState::new(auth, RoutePolicy::default()))
}

/// gate → handlers の順。HTTP/CORS はその外側。
fn build_router(state: AppState, config: &Config) -> Router {
    let router = middleware::auth::access::apply(api::routes(), state.clone()).with_state(state);
    let router = middleware::http::apply(router, config);
    middleware::cors::apply(router, config)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::test_support::{self, PASSWORD, USERNAME};

    fn test_config() -> Config {
        Config::from_lookup(|key: &str| match key {
            "JWT_SECRET" => Some("test-signing-secret-0123456789abcdef".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn config_without_cors() -> Config {
        Config::from_lookup(|key: &str| match key {
            "JWT_SECRET" => Some("test-signing-secret-0123456789abcdef".to_string()),
            "CORS_ALLOWED_ORIGINS" => Some(String::new()),
            _ => None,
        })
        .unwrap()
    }

    fn app() -> Router {
        build_router(test_support::state(), &test_config())
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn login_req(username: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": username, "password": password}).to_string(),
            ))
            .unwrap()
    }

    fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut b = Request::builder().uri(uri);
        if let Some(v) = auth {
            b = b.header(header::AUTHORIZATION, v);
        }
        b.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn healthz_is_open() {
        let (status, body) = call(&app(), get("/healthz", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn login_then_validate_then_protected() {
        let app = app();

        let (status, body) = call(&app, login_req(USERNAME, PASSWORD)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["expires_in"], 1800);
        let token = body["access_token"].as_str().unwrap().to_string();
        let bearer = format!("Bearer {token}");

        let (status, body) = call(&app, get("/auth/validate", Some(&bearer))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"valid": true, "user": "alice"}));

        let (status, body) = call(&app, get("/admin/me", Some(&bearer))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["full_name"], "Alice Admin");
        assert_eq!(body["is_superuser"], true);
    }

    #[tokio::test]
    async fn wrong_password_gets_no_token_and_protected_stays_closed() {
        let app = app();

        let (status, body) = call(&app, login_req(USERNAME, "wrong")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Invalid credentials"}));

        let (status, body) = call(&app, login_req("mallory", PASSWORD)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Invalid credentials"}));

        let (status, body) = call(&app, get("/admin/me", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Unauthorized"}));
    }

    #[tokio::test]
    async fn malformed_login_body_is_a_bad_request() {
        let req = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"username\":"))
            .unwrap();

        let (status, body) = call(&app(), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn validate_reports_each_failure() {
        let app = app();

        let (status, body) = call(&app, get("/auth/validate", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Missing Authorization header");

        let (status, body) = call(&app, get("/auth/validate", Some("Basic YWxpY2U6cHc="))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid authorization scheme");

        let (status, body) = call(&app, get("/auth/validate", Some("Bearer garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid or expired token");

        let foreign = format!("Bearer {}", test_support::foreign_token("alice"));
        let (status, body) = call(&app, get("/auth/validate", Some(&foreign))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn admin_shell_is_exempt() {
        let (status, _) = call(&app(), get("/admin", None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let resp = app().oneshot(get("/healthz", None)).await.unwrap();
        assert!(resp.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn cors_preflight_for_allowed_origin() {
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/admin/me")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();

        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("http://localhost:3000")
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .and_then(|v| v.to_str().ok()),
            Some("true")
        );
    }

    #[tokio::test]
    async fn empty_cors_allowlist_emits_no_cors_headers() {
        let app = build_router(test_support::state(), &config_without_cors());

        let preflight = Request::builder()
            .method("OPTIONS")
            .uri("/admin/me")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(preflight).await.unwrap();
        assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

        let simple = Request::builder()
            .uri("/healthz")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(simple).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
        assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_CREDENTIALS));
    }
}
