//! HTTP shell tests: drive the axum router directly with `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use harness_portal::flags::{FlagSet, ADMIN_UI};
use harness_portal::identity::{SessionStore, SESSION_KEY};
use harness_portal::server::{router, AppState};
use harness_portal::storage::{KeyValueStore, MemoryStore};

struct Shell {
    app: Router,
    kv: Arc<MemoryStore>,
}

fn shell_with_flags(flags: FlagSet) -> Shell {
    let kv = Arc::new(MemoryStore::new());
    let store = SessionStore::open(kv.clone());
    Shell { app: router(AppState::new(store, flags)), kv }
}

fn shell() -> Shell { shell_with_flags(FlagSet::new()) }

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Option<String>, String) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let location = resp.headers().get(header::LOCATION).map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, location, String::from_utf8_lossy(&bytes).into_owned())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn unauthenticated_navigation_goes_to_login() {
    let s = shell();
    let (status, loc, _) = send(&s.app, get("/")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc.as_deref(), Some("/login"));

    let (status, loc, _) = send(&s.app, get("/dashboard")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc.as_deref(), Some("/login"));

    let (status, _, body) = send(&s.app, get("/login")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Welcome Back"));
    assert!(body.contains("Sign In"));
}

#[tokio::test]
async fn form_login_then_dashboard_then_logout() {
    let s = shell();
    let (status, loc, _) = send(&s.app, post_form("/login", "username=admin&password=admin")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc.as_deref(), Some("/dashboard"));
    assert!(s.kv.get(SESSION_KEY).unwrap().is_some());

    let (status, _, body) = send(&s.app, get("/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Dashboard Overview"));
    assert!(body.contains("Administrator"));
    assert!(body.contains("1,247"));

    // signed-in sessions never see the login page
    let (_, loc, _) = send(&s.app, get("/login")).await;
    assert_eq!(loc.as_deref(), Some("/dashboard"));
    let (_, loc, _) = send(&s.app, get("/")).await;
    assert_eq!(loc.as_deref(), Some("/dashboard"));

    let (status, loc, _) = send(&s.app, post_empty("/logout")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc.as_deref(), Some("/login"));
    assert_eq!(s.kv.get(SESSION_KEY).unwrap(), None);

    let (_, loc, _) = send(&s.app, get("/dashboard")).await;
    assert_eq!(loc.as_deref(), Some("/login"));
}

#[tokio::test]
async fn username_is_trimmed_before_check() {
    let s = shell();
    let (_, loc, _) = send(&s.app, post_form("/login", "username=%20admin%20&password=admin")).await;
    assert_eq!(loc.as_deref(), Some("/dashboard"));
}

#[tokio::test]
async fn bad_credentials_show_generic_message() {
    let s = shell();
    let (status, loc, body) = send(&s.app, post_form("/login", "username=admin&password=nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(loc.is_none());
    assert!(body.contains("Invalid credentials"));
    assert!(body.contains("value=\"admin\""));
    assert_eq!(s.kv.get(SESSION_KEY).unwrap(), None);

    let (_, loc, _) = send(&s.app, get("/dashboard")).await;
    assert_eq!(loc.as_deref(), Some("/login"));
}

#[tokio::test]
async fn blank_fields_are_a_validation_error() {
    let s = shell();
    let (status, _, body) = send(&s.app, post_form("/login", "username=%20%20&password=admin")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Please enter both username and password"));

    let (status, _, _) = send(&s.app, post_form("/login", "username=admin")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(s.kv.is_empty());
}

#[tokio::test]
async fn restored_session_is_honoured_on_first_request() {
    let kv = Arc::new(MemoryStore::new());
    kv.set(SESSION_KEY, r#"{"username":"admin","role":"Administrator"}"#).unwrap();
    let app = router(AppState::new(SessionStore::open(kv), FlagSet::new()));
    let (status, _, body) = send(&app, get("/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Dashboard Overview"));
}

#[tokio::test]
async fn corrupt_record_at_startup_is_guarded_and_removed() {
    for raw in [r#"["admin","Administrator"]"#, "{not json", r#"{"username":"  ","role":"Administrator"}"#] {
        let kv = Arc::new(MemoryStore::new());
        kv.set(SESSION_KEY, raw).unwrap();
        let app = router(AppState::new(SessionStore::open(kv.clone()), FlagSet::new()));
        let (status, loc, _) = send(&app, get("/dashboard")).await;
        assert_eq!(status, StatusCode::SEE_OTHER, "{raw}");
        assert_eq!(loc.as_deref(), Some("/login"), "{raw}");
        assert_eq!(kv.get(SESSION_KEY).unwrap(), None, "{raw}");
    }
}

#[tokio::test]
async fn held_session_lock_fails_closed() {
    let kv = Arc::new(MemoryStore::new());
    kv.set(SESSION_KEY, r#"{"username":"admin","role":"Administrator"}"#).unwrap();
    let state = AppState::new(SessionStore::open(kv), FlagSet::new()).with_lock_timeout(Duration::from_millis(50));
    let app = router(state.clone());

    let held = state.session.lock();
    let (status, loc, _) = send(&app, get("/dashboard")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc.as_deref(), Some("/login"));

    let (status, _, body) = send(&app, post_form("/login", "username=admin&password=admin")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["code"], "session_busy");

    let (status, _, _) = send(&app, post_empty("/logout")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    drop(held);

    let (status, _, _) = send(&app, get("/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_flag_from_config_and_query() {
    let mut flags = FlagSet::new();
    flags.set(ADMIN_UI, true);
    let s = shell_with_flags(flags);
    let (_, _, body) = send(&s.app, get("/login")).await;
    assert!(body.contains("Admin Portal"));
    let (_, _, body) = send(&s.app, get("/login?adminUI=false")).await;
    assert!(body.contains("Welcome Back"));

    let plain = shell();
    send(&plain.app, post_form("/login", "username=admin&password=admin")).await;
    let (_, _, body) = send(&plain.app, get("/dashboard")).await;
    assert!(!body.contains("Admin Controls"));
    let (_, _, body) = send(&plain.app, get("/dashboard?adminUI=true")).await;
    assert!(body.contains("Admin Controls"));
}

#[tokio::test]
async fn json_api_login_session_logout() {
    let s = shell();
    let (status, _, body) = send(&s.app, get("/api/session")).await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v, serde_json::json!({"identity": null, "isAuthenticated": false}));

    let (status, _, body) = send(&s.app, get("/api/dashboard")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["code"], "unauthenticated");

    let (status, _, body) = send(&s.app, post_json("/api/login", serde_json::json!({"username": "x", "password": "y"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["code"], "invalid_credentials");

    let (status, _, body) = send(&s.app, post_json("/api/login", serde_json::json!({"username": "", "password": "y"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["type"], "user_input");

    let bad_body = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"username\": "))
        .unwrap();
    let (status, _, body) = send(&s.app, bad_body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["status"], "error");
    assert_eq!(v["code"], "invalid_body");

    let (status, _, body) = send(&s.app, post_json("/api/login", serde_json::json!({"username": "admin", "password": "admin"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<serde_json::Value>(&body).unwrap()["status"], "ok");

    let (_, _, body) = send(&s.app, get("/api/session")).await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["isAuthenticated"], true);
    assert_eq!(v["identity"]["role"], "Administrator");

    let (status, _, body) = send(&s.app, get("/api/dashboard")).await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["metrics"]["uptime"], 99.8);

    let (status, _, _) = send(&s.app, post_empty("/api/logout")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send(&s.app, post_empty("/api/logout")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, _, body) = send(&s.app, get("/api/session")).await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["isAuthenticated"], false);
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let s = shell();
    let (status, _, body) = send(&s.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "portal ok");

    let (status, _, body) = send(&s.app, get("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("/nowhere"));

    let (status, loc, _) = send(&s.app, get("/login/")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(loc.as_deref(), Some("/login"));
}
