//!
//! portal HTTP server
//! ------------------
//! Axum shell around the session store.
//!
//! Responsibilities:
//! - Build the persistence backend and restore the session before the listener binds.
//! - Route `/`, `/login` and `/dashboard` through the navigation rules in `routes`.
//! - Form-based login/logout for the pages, JSON login/logout/session for scripts.
//! - Apply configured and per-request feature flags to page variants.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::PortalConfig;
use crate::dashboard::DashboardData;
use crate::error::{AppError, AppResult};
use crate::flags::{select_variant, FlagSet, ViewKind};
use crate::identity::{Credential, Decision, Identity, RouteGuard, SessionSnapshot, SessionState, SessionStore, INVALID_CREDENTIALS_MSG};
use crate::routes::{self, Navigation, Route, View};
use crate::storage;

pub mod pages;

/// How long a request waits for the session lock before giving up.
pub const SESSION_LOCK_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared server state injected into all handlers.
///
/// One `SessionStore` per shell instance; every operation on it runs to completion
/// under the mutex, so logins and logouts are applied one at a time. Store calls run on
/// the blocking pool and wait at most `lock_timeout` for the mutex.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<SessionStore>>,
    /// Configured flags; requests layer query overrides on top.
    pub flags: Arc<FlagSet>,
    pub dashboard: Arc<DashboardData>,
    lock_timeout: Duration,
}

impl AppState {
    pub fn new(store: SessionStore, flags: FlagSet) -> Self {
        Self {
            session: Arc::new(Mutex::new(store)),
            flags: Arc::new(flags),
            dashboard: Arc::new(DashboardData::sample()),
            lock_timeout: SESSION_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Run `op` against the store on the blocking pool. Errors when the lock cannot be
    /// taken in time or `op` panics.
    async fn with_store<T, F>(&self, op: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SessionStore) -> T + Send + 'static,
    {
        let session = self.session.clone();
        let timeout = self.lock_timeout;
        tokio::task::spawn_blocking(move || -> anyhow::Result<T> {
            let mut guard = session.try_lock_for(timeout).ok_or_else(|| anyhow!("session store busy"))?;
            Ok(op(&mut *guard))
        })
        .await
        .context("session store task failed")?
    }

    async fn read_state(&self) -> anyhow::Result<SessionState> {
        self.with_store(|store| store.state().clone()).await
    }

    /// Guard the protected view; yields the identity the `Allow` was based on.
    async fn authorize(&self) -> Option<Identity> {
        let read = self.read_state().await;
        let mut seen: Option<Identity> = None;
        let decision = RouteGuard::authorize_with(|| {
            let s = read?;
            seen = s.identity().cloned();
            Ok(s)
        });
        match decision {
            Decision::Allow => seen,
            Decision::RedirectToLogin => None,
        }
    }

    async fn navigate(&self, route: Route) -> Navigation {
        let state = self.read_state().await.ok();
        routes::resolve(route, state.as_ref())
    }

    async fn login(&self, cred: Credential) -> AppResult<bool> {
        self.with_store(move |store| store.login(&cred.username, &cred.password)).await.map_err(busy)
    }

    async fn logout(&self) -> AppResult<()> {
        self.with_store(|store| store.logout()).await.map_err(busy)
    }

    fn request_flags(&self, query: &HashMap<String, String>) -> FlagSet {
        self.flags.with_overrides(query)
    }
}

/// Build the router. Exposed for tests, which drive it without a listener.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/login", get(login_page).post(login_submit))
        .route("/dashboard", get(dashboard))
        .route("/logout", post(logout))
        .route("/health", get(|| async { "portal ok" }))
        .route("/api/login", post(api_login))
        .route("/api/logout", post(api_logout))
        .route("/api/session", get(api_session))
        .route("/api/dashboard", get(api_dashboard))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn log_startup(cfg: &PortalConfig) {
    let cwd = std::env::current_dir().ok();
    info!(
        target: "startup",
        "portal starting: addr={}, persistence={}, data_dir={:?}, cwd={:?}, adminUI={}",
        cfg.addr(), cfg.persistence, cfg.data_dir, cwd, cfg.flags.is_enabled(crate::flags::ADMIN_UI)
    );
}

/// Build the store, restore the persisted session, then serve until ctrl-c.
pub async fn run_with_config(cfg: PortalConfig) -> anyhow::Result<()> {
    cfg.validate()?;
    log_startup(&cfg);

    let backend = storage::open_backend(cfg.persistence, &cfg.data_dir)?;
    // Restore completes before the first request can be routed.
    let store = SessionStore::open(backend);
    info!(target: "startup", authenticated = store.state().is_authenticated(), "session restored");

    let app = router(AppState::new(store, cfg.flags.clone()));
    let addr = cfg.addr();
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to install ctrl-c handler: {e}");
        std::future::pending::<()>().await;
    }
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn busy(err: anyhow::Error) -> AppError {
    error!(target: "portal::session", "session store unavailable: {:#}", err);
    AppError::io("session_busy", "Session store is busy, please retry")
}

fn redirect_to(route: Route) -> Response {
    Redirect::to(route.path()).into_response()
}

fn login_response(flags: &FlagSet, status: StatusCode, error: &str, username: &str) -> Response {
    let variant = select_variant(flags, ViewKind::Login);
    match pages::render_login(variant, error, username) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn root(State(state): State<AppState>) -> Response {
    match state.navigate(Route::Root).await {
        Navigation::Redirect(to) => redirect_to(to),
        // "/" never renders on its own
        Navigation::Render(_) => redirect_to(Route::Login),
    }
}

async fn login_page(State(state): State<AppState>, Query(q): Query<HashMap<String, String>>) -> Response {
    match state.navigate(Route::Login).await {
        Navigation::Render(View::Login) => login_response(&state.request_flags(&q), StatusCode::OK, "", ""),
        Navigation::Redirect(to) => redirect_to(to),
        Navigation::Render(View::Dashboard) => redirect_to(Route::Dashboard),
    }
}

async fn login_submit(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
    Form(form): Form<LoginPayload>,
) -> Response {
    let flags = state.request_flags(&q);
    let cred = match Credential::parse(&form.username, &form.password) {
        Ok(c) => c,
        Err(e) => return login_response(&flags, StatusCode::BAD_REQUEST, e.message(), form.username.trim()),
    };
    let username = cred.username.clone();
    match state.login(cred).await {
        Ok(true) => redirect_to(Route::Dashboard),
        Ok(false) => login_response(&flags, StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS_MSG, &username),
        Err(e) => e.into_response(),
    }
}

async fn dashboard(State(state): State<AppState>, Query(q): Query<HashMap<String, String>>) -> Response {
    let Some(identity) = state.authorize().await else {
        return redirect_to(Route::Login);
    };
    let variant = select_variant(&state.request_flags(&q), ViewKind::Dashboard);
    let page = pages::DashboardPage::new(&identity, variant, &state.dashboard);
    match pages::render_dashboard(&page) {
        Ok(html) => Html(html).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn logout(State(state): State<AppState>) -> AppResult<Response> {
    state.logout().await?;
    Ok(redirect_to(Route::Login))
}

async fn api_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> AppResult<Json<serde_json::Value>> {
    let Json(payload) = payload.map_err(|e| AppError::user("invalid_body".to_string(), e.body_text()))?;
    let cred = Credential::parse(&payload.username, &payload.password)?;
    if !state.login(cred).await? {
        return Err(AppError::auth("invalid_credentials", INVALID_CREDENTIALS_MSG));
    }
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn api_logout(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    state.logout().await?;
    Ok(Json(serde_json::json!({"status": "ok"})))
}

async fn api_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let snapshot = state
        .read_state()
        .await
        .map(|s| s.snapshot())
        .unwrap_or_else(|_| SessionState::Unauthenticated.snapshot());
    Json(snapshot)
}

async fn api_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardData>> {
    match state.authorize().await {
        Some(_) => Ok(Json((*state.dashboard).clone())),
        None => Err(AppError::auth("unauthenticated", "Sign in to view the dashboard")),
    }
}

/// Unknown paths are 404s; a shell path with a trailing slash redirects to its canonical form.
async fn not_found(uri: Uri) -> Response {
    match Route::from_path(uri.path()) {
        Some(route) => redirect_to(route),
        None => AppError::not_found("not_found".to_string(), format!("no route for {}", uri.path())).into_response(),
    }
}
