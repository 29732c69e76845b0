//! Navigation rules of the shell: which view a path renders, or where it redirects,
//! for a given session state. Pure, so the HTTP layer and tests share one table.

use crate::identity::{Decision, RouteGuard, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Login,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(View),
    Redirect(Route),
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
        }
    }

    /// Exact match on the path, ignoring one trailing slash.
    pub fn from_path(path: &str) -> Option<Self> {
        let p = if path.len() > 1 { path.strip_suffix('/').unwrap_or(path) } else { path };
        match p {
            "/" => Some(Route::Root),
            "/login" => Some(Route::Login),
            "/dashboard" => Some(Route::Dashboard),
            _ => None,
        }
    }
}

/// Resolve a route against the current state. `None` stands for a state that could
/// not be read and is handled like an unauthenticated one.
pub fn resolve(route: Route, state: Option<&SessionState>) -> Navigation {
    let decision = RouteGuard::authorize(state);
    match (route, decision) {
        (Route::Root, Decision::Allow) => Navigation::Redirect(Route::Dashboard),
        (Route::Root, Decision::RedirectToLogin) => Navigation::Redirect(Route::Login),
        (Route::Login, Decision::Allow) => Navigation::Redirect(Route::Dashboard),
        (Route::Login, Decision::RedirectToLogin) => Navigation::Render(View::Login),
        (Route::Dashboard, Decision::Allow) => Navigation::Render(View::Dashboard),
        (Route::Dashboard, Decision::RedirectToLogin) => Navigation::Redirect(Route::Login),
    }
}
