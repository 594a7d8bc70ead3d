//! Routes and the navigation guard.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    /// `/login`, public.
    Login,
    /// `/`, the records view.
    Layout,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Layout => "/",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Layout => "Layout",
        }
    }

    pub fn requires_auth(self) -> bool {
        matches!(self, Route::Layout)
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/login" => Some(Route::Login),
            "/" => Some(Route::Layout),
            _ => None,
        }
    }
}

/// Decides where a navigation to `target` actually lands.
pub fn guard(target: Route, is_authenticated: bool) -> Route {
    if target.requires_auth() && !is_authenticated {
        Route::Login
    } else {
        target
    }
}
