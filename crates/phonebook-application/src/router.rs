use crate::store::Store;
use phonebook_core::route::{self, Route};
use phonebook_core::session::Session;
use std::sync::Arc;
use tokio::sync::watch;

/// Two-route router that runs the navigation guard on every push.
pub struct Router {
    session: Arc<Store<Session>>,
    current: Store<Route>,
}

impl Router {
    /// Starts at `/`, which the guard resolves against the current session.
    pub fn new(session: Arc<Store<Session>>) -> Self {
        let initial = route::guard(Route::Layout, session.read(Session::is_authenticated));
        Self {
            session,
            current: Store::new(initial),
        }
    }

    /// Navigates to `target` and returns where navigation actually landed.
    pub fn push(&self, target: Route) -> Route {
        let is_authenticated = self.session.read(Session::is_authenticated);
        let resolved = route::guard(target, is_authenticated);
        if resolved != target {
            tracing::info!(
                "[Router] {} requires auth, redirecting to {}",
                target.path(),
                resolved.path()
            );
        } else {
            tracing::debug!("[Router] -> {}", resolved.path());
        }
        self.current.set(resolved);
        resolved
    }

    pub fn current(&self) -> Route {
        self.current.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}
