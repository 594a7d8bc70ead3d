//! Session manager: login, logout and periodic token refresh.

use crate::records::RecordsSynchronizer;
use crate::router::Router;
use crate::store::Store;
use phonebook_core::api::PhonebookApi;
use phonebook_core::auth::{Credentials, TokenResponse};
use phonebook_core::config::SessionPolicy;
use phonebook_core::error::{PhonebookError, Result};
use phonebook_core::filter::FilterSet;
use phonebook_core::route::Route;
use phonebook_core::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Owns the session token and its refresh timer.
///
/// State machine: Anonymous -> Authenticated only through a successful
/// `login`; Authenticated -> Anonymous through `logout` or a failed
/// `refresh_token`.
pub struct SessionManager {
    api: Arc<dyn PhonebookApi>,
    session: Arc<Store<Session>>,
    records: Arc<RecordsSynchronizer>,
    router: Arc<Router>,
    policy: SessionPolicy,
    refresh_interval: Duration,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionManager {
    pub fn new(
        api: Arc<dyn PhonebookApi>,
        session: Arc<Store<Session>>,
        records: Arc<RecordsSynchronizer>,
        router: Arc<Router>,
        policy: SessionPolicy,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            api,
            session,
            records,
            router,
            policy,
            refresh_interval,
            refresh_task: Mutex::new(None),
        }
    }

    pub fn session(&self) -> Session {
        self.session.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read(Session::is_authenticated)
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.session.subscribe()
    }

    /// Signs in and loads the first page of records.
    ///
    /// Any failure is logged with its cause and reported to the caller as
    /// [`PhonebookError::InvalidCredentials`]. The finalization step
    /// navigates to `/` even after a failure unless
    /// `SessionPolicy::navigate_after_failed_login` is off.
    pub async fn login(self: &Arc<Self>, email: &str, password: &str) -> Result<()> {
        let credentials = Credentials::new(email, password);
        self.session.update(|s| s.loading = true);

        let result = match self.request_token(&credentials).await {
            Ok(token) => {
                self.session.update(|s| s.authenticate(token));
                tracing::info!("[SessionManager] Logged in as {}", credentials.email);
                self.start_refresh_timer().await;
                if let Err(e) = self.records.fetch_all_records(FilterSet::new()).await {
                    tracing::warn!("[SessionManager] Initial records load failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                match &e {
                    PhonebookError::Server { status, body } => {
                        tracing::error!("[SessionManager] Login failed: {} {}", status, body)
                    }
                    other => tracing::error!("[SessionManager] Login failed: {}", other),
                }
                Err(PhonebookError::InvalidCredentials)
            }
        };

        self.session.update(|s| s.loading = false);
        if result.is_ok() || self.policy.navigate_after_failed_login {
            self.router.push(Route::Layout);
        }
        result
    }

    /// Drops the token and returns to `/login`.
    ///
    /// The refresh timer keeps running unless
    /// `SessionPolicy::stop_refresh_on_logout` is on.
    pub async fn logout(&self) {
        self.session.update(Session::clear);
        tracing::info!("[SessionManager] Logged out");
        if self.policy.stop_refresh_on_logout {
            self.stop_refresh_timer().await;
        }
        self.router.push(Route::Login);
    }

    /// Exchanges the current token for a new one; any failure logs out.
    ///
    /// The outcome only counts while the session still holds the token the
    /// request was sent with. A response arriving after a logout or a new
    /// login is dropped, so it can neither revive nor end that session.
    pub async fn refresh_token(&self) -> Result<()> {
        let Some(auth) = self.session.read(Session::bearer) else {
            let e = PhonebookError::MissingToken;
            tracing::error!("[SessionManager] Token refresh failed: {}", e);
            self.logout().await;
            return Err(e);
        };

        let outcome = self
            .api
            .refresh(&auth)
            .await
            .and_then(TokenResponse::into_token);

        let mut applied = false;
        self.session.update(|s| {
            if s.token() == Some(auth.token()) {
                applied = true;
                if let Ok(token) = &outcome {
                    s.authenticate(token.clone());
                }
            }
        });
        if !applied {
            tracing::debug!("[SessionManager] Session changed during refresh, response dropped");
            return outcome.map(|_| ());
        }

        match outcome {
            Ok(_) => {
                tracing::debug!("[SessionManager] Token refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::error!("[SessionManager] Token refresh failed: {}", e);
                self.logout().await;
                Err(e)
            }
        }
    }

    /// Whether a refresh timer task is alive.
    pub async fn has_refresh_timer(&self) -> bool {
        self.refresh_task
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    async fn request_token(&self, credentials: &Credentials) -> Result<String> {
        self.api.sign_in(credentials).await?.into_token()
    }

    /// (Re)starts the periodic refresh. The task only holds a weak
    /// reference and ends once the manager is dropped.
    async fn start_refresh_timer(self: &Arc<Self>) {
        let mut slot = self.refresh_task.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        if self.refresh_interval.is_zero() {
            tracing::warn!("[SessionManager] Refresh interval is zero, token refresh disabled");
            return;
        }

        let manager = Arc::downgrade(self);
        let period = self.refresh_interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                // Failures are logged and end the session inside refresh_token.
                let _ = manager.refresh_token().await;
            }
        }));
        tracing::debug!("[SessionManager] Refresh timer started ({:?})", period);
    }

    async fn stop_refresh_timer(&self) {
        if let Some(handle) = self.refresh_task.lock().await.take() {
            handle.abort();
            tracing::debug!("[SessionManager] Refresh timer stopped");
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(handle) = self.refresh_task.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ApiCall, MockApi, page, unauthorized};

    const REFRESH: Duration = Duration::from_secs(300);

    struct Fixture {
        api: Arc<MockApi>,
        records: Arc<RecordsSynchronizer>,
        router: Arc<Router>,
        manager: Arc<SessionManager>,
    }

    fn fixture(policy: SessionPolicy) -> Fixture {
        let api = Arc::new(MockApi::new());
        let session = Arc::new(Store::new(Session::default()));
        let router = Arc::new(Router::new(session.clone()));
        let records = Arc::new(RecordsSynchronizer::new(
            api.clone(),
            session.clone(),
            10,
            Duration::from_millis(2500),
        ));
        let manager = Arc::new(SessionManager::new(
            api.clone(),
            session,
            records.clone(),
            router.clone(),
            policy,
            REFRESH,
        ));
        Fixture {
            api,
            records,
            router,
            manager,
        }
    }

    #[tokio::test]
    async fn test_login_authenticates_and_loads_records() {
        let f = fixture(SessionPolicy::default());
        f.api.set_list(Ok(page(25, 10, 10)));

        f.manager.login("user@mail.kz", "secret").await.unwrap();

        let session = f.manager.session();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("abc"));
        assert!(!session.loading);
        assert_eq!(f.router.current(), Route::Layout);
        assert!(f.manager.has_refresh_timer().await);

        let calls = f.api.calls();
        assert_eq!(
            calls[0],
            ApiCall::SignIn {
                email: "user@mail.kz".into()
            }
        );
        assert!(matches!(&calls[1], ApiCall::List { token, .. } if token == "abc"));
        assert_eq!(f.records.state().total_pages(), 3);
    }

    #[tokio::test]
    async fn test_failed_login_reports_invalid_credentials() {
        let f = fixture(SessionPolicy::default());
        f.api
            .set_sign_in(Err(PhonebookError::network("connection refused")));

        let err = f.manager.login("user@mail.kz", "wrong").await.unwrap_err();

        assert_eq!(err.to_string(), "invalid credentials");
        assert!(!f.manager.is_authenticated());
        assert!(!f.manager.session().loading);
        assert!(!f.manager.has_refresh_timer().await);
        assert_eq!(f.api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_token_in_response_is_invalid_credentials() {
        let f = fixture(SessionPolicy::default());
        f.api.set_sign_in(Ok(TokenResponse::default()));

        let err = f.manager.login("user@mail.kz", "secret").await.unwrap_err();

        assert_eq!(err, PhonebookError::InvalidCredentials);
        assert!(!f.manager.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_login_still_navigates_home_and_is_bounced() {
        let f = fixture(SessionPolicy::default());
        f.api.set_sign_in(Err(unauthorized()));
        let mut routes = f.router.subscribe();

        let _ = f.manager.login("user@mail.kz", "wrong").await;

        assert!(routes.has_changed().unwrap());
        assert_eq!(*routes.borrow_and_update(), Route::Login);
    }

    #[tokio::test]
    async fn test_failed_login_without_navigation_policy() {
        let f = fixture(SessionPolicy {
            navigate_after_failed_login: false,
            ..SessionPolicy::default()
        });
        f.api.set_sign_in(Err(unauthorized()));
        let routes = f.router.subscribe();

        let _ = f.manager.login("user@mail.kz", "wrong").await;

        assert!(!routes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_logout_clears_session_but_keeps_timer() {
        let f = fixture(SessionPolicy::default());
        f.manager.login("user@mail.kz", "secret").await.unwrap();

        f.manager.logout().await;

        assert!(!f.manager.is_authenticated());
        assert_eq!(f.manager.session().token(), None);
        assert_eq!(f.router.current(), Route::Login);
        assert!(f.manager.has_refresh_timer().await);
    }

    #[tokio::test]
    async fn test_logout_stops_timer_when_policy_says_so() {
        let f = fixture(SessionPolicy {
            stop_refresh_on_logout: true,
            ..SessionPolicy::default()
        });
        f.manager.login("user@mail.kz", "secret").await.unwrap();

        f.manager.logout().await;

        assert!(!f.manager.has_refresh_timer().await);
    }

    #[tokio::test]
    async fn test_refresh_rotates_token_for_later_requests() {
        let f = fixture(SessionPolicy::default());
        f.manager.login("user@mail.kz", "secret").await.unwrap();

        f.manager.refresh_token().await.unwrap();
        f.records.resync().await.unwrap();

        assert_eq!(f.manager.session().token(), Some("rotated"));
        let calls = f.api.calls();
        assert!(calls.contains(&ApiCall::Refresh {
            token: "abc".into()
        }));
        assert!(matches!(calls.last(), Some(ApiCall::List { token, .. }) if token == "rotated"));
    }

    #[tokio::test]
    async fn test_refresh_unauthorized_logs_out() {
        let f = fixture(SessionPolicy::default());
        f.manager.login("user@mail.kz", "secret").await.unwrap();
        f.api.set_refresh(Err(unauthorized()));

        let err = f.manager.refresh_token().await.unwrap_err();

        assert!(err.is_unauthorized());
        assert!(!f.manager.is_authenticated());
        assert_eq!(f.router.current(), Route::Login);
    }

    #[tokio::test]
    async fn test_refresh_without_token_logs_out_offline() {
        let f = fixture(SessionPolicy::default());

        let err = f.manager.refresh_token().await.unwrap_err();

        assert_eq!(err, PhonebookError::MissingToken);
        assert!(f.api.calls().is_empty());
        assert_eq!(f.router.current(), Route::Login);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_timer_fires_every_interval() {
        let f = fixture(SessionPolicy::default());
        f.manager.login("user@mail.kz", "secret").await.unwrap();

        tokio::time::sleep(REFRESH - Duration::from_secs(1)).await;
        assert_eq!(f.api.refresh_count(), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(f.api.refresh_count(), 1);

        tokio::time::sleep(REFRESH).await;
        assert_eq!(f.api.refresh_count(), 2);
        assert_eq!(f.manager.session().token(), Some("rotated"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_relogin_restarts_single_timer() {
        let f = fixture(SessionPolicy::default());
        f.manager.login("user@mail.kz", "secret").await.unwrap();
        tokio::time::sleep(Duration::from_secs(200)).await;
        f.manager.login("user@mail.kz", "secret").await.unwrap();

        tokio::time::sleep(Duration::from_secs(150)).await;
        assert_eq!(f.api.refresh_count(), 0);

        tokio::time::sleep(Duration::from_secs(160)).await;
        assert_eq!(f.api.refresh_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_surviving_timer_after_logout_logs_out_again() {
        let f = fixture(SessionPolicy::default());
        f.manager.login("user@mail.kz", "secret").await.unwrap();
        f.manager.logout().await;
        let calls_before = f.api.calls().len();

        tokio::time::sleep(REFRESH + Duration::from_secs(1)).await;

        assert_eq!(f.api.calls().len(), calls_before);
        assert!(!f.manager.is_authenticated());
        assert_eq!(f.router.current(), Route::Login);
        assert!(f.manager.has_refresh_timer().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_in_flight_during_logout_is_dropped() {
        let f = fixture(SessionPolicy::default());
        f.manager.login("user@mail.kz", "secret").await.unwrap();
        f.api.queue_refresh(
            Duration::from_millis(100),
            Ok(TokenResponse::with_token("rotated")),
        );

        let manager = f.manager.clone();
        let handle = tokio::spawn(async move { manager.refresh_token().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        f.manager.logout().await;
        handle.await.unwrap().unwrap();

        assert!(!f.manager.is_authenticated());
        assert_eq!(f.manager.session().token(), None);
        assert_eq!(f.router.current(), Route::Login);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_for_replaced_token_keeps_new_session() {
        let f = fixture(SessionPolicy::default());
        f.manager.login("user@mail.kz", "secret").await.unwrap();
        f.api.queue_refresh(Duration::from_millis(100), Err(unauthorized()));

        let manager = f.manager.clone();
        let handle = tokio::spawn(async move { manager.refresh_token().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        f.api.set_sign_in(Ok(TokenResponse::with_token("second")));
        f.manager.login("user@mail.kz", "secret").await.unwrap();

        assert!(handle.await.unwrap().unwrap_err().is_unauthorized());
        assert!(f.manager.is_authenticated());
        assert_eq!(f.manager.session().token(), Some("second"));
        assert_eq!(f.router.current(), Route::Layout);
    }
}
