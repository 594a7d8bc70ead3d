use crate::records::{RecordsState, RecordsSynchronizer};
use crate::router::Router;
use crate::session_manager::SessionManager;
use crate::store::Store;
use phonebook_core::api::PhonebookApi;
use phonebook_core::config::ClientConfig;
use phonebook_core::route::Route;
use phonebook_core::session::Session;
use std::sync::Arc;

/// The wired-up client: one session, one router, one records view.
pub struct PhonebookApp {
    session_manager: Arc<SessionManager>,
    records: Arc<RecordsSynchronizer>,
    router: Arc<Router>,
}

impl PhonebookApp {
    pub fn new(api: Arc<dyn PhonebookApi>, config: &ClientConfig) -> Self {
        let session = Arc::new(Store::new(Session::default()));
        let router = Arc::new(Router::new(session.clone()));
        let records = Arc::new(RecordsSynchronizer::new(
            api.clone(),
            session.clone(),
            config.initial_items_per_page,
            config.alert_duration(),
        ));
        let session_manager = Arc::new(SessionManager::new(
            api,
            session,
            records.clone(),
            router.clone(),
            config.session,
            config.refresh_interval(),
        ));

        Self {
            session_manager,
            records,
            router,
        }
    }

    pub fn session_manager(&self) -> &Arc<SessionManager> {
        &self.session_manager
    }

    pub fn records(&self) -> &Arc<RecordsSynchronizer> {
        &self.records
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn session(&self) -> Session {
        self.session_manager.session()
    }

    pub fn records_state(&self) -> RecordsState {
        self.records.state()
    }

    pub fn current_route(&self) -> Route {
        self.router.current()
    }
}
