//! Records synchronizer.
//!
//! Holds the current page of records and keeps it in line with the server
//! by re-fetching the whole page after every write. The local list is never
//! patched.

use crate::store::Store;
use phonebook_core::api::PhonebookApi;
use phonebook_core::auth::BearerAuth;
use phonebook_core::error::{PhonebookError, Result};
use phonebook_core::filter::FilterSet;
use phonebook_core::page::{PageMeta, RecordsPage};
use phonebook_core::record::{Record, RecordId};
use phonebook_core::session::Session;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// Everything the records view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordsState {
    pub records: Vec<Record>,
    pub loading: bool,
    pub error: Option<String>,
    pub page: PageMeta,
    /// Filter set of the last fetch, reused by every resync.
    pub all_filters: FilterSet,
    /// Raised after each write attempt, lowered by a timer.
    pub is_alert: bool,
    /// Sequence number of the newest response applied so far.
    applied_seq: u64,
}

impl RecordsState {
    pub fn new(items_per_page: u64) -> Self {
        Self {
            records: Vec::new(),
            loading: false,
            error: None,
            page: PageMeta::with_items_per_page(items_per_page),
            all_filters: FilterSet::new(),
            is_alert: false,
            applied_seq: 0,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.page.total_pages
    }

    pub fn total_records(&self) -> u64 {
        self.page.total_records
    }

    pub fn items_per_page(&self) -> u64 {
        self.page.items_per_page
    }
}

impl Default for RecordsState {
    fn default() -> Self {
        Self::new(PageMeta::default().items_per_page)
    }
}

pub struct RecordsSynchronizer {
    api: Arc<dyn PhonebookApi>,
    session: Arc<Store<Session>>,
    state: Arc<Store<RecordsState>>,
    /// Sequence number of the newest fetch issued.
    issued: AtomicU64,
    alert_generation: Arc<AtomicU64>,
    alert_duration: Duration,
}

impl RecordsSynchronizer {
    pub fn new(
        api: Arc<dyn PhonebookApi>,
        session: Arc<Store<Session>>,
        items_per_page: u64,
        alert_duration: Duration,
    ) -> Self {
        Self {
            api,
            session,
            state: Arc::new(Store::new(RecordsState::new(items_per_page))),
            issued: AtomicU64::new(0),
            alert_generation: Arc::new(AtomicU64::new(0)),
            alert_duration,
        }
    }

    pub fn state(&self) -> RecordsState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<RecordsState> {
        self.state.subscribe()
    }

    /// Replaces the filter set and loads the matching page.
    ///
    /// Errors are also stored in the state's `error` field; on failure the
    /// previous records stay in place. When fetches overlap, a response
    /// older than one already applied is dropped, and `loading` clears once
    /// the newest fetch has completed.
    pub async fn fetch_all_records(&self, filters: FilterSet) -> Result<()> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let mut per_page = 0;
        self.state.update(|s| {
            s.loading = true;
            s.error = None;
            s.all_filters = filters.clone();
            per_page = s.page.items_per_page;
        });

        let auth = match self.bearer() {
            Ok(auth) => auth,
            Err(e) => {
                tracing::error!("[Records] Fetch records error: {}", e);
                let is_latest = self.is_latest(seq);
                self.state.update(|s| {
                    s.error = Some(e.to_string());
                    if is_latest {
                        s.loading = false;
                    }
                });
                return Err(e);
            }
        };

        let query = filters.to_query(per_page);
        tracing::debug!("[Records] #{} GET records {:?}", seq, query);

        let result = self.api.list_records(&auth, &query).await;
        if let Err(e) = &result {
            tracing::error!("[Records] Fetch records error: {}", e);
        }
        self.apply_response(seq, result)
    }

    /// Re-fetches with the filter set of the last fetch.
    pub async fn resync(&self) -> Result<()> {
        let filters = self.state.read(|s| s.all_filters.clone());
        self.fetch_all_records(filters).await
    }

    pub async fn create_record(&self, record: Record) -> Result<()> {
        let auth = self.require_token()?;
        let result = self.api.create_record(&auth, &record).await;
        self.finish_write("Create", result).await
    }

    /// Sends `record` to `PUT /records/{id}`; the record must carry its id.
    pub async fn update_record(&self, record: Record) -> Result<()> {
        let auth = self.require_token()?;
        let Some(id) = record.id else {
            return Err(self.fail_locally(PhonebookError::MissingRecordId));
        };
        let result = self.api.update_record(&auth, id, &record).await;
        self.finish_write("Update", result).await
    }

    pub async fn delete_record(&self, id: RecordId) -> Result<()> {
        let auth = self.require_token()?;
        let result = self.api.delete_record(&auth, id).await;
        self.finish_write("Delete", result).await
    }

    fn bearer(&self) -> Result<BearerAuth> {
        self.session
            .read(Session::bearer)
            .ok_or(PhonebookError::MissingToken)
    }

    /// Like `bearer`, but records the failure for the view.
    fn require_token(&self) -> Result<BearerAuth> {
        self.bearer().map_err(|e| self.fail_locally(e))
    }

    fn fail_locally(&self, error: PhonebookError) -> PhonebookError {
        tracing::error!("[Records] {}", error);
        let message = error.to_string();
        self.state.update(|s| s.error = Some(message));
        error
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == seq
    }

    fn apply_response(&self, seq: u64, result: Result<RecordsPage>) -> Result<()> {
        let is_latest = self.is_latest(seq);
        let (page, outcome) = match result {
            Ok(page) => (Some(page), Ok(())),
            Err(e) => (None, Err(e)),
        };
        let message = outcome.as_ref().err().map(ToString::to_string);

        let mut stale = false;
        self.state.update(|s| {
            if seq < s.applied_seq {
                stale = true;
            } else {
                s.applied_seq = seq;
                match page {
                    Some(page) => {
                        s.page.apply(&page.meta);
                        s.records = page.items;
                    }
                    None => s.error = message,
                }
            }
            if is_latest {
                s.loading = false;
            }
        });

        if stale {
            tracing::debug!("[Records] #{} arrived after a newer response, dropped", seq);
        }
        outcome
    }

    /// Resyncs after a write attempt, whatever its outcome, then raises the
    /// alert. A write error is stored after the resync so it is not wiped by
    /// the fetch clearing `error`.
    async fn finish_write(&self, action: &str, result: Result<()>) -> Result<()> {
        match &result {
            Ok(()) => tracing::info!("[Records] {} record succeeded", action),
            Err(e) => tracing::error!("[Records] {} record error: {}", action, e),
        }

        if let Err(e) = self.resync().await {
            tracing::warn!("[Records] Resync after {} failed: {}", action, e);
        }

        if let Err(e) = &result {
            let message = e.to_string();
            self.state.update(|s| s.error = Some(message));
        }

        self.raise_alert();
        result
    }

    /// Raises the alert flag and schedules its reset.
    ///
    /// Only the timer of the latest alert lowers the flag.
    fn raise_alert(&self) {
        let generation = self.alert_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.update(|s| s.is_alert = true);

        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.alert_generation);
        let delay = self.alert_duration;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current.load(Ordering::SeqCst) == generation {
                state.update(|s| s.is_alert = false);
            }
        });
    }
}
