//! Recording mock of the phonebook API.

use async_trait::async_trait;
use phonebook_core::api::PhonebookApi;
use phonebook_core::auth::{BearerAuth, Credentials, TokenResponse};
use phonebook_core::error::{PhonebookError, Result};
use phonebook_core::filter::ListQuery;
use phonebook_core::page::{RecordsPage, ResponseMeta};
use phonebook_core::record::{Record, RecordId};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    SignIn { email: String },
    Refresh { token: String },
    List { token: String, query: ListQuery },
    Create { token: String, record: Record },
    Update { token: String, id: RecordId },
    Delete { token: String, id: RecordId },
}

pub struct MockApi {
    calls: Mutex<Vec<ApiCall>>,
    sign_in: Mutex<Result<TokenResponse>>,
    refresh: Mutex<Result<TokenResponse>>,
    /// One-shot refresh responses, used before `refresh`.
    queued_refreshes: Mutex<VecDeque<(Duration, Result<TokenResponse>)>>,
    list: Mutex<Result<RecordsPage>>,
    /// One-shot list responses, used before `list`.
    queued_lists: Mutex<VecDeque<(Duration, Result<RecordsPage>)>>,
    write: Mutex<Result<()>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            sign_in: Mutex::new(Ok(TokenResponse::with_token("abc"))),
            refresh: Mutex::new(Ok(TokenResponse::with_token("rotated"))),
            queued_refreshes: Mutex::new(VecDeque::new()),
            list: Mutex::new(Ok(page(0, 10, 10))),
            queued_lists: Mutex::new(VecDeque::new()),
            write: Mutex::new(Ok(())),
        }
    }

    pub fn set_sign_in(&self, response: Result<TokenResponse>) {
        *self.sign_in.lock().unwrap() = response;
    }

    pub fn set_refresh(&self, response: Result<TokenResponse>) {
        *self.refresh.lock().unwrap() = response;
    }

    pub fn queue_refresh(&self, delay: Duration, response: Result<TokenResponse>) {
        self.queued_refreshes
            .lock()
            .unwrap()
            .push_back((delay, response));
    }

    pub fn set_list(&self, response: Result<RecordsPage>) {
        *self.list.lock().unwrap() = response;
    }

    pub fn queue_list(&self, delay: Duration, response: Result<RecordsPage>) {
        self.queued_lists.lock().unwrap().push_back((delay, response));
    }

    pub fn set_write(&self, response: Result<()>) {
        *self.write.lock().unwrap() = response;
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> Vec<ListQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                ApiCall::List { query, .. } => Some(query),
                _ => None,
            })
            .collect()
    }

    pub fn refresh_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ApiCall::Refresh { .. }))
            .count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

/// A page of `count` records out of `total`, `page_size` per page.
pub fn page(total: u64, page_size: u64, count: usize) -> RecordsPage {
    RecordsPage {
        items: (0..count)
            .map(|i| {
                Record::new()
                    .with_id(i as RecordId + 1)
                    .with_field("f", format!("Contact {i}"))
            })
            .collect(),
        meta: ResponseMeta {
            total_count: total,
            page_size,
        },
    }
}

pub fn query_value<'a>(query: &'a ListQuery, key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub fn unauthorized() -> PhonebookError {
    PhonebookError::server(401, "Unauthorized")
}

#[async_trait]
impl PhonebookApi for MockApi {
    async fn sign_in(&self, credentials: &Credentials) -> Result<TokenResponse> {
        self.record(ApiCall::SignIn {
            email: credentials.email.clone(),
        });
        self.sign_in.lock().unwrap().clone()
    }

    async fn refresh(&self, auth: &BearerAuth) -> Result<TokenResponse> {
        self.record(ApiCall::Refresh {
            token: auth.token().to_string(),
        });
        let queued = self.queued_refreshes.lock().unwrap().pop_front();
        match queued {
            Some((delay, response)) => {
                tokio::time::sleep(delay).await;
                response
            }
            None => self.refresh.lock().unwrap().clone(),
        }
    }

    async fn list_records(&self, auth: &BearerAuth, query: &ListQuery) -> Result<RecordsPage> {
        self.record(ApiCall::List {
            token: auth.token().to_string(),
            query: query.clone(),
        });
        let queued = self.queued_lists.lock().unwrap().pop_front();
        match queued {
            Some((delay, response)) => {
                tokio::time::sleep(delay).await;
                response
            }
            None => self.list.lock().unwrap().clone(),
        }
    }

    async fn create_record(&self, auth: &BearerAuth, record: &Record) -> Result<()> {
        self.record(ApiCall::Create {
            token: auth.token().to_string(),
            record: record.clone(),
        });
        self.write.lock().unwrap().clone()
    }

    async fn update_record(
        &self,
        auth: &BearerAuth,
        id: RecordId,
        _record: &Record,
    ) -> Result<()> {
        self.record(ApiCall::Update {
            token: auth.token().to_string(),
            id,
        });
        self.write.lock().unwrap().clone()
    }

    async fn delete_record(&self, auth: &BearerAuth, id: RecordId) -> Result<()> {
        self.record(ApiCall::Delete {
            token: auth.token().to_string(),
            id,
        });
        self.write.lock().unwrap().clone()
    }
}
