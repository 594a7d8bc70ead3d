//! Transport abstraction over the phonebook REST API.

use crate::auth::{BearerAuth, Credentials, TokenResponse};
use crate::error::Result;
use crate::filter::ListQuery;
use crate::page::RecordsPage;
use crate::record::{Record, RecordId};
use async_trait::async_trait;

/// One method per remote endpoint.
///
/// Implementations send exactly one request per call and never retry.
/// Every authenticated call takes its credential explicitly; there is no
/// shared default header.
#[async_trait]
pub trait PhonebookApi: Send + Sync {
    /// `POST /auth/signin`
    async fn sign_in(&self, credentials: &Credentials) -> Result<TokenResponse>;

    /// `POST /auth/refresh`
    async fn refresh(&self, auth: &BearerAuth) -> Result<TokenResponse>;

    /// `GET /records`
    async fn list_records(&self, auth: &BearerAuth, query: &ListQuery) -> Result<RecordsPage>;

    /// `POST /records`; the response body is not used.
    async fn create_record(&self, auth: &BearerAuth, record: &Record) -> Result<()>;

    /// `PUT /records/{id}`; the response body is not used.
    async fn update_record(&self, auth: &BearerAuth, id: RecordId, record: &Record)
    -> Result<()>;

    /// `DELETE /records/{id}`
    async fn delete_record(&self, auth: &BearerAuth, id: RecordId) -> Result<()>;
}
