//! HttpPhonebookApi - reqwest implementation of the phonebook REST API.

use async_trait::async_trait;
use phonebook_core::api::PhonebookApi;
use phonebook_core::auth::{BearerAuth, Credentials, TokenResponse};
use phonebook_core::config::ClientConfig;
use phonebook_core::error::{PhonebookError, Result};
use phonebook_core::filter::ListQuery;
use phonebook_core::page::RecordsPage;
use phonebook_core::record::{Record, RecordId};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Talks to the phonebook service over HTTPS.
#[derive(Clone)]
pub struct HttpPhonebookApi {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpPhonebookApi {
    /// Creates a new client for the given origin.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn record_url(&self, id: RecordId) -> String {
        self.url(&format!("/records/{}", id))
    }

    /// Attaches the bearer credential to a single request.
    fn authorize(&self, request: RequestBuilder, auth: &BearerAuth) -> RequestBuilder {
        request
            .header("Authorization", auth.header_value())
            .timeout(self.timeout)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PhonebookError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("[HttpApi] {} -> {}", status, error_text);
            return Err(PhonebookError::server(status.as_u16(), error_text));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| PhonebookError::network(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl PhonebookApi for HttpPhonebookApi {
    async fn sign_in(&self, credentials: &Credentials) -> Result<TokenResponse> {
        tracing::debug!("[HttpApi] POST /auth/signin for {}", credentials.email);
        let request = self
            .client
            .post(self.url("/auth/signin"))
            .json(credentials)
            .timeout(self.timeout);
        self.send_json(request).await
    }

    async fn refresh(&self, auth: &BearerAuth) -> Result<TokenResponse> {
        tracing::debug!("[HttpApi] POST /auth/refresh");
        let request = self.authorize(self.client.post(self.url("/auth/refresh")), auth);
        self.send_json(request).await
    }

    async fn list_records(&self, auth: &BearerAuth, query: &ListQuery) -> Result<RecordsPage> {
        tracing::debug!("[HttpApi] GET /records {:?}", query);
        let request = self.authorize(self.client.get(self.url("/records")).query(query), auth);
        self.send_json(request).await
    }

    async fn create_record(&self, auth: &BearerAuth, record: &Record) -> Result<()> {
        tracing::debug!("[HttpApi] POST /records");
        let request = self.authorize(self.client.post(self.url("/records")).json(record), auth);
        self.send(request).await.map(|_| ())
    }

    async fn update_record(
        &self,
        auth: &BearerAuth,
        id: RecordId,
        record: &Record,
    ) -> Result<()> {
        tracing::debug!("[HttpApi] PUT /records/{}", id);
        let request = self.authorize(self.client.put(self.record_url(id)).json(record), auth);
        self.send(request).await.map(|_| ())
    }

    async fn delete_record(&self, auth: &BearerAuth, id: RecordId) -> Result<()> {
        tracing::debug!("[HttpApi] DELETE /records/{}", id);
        let request = self.authorize(self.client.delete(self.record_url(id)), auth);
        self.send(request).await.map(|_| ())
    }
}
