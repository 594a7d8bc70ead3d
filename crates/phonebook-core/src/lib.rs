//! Shared shapes for the phonebook client: records, filters, pagination,
//! session state, routes, configuration and the transport trait.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod page;
pub mod record;
pub mod route;
pub mod session;

// Re-export common types
pub use api::PhonebookApi;
pub use auth::{BearerAuth, Credentials, TokenResponse};
pub use config::{ClientConfig, SessionPolicy};
pub use error::{PhonebookError, Result};
pub use filter::{FilterSet, ListQuery};
pub use page::{PageMeta, RecordsPage, ResponseMeta};
pub use record::{Contact, Record, RecordId};
pub use route::Route;
pub use session::Session;
