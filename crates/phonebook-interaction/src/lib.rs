//! Remote interaction with the phonebook service.

pub mod http_api;

pub use http_api::HttpPhonebookApi;
