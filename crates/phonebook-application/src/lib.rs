pub mod app;
pub mod records;
pub mod router;
pub mod session_manager;
pub mod store;

#[cfg(test)]
mod test_support;

pub use app::PhonebookApp;
pub use records::{RecordsState, RecordsSynchronizer};
pub use router::Router;
pub use session_manager::SessionManager;
pub use store::Store;
