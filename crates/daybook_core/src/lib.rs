//! Core domain logic for Daybook.
//! This crate is the single source of truth for edit-flow state and item
//! invariants.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{
    Alarm, Countdown, CountdownMode, Diary, ItemId, ItemRecord, ItemType, ItemValidationError,
    Task, TaskCategory, TaskCompletionLog, TaskRecurrence, TaskWithStatus,
};
pub use repo::document_repo::{
    DocumentKey, DocumentStore, RepoError, RepoResult, SqliteDocumentStore,
};
pub use service::completion_service::CompletionService;
pub use service::edit_service::{EditService, SaveError, SaveResult};
pub use service::item_service::ItemService;
pub use store::{
    EditItemContext, RootAction, RootPatch, RootState, SessionId, SessionRegistry, StoreError,
    StoreResult,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
