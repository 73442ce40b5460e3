//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the document-store contract used by services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod document_repo;
