//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the edit store and the document repository into use-case
//!   level APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod completion_service;
pub mod edit_service;
pub mod item_service;
