//! Item records for the productivity domain.
//!
//! # Responsibility
//! - Define the persisted task/countdown/diary/alarm shapes consumed by the
//!   edit store at seed time and produced by it at save time.
//!
//! # Invariants
//! - Every item is identified by a stable `ItemId`.
//! - Records carry no edit-session state; sessions live in `store`.

pub mod item;
