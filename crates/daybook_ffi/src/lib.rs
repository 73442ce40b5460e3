//! Flutter-facing bindings for Daybook core.

pub mod api;
