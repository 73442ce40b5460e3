//! Edit-item state container.
//!
//! # Responsibility
//! - Hold the in-progress field values of the create/edit screens for the
//!   four item kinds (task, countdown, diary, alarm).
//! - Route namespaced actions to per-module reducers.
//!
//! # Invariants
//! - Reducers are pure apart from reading the injected clock.
//! - Each context owns its state; nothing is process-global.
//!
//! # See also
//! - `service::edit_service` for seeding from and committing to records.

pub mod alarm;
pub mod context;
pub mod countdown;
pub mod diary;
pub mod hooks;
pub mod registry;
pub mod root;
pub mod slice;
pub mod task;

pub use alarm::{AlarmAction, AlarmField, AlarmPatch, AlarmState};
pub use context::{Actions, EditItemContext, ModuleActions};
pub use countdown::{CountdownAction, CountdownField, CountdownPatch, CountdownState};
pub use diary::{DiaryAction, DiaryField, DiaryPatch, DiaryState};
pub use hooks::SliceHandle;
pub use registry::{decode_action, SessionId, SessionRegistry, StoreError, StoreResult};
pub use root::{RootAction, RootPatch, RootReducer, RootSlice, RootState};
pub use slice::{Module, Slice, SliceAction, SliceReducer};
pub use task::{TaskAction, TaskField, TaskPatch, TaskState};
