//! Edit-item provider: one scoped state container per edit screen.
//!
//! # Responsibility
//! - Own one root-state cell, its reducer and its clock.
//! - Expose `state`, `dispatch` and the action creators to the edit flow.
//!
//! # Invariants
//! - No state is shared between contexts; two open edit flows never observe
//!   each other's writes.
//! - Every transition happens synchronously inside `dispatch`.

use super::alarm::AlarmState;
use super::countdown::CountdownState;
use super::diary::DiaryState;
use super::hooks::SliceHandle;
use super::root::{RootAction, RootPatch, RootReducer, RootSlice, RootState};
use super::slice::SliceAction;
use super::task::TaskState;
use crate::clock::Clock;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Debug)]
pub struct EditItemContext {
    reducer: RootReducer,
    state: RootState,
}

impl EditItemContext {
    /// Mounts a context with every slice at its default.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_initial_state(clock, RootPatch::default())
    }

    /// Mounts a context with the slices in `patch` replacing their defaults.
    pub fn with_initial_state(clock: Arc<dyn Clock>, patch: RootPatch) -> Self {
        let reducer = RootReducer::new(clock);
        let state = reducer.initial_state_with(patch);
        Self { reducer, state }
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    /// Applies one action to the owned state.
    pub fn dispatch(&mut self, action: impl Into<RootAction>) {
        let action = action.into();
        let module = action.module().map(|module| module.as_str());
        match module {
            Some(slice) => debug!(
                "event=store_dispatch module=store status=ok slice={} action={} field={}",
                slice,
                action.kind(),
                action.field_name().unwrap_or("-")
            ),
            None => warn!("event=store_dispatch module=store status=ignored reason=unknown_module"),
        }
        self.state = self.reducer.reduce(&self.state, action);
    }

    pub fn actions(&self) -> Actions {
        Actions
    }

    /// Instant read from this context's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.reducer.clock().now()
    }

    pub fn task(&mut self) -> SliceHandle<'_, TaskState> {
        SliceHandle::new(self)
    }

    pub fn countdown(&mut self) -> SliceHandle<'_, CountdownState> {
        SliceHandle::new(self)
    }

    pub fn diary(&mut self) -> SliceHandle<'_, DiaryState> {
        SliceHandle::new(self)
    }

    pub fn alarm(&mut self) -> SliceHandle<'_, AlarmState> {
        SliceHandle::new(self)
    }
}

/// Action creators grouped by module, producing routable root actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions;

impl Actions {
    pub fn task(&self) -> ModuleActions<TaskState> {
        ModuleActions::default()
    }

    pub fn countdown(&self) -> ModuleActions<CountdownState> {
        ModuleActions::default()
    }

    pub fn diary(&self) -> ModuleActions<DiaryState> {
        ModuleActions::default()
    }

    pub fn alarm(&self) -> ModuleActions<AlarmState> {
        ModuleActions::default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ModuleActions<S>(PhantomData<S>);

impl<S> Default for ModuleActions<S> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<S: RootSlice> ModuleActions<S> {
    pub fn set_field(&self, field: S::Field) -> RootAction {
        S::lift(SliceAction::SetField(field))
    }

    pub fn reset(&self) -> RootAction {
        S::lift(SliceAction::Reset)
    }

    pub fn initialize(&self, patch: S::Patch) -> RootAction {
        S::lift(SliceAction::Initialize(patch))
    }
}
