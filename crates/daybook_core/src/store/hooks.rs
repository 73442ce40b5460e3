//! Per-module accessors over an edit context.
//!
//! A `SliceHandle` projects one module's slice out of the root state and
//! turns setter calls into dispatched actions. Field-specific setters live
//! next to each module's state definition.

use super::context::EditItemContext;
use super::root::RootSlice;
use super::slice::SliceAction;
use std::marker::PhantomData;
use std::ops::Deref;

/// Borrowed view of one slice plus its setters.
///
/// Derefs to the live slice, so `handle.title` reads the current value.
pub struct SliceHandle<'ctx, S: RootSlice> {
    ctx: &'ctx mut EditItemContext,
    _slice: PhantomData<S>,
}

impl<'ctx, S: RootSlice> SliceHandle<'ctx, S> {
    pub(crate) fn new(ctx: &'ctx mut EditItemContext) -> Self {
        Self {
            ctx,
            _slice: PhantomData,
        }
    }

    /// Current slice value.
    pub fn state(&self) -> &S {
        S::select(self.ctx.state()).as_ref()
    }

    /// Generic single-field write; the field enum fixes the value type.
    pub fn set_field(&mut self, field: S::Field) {
        self.ctx.dispatch(S::lift(SliceAction::SetField(field)));
    }

    /// Returns the slice to the provider's default.
    pub fn reset(&mut self) {
        self.ctx.dispatch(S::lift(SliceAction::Reset));
    }

    /// Replaces the slice with `default` overlaid by `patch`.
    pub fn initialize(&mut self, patch: S::Patch) {
        self.ctx.dispatch(S::lift(SliceAction::Initialize(patch)));
    }
}

impl<S: RootSlice> Deref for SliceHandle<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.state()
    }
}
