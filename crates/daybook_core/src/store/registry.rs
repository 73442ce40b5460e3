//! Registry of open edit contexts addressed by session id.
//!
//! # Responsibility
//! - Let an outer shell (FFI, CLI) hold several independent edit contexts
//!   and address them by opaque id.
//! - Decode wire actions before they reach a context.
//!
//! # Invariants
//! - Using an id that was never opened, or was already closed, is a usage
//!   error (`MissingProvider`) and never falls back to a default state.
//! - Undecodable actions (`InvalidAction`) leave the target state untouched.

use super::context::EditItemContext;
use super::root::{RootAction, RootState};
use log::{info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque handle naming one open edit context.
pub type SessionId = Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Slice access without an open provider for this session id.
    MissingProvider(SessionId),
    /// Wire action could not be decoded into a typed action.
    InvalidAction(serde_json::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingProvider(id) => {
                write!(f, "no edit context is open for session {id}")
            }
            Self::InvalidAction(err) => write!(f, "invalid store action: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingProvider(_) => None,
            Self::InvalidAction(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidAction(value)
    }
}

/// Decodes one wire action (`{"module": .., "action": {"type": .., ..}}`).
///
/// Unknown module tags and unknown action kinds decode to no-op variants;
/// unknown field names or mistyped values are rejected.
pub fn decode_action(json: &str) -> StoreResult<RootAction> {
    serde_json::from_str(json).map_err(|err| {
        warn!(
            "event=store_decode module=store status=error error_code=invalid_action line={} column={}",
            err.line(),
            err.column()
        );
        StoreError::InvalidAction(err)
    })
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, EditItemContext>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a mounted context and returns its new id.
    pub fn open(&mut self, ctx: EditItemContext) -> SessionId {
        let id = Uuid::new_v4();
        self.sessions.insert(id, ctx);
        info!(
            "event=session_open module=store status=ok open_sessions={}",
            self.sessions.len()
        );
        id
    }

    pub fn get(&self, id: SessionId) -> StoreResult<&EditItemContext> {
        self.sessions
            .get(&id)
            .ok_or(StoreError::MissingProvider(id))
    }

    pub fn get_mut(&mut self, id: SessionId) -> StoreResult<&mut EditItemContext> {
        self.sessions
            .get_mut(&id)
            .ok_or(StoreError::MissingProvider(id))
    }

    /// Decodes and dispatches one wire action, returning the new state.
    pub fn dispatch_json(&mut self, id: SessionId, action_json: &str) -> StoreResult<&RootState> {
        let ctx = self.get_mut(id)?;
        let action = decode_action(action_json)?;
        ctx.dispatch(action);
        Ok(ctx.state())
    }

    /// Unmounts a context, discarding its state.
    pub fn close(&mut self, id: SessionId) -> StoreResult<EditItemContext> {
        let ctx = self
            .sessions
            .remove(&id)
            .ok_or(StoreError::MissingProvider(id))?;
        info!(
            "event=session_close module=store status=ok open_sessions={}",
            self.sessions.len()
        );
        Ok(ctx)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
