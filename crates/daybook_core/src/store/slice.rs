//! Generic slice contract and reducer shared by every edit module.
//!
//! # Responsibility
//! - Define what a module slice must provide (defaults, typed field writes,
//!   partial-merge) so one reducer implementation serves all modules.
//! - Define the per-module action vocabulary.
//!
//! # Invariants
//! - `Reset` returns the reducer's captured default, never a partial record.
//! - `Initialize` returns `default` overlaid with the patch; fields absent
//!   from the patch revert to default, not to the previous state.
//! - `SetField` changes exactly one field, except where a slice's `write`
//!   hook couples fields (task `no_due_date`).
//! - `Unrecognized` returns the input slice with its identity intact.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Namespace tag naming the module an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Task,
    Countdown,
    Diary,
    Alarm,
}

impl Module {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Countdown => "countdown",
            Self::Diary => "diary",
            Self::Alarm => "alarm",
        }
    }
}

/// State shape of one independently reducible module.
pub trait Slice: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// One typed `SET_<FIELD>` write; the variant names the field and carries
    /// a value of that field's type.
    type Field: Clone + Debug + PartialEq + Serialize + DeserializeOwned;
    /// Partial slice used by `Initialize`.
    type Patch: Clone + Debug + PartialEq + Default + Serialize + DeserializeOwned;

    const MODULE: Module;

    /// Total default value. Date fields take `now`; wall-clock fields
    /// (calendar day, time of day) are read in `now`'s own zone.
    fn initial<Tz: TimeZone>(now: DateTime<Tz>) -> Self;

    /// Applies one field write. `now` is available for coupled rules.
    fn write(&mut self, field: Self::Field, now: DateTime<Utc>);

    /// Returns `base` with every field present in `patch` replaced.
    fn merged(base: &Self, patch: Self::Patch) -> Self;

    /// Stable snake_case name of the field a write targets.
    fn field_name(field: &Self::Field) -> &'static str;
}

/// Action vocabulary shared by every module.
///
/// Wire shape is `{"type": <kind>, "payload": <body>}`. Decoding reads the
/// kind first: `reset` ignores any payload, and an unknown kind becomes
/// `Unrecognized` whatever its payload holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
#[serde(bound(serialize = ""))]
pub enum SliceAction<S: Slice> {
    SetField(S::Field),
    Reset,
    Initialize(S::Patch),
    /// Any action kind this build does not know; always a no-op.
    Unrecognized,
}

#[derive(Deserialize)]
struct WireSliceAction {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl<'de, S: Slice> Deserialize<'de> for SliceAction<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireSliceAction::deserialize(deserializer)?;
        match wire.kind.as_str() {
            "set_field" => serde_json::from_value(wire.payload)
                .map(Self::SetField)
                .map_err(D::Error::custom),
            "reset" => Ok(Self::Reset),
            "initialize" if wire.payload.is_null() => Ok(Self::Initialize(S::Patch::default())),
            "initialize" => serde_json::from_value(wire.payload)
                .map(Self::Initialize)
                .map_err(D::Error::custom),
            _ => Ok(Self::Unrecognized),
        }
    }
}

impl<S: Slice> SliceAction<S> {
    pub fn set_field(field: S::Field) -> Self {
        Self::SetField(field)
    }

    pub fn reset() -> Self {
        Self::Reset
    }

    pub fn initialize(patch: S::Patch) -> Self {
        Self::Initialize(patch)
    }

    /// Action kind label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetField(_) => "set_field",
            Self::Reset => "reset",
            Self::Initialize(_) => "initialize",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Target field name for `SetField`, `None` otherwise.
    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            Self::SetField(field) => Some(S::field_name(field)),
            _ => None,
        }
    }
}

/// Pure reducer for one slice, parameterised by its captured default.
#[derive(Debug, Clone)]
pub struct SliceReducer<S: Slice> {
    initial: Arc<S>,
}

impl<S: Slice> SliceReducer<S> {
    pub fn new(initial: S) -> Self {
        Self {
            initial: Arc::new(initial),
        }
    }

    /// Default value returned by `Reset`.
    pub fn initial(&self) -> &Arc<S> {
        &self.initial
    }

    /// Computes the next slice. Never panics; unknown kinds are ignored.
    pub fn reduce(&self, state: &Arc<S>, action: SliceAction<S>, now: DateTime<Utc>) -> Arc<S> {
        match action {
            SliceAction::SetField(field) => {
                let mut next = S::clone(state);
                next.write(field, now);
                Arc::new(next)
            }
            SliceAction::Reset => Arc::clone(&self.initial),
            SliceAction::Initialize(patch) => Arc::new(S::merged(&self.initial, patch)),
            SliceAction::Unrecognized => Arc::clone(state),
        }
    }
}

/// Keeps `null` distinct from an absent key for `Option<Option<T>>` patch
/// fields: absent stays `None` through `#[serde(default)]`, `null` becomes
/// `Some(None)`.
pub(crate) fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
