//! Root state composition and module routing.
//!
//! # Responsibility
//! - Combine the four module slices into one root record.
//! - Route each action to the reducer named by its module tag.
//!
//! # Invariants
//! - Root state holds exactly the four slices; nothing else.
//! - Reducing a module action replaces only that module's `Arc`; the three
//!   siblings keep their identity.
//! - `RootAction::Unrecognized` returns the input state with all four
//!   identities intact.

use super::alarm::{AlarmAction, AlarmState};
use super::countdown::{CountdownAction, CountdownState};
use super::diary::{DiaryAction, DiaryState};
use super::slice::{Module, Slice, SliceAction, SliceReducer};
use super::task::{TaskAction, TaskState};
use crate::clock::Clock;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootState {
    pub task: Arc<TaskState>,
    pub countdown: Arc<CountdownState>,
    pub diary: Arc<DiaryState>,
    pub alarm: Arc<AlarmState>,
}

impl RootState {
    /// Whether `self` and `other` hold the very same allocation for `module`.
    pub fn shares_slice(&self, other: &RootState, module: Module) -> bool {
        match module {
            Module::Task => Arc::ptr_eq(&self.task, &other.task),
            Module::Countdown => Arc::ptr_eq(&self.countdown, &other.countdown),
            Module::Diary => Arc::ptr_eq(&self.diary, &other.diary),
            Module::Alarm => Arc::ptr_eq(&self.alarm, &other.alarm),
        }
    }
}

/// Whole slices to mount instead of their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootPatch {
    pub task: Option<TaskState>,
    pub countdown: Option<CountdownState>,
    pub diary: Option<DiaryState>,
    pub alarm: Option<AlarmState>,
}

/// Any module action, tagged with the module that owns it.
///
/// Wire shape is `{"module": <tag>, "action": <slice action>}`. An unknown
/// module tag decodes to `Unrecognized` without looking at `action`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "module", content = "action", rename_all = "snake_case")]
pub enum RootAction {
    Task(TaskAction),
    Countdown(CountdownAction),
    Diary(DiaryAction),
    Alarm(AlarmAction),
    /// Module tag unknown to this build; always a no-op.
    Unrecognized,
}

#[derive(Deserialize)]
struct WireRootAction {
    module: String,
    #[serde(default)]
    action: Value,
}

impl<'de> Deserialize<'de> for RootAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireRootAction::deserialize(deserializer)?;
        let action = wire.action;
        let decoded = match wire.module.as_str() {
            "task" => serde_json::from_value(action).map(Self::Task),
            "countdown" => serde_json::from_value(action).map(Self::Countdown),
            "diary" => serde_json::from_value(action).map(Self::Diary),
            "alarm" => serde_json::from_value(action).map(Self::Alarm),
            _ => Ok(Self::Unrecognized),
        };
        decoded.map_err(D::Error::custom)
    }
}

impl RootAction {
    pub fn module(&self) -> Option<Module> {
        match self {
            Self::Task(_) => Some(Module::Task),
            Self::Countdown(_) => Some(Module::Countdown),
            Self::Diary(_) => Some(Module::Diary),
            Self::Alarm(_) => Some(Module::Alarm),
            Self::Unrecognized => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Task(action) => action.kind(),
            Self::Countdown(action) => action.kind(),
            Self::Diary(action) => action.kind(),
            Self::Alarm(action) => action.kind(),
            Self::Unrecognized => "unrecognized",
        }
    }

    pub fn field_name(&self) -> Option<&'static str> {
        match self {
            Self::Task(action) => action.field_name(),
            Self::Countdown(action) => action.field_name(),
            Self::Diary(action) => action.field_name(),
            Self::Alarm(action) => action.field_name(),
            Self::Unrecognized => None,
        }
    }
}

/// A slice that can be projected out of, and routed into, the root.
pub trait RootSlice: Slice {
    fn select(root: &RootState) -> &Arc<Self>;
    fn lift(action: SliceAction<Self>) -> RootAction;
}

impl RootSlice for TaskState {
    fn select(root: &RootState) -> &Arc<Self> {
        &root.task
    }

    fn lift(action: TaskAction) -> RootAction {
        RootAction::Task(action)
    }
}

impl RootSlice for CountdownState {
    fn select(root: &RootState) -> &Arc<Self> {
        &root.countdown
    }

    fn lift(action: CountdownAction) -> RootAction {
        RootAction::Countdown(action)
    }
}

impl RootSlice for DiaryState {
    fn select(root: &RootState) -> &Arc<Self> {
        &root.diary
    }

    fn lift(action: DiaryAction) -> RootAction {
        RootAction::Diary(action)
    }
}

impl RootSlice for AlarmState {
    fn select(root: &RootState) -> &Arc<Self> {
        &root.alarm
    }

    fn lift(action: AlarmAction) -> RootAction {
        RootAction::Alarm(action)
    }
}

impl<S: RootSlice> From<SliceAction<S>> for RootAction {
    fn from(action: SliceAction<S>) -> Self {
        S::lift(action)
    }
}

/// Routes root actions to the four module reducers.
///
/// Defaults are captured once from the clock's local view at construction,
/// so every `Reset` within one provider returns the same value.
#[derive(Debug, Clone)]
pub struct RootReducer {
    clock: Arc<dyn Clock>,
    task: SliceReducer<TaskState>,
    countdown: SliceReducer<CountdownState>,
    diary: SliceReducer<DiaryState>,
    alarm: SliceReducer<AlarmState>,
}

impl RootReducer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now_local();
        Self {
            task: SliceReducer::new(TaskState::initial(now)),
            countdown: SliceReducer::new(CountdownState::initial(now)),
            diary: SliceReducer::new(DiaryState::initial(now)),
            alarm: SliceReducer::new(AlarmState::initial(now)),
            clock,
        }
    }

    /// Root state with every slice at its default.
    pub fn initial_state(&self) -> RootState {
        RootState {
            task: Arc::clone(self.task.initial()),
            countdown: Arc::clone(self.countdown.initial()),
            diary: Arc::clone(self.diary.initial()),
            alarm: Arc::clone(self.alarm.initial()),
        }
    }

    /// Default root state with the slices present in `patch` swapped in.
    pub fn initial_state_with(&self, patch: RootPatch) -> RootState {
        let defaults = self.initial_state();
        RootState {
            task: patch.task.map(Arc::new).unwrap_or(defaults.task),
            countdown: patch.countdown.map(Arc::new).unwrap_or(defaults.countdown),
            diary: patch.diary.map(Arc::new).unwrap_or(defaults.diary),
            alarm: patch.alarm.map(Arc::new).unwrap_or(defaults.alarm),
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Computes the next root state. Pure apart from reading the clock.
    pub fn reduce(&self, state: &RootState, action: RootAction) -> RootState {
        match action {
            RootAction::Task(action) => RootState {
                task: self.task.reduce(&state.task, action, self.clock.now()),
                ..state.clone()
            },
            RootAction::Countdown(action) => RootState {
                countdown: self
                    .countdown
                    .reduce(&state.countdown, action, self.clock.now()),
                ..state.clone()
            },
            RootAction::Diary(action) => RootState {
                diary: self.diary.reduce(&state.diary, action, self.clock.now()),
                ..state.clone()
            },
            RootAction::Alarm(action) => RootState {
                alarm: self.alarm.reduce(&state.alarm, action, self.clock.now()),
                ..state.clone()
            },
            RootAction::Unrecognized => state.clone(),
        }
    }
}
