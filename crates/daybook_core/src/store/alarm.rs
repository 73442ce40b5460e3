//! Alarm edit slice.
//!
//! `repeat_days` is kept as the raw comma list the picker edits
//! (`"1,3,5"`); it is parsed into weekday numbers only at save time.

use super::hooks::SliceHandle;
use super::slice::{deserialize_present, Module, Slice, SliceAction};
use chrono::{DateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub type AlarmAction = SliceAction<AlarmState>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmState {
    pub title: String,
    pub time: Option<NaiveTime>,
    pub repeat_days: String,
    pub vibrate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum AlarmField {
    Title(String),
    Time(Option<NaiveTime>),
    RepeatDays(String),
    Vibrate(bool),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<Option<NaiveTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_days: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibrate: Option<bool>,
}

impl Slice for AlarmState {
    type Field = AlarmField;
    type Patch = AlarmPatch;

    const MODULE: Module = Module::Alarm;

    fn initial<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        Self {
            title: String::new(),
            // Minute precision: the picker and the persisted `HH:MM` have no seconds.
            time: NaiveTime::from_hms_opt(now.hour(), now.minute(), 0),
            repeat_days: String::new(),
            vibrate: true,
        }
    }

    fn write(&mut self, field: AlarmField, _now: DateTime<Utc>) {
        match field {
            AlarmField::Title(value) => self.title = value,
            AlarmField::Time(value) => self.time = value,
            AlarmField::RepeatDays(value) => self.repeat_days = value,
            AlarmField::Vibrate(value) => self.vibrate = value,
        }
    }

    fn merged(base: &Self, patch: AlarmPatch) -> Self {
        Self {
            title: patch.title.unwrap_or_else(|| base.title.clone()),
            time: patch.time.unwrap_or(base.time),
            repeat_days: patch
                .repeat_days
                .unwrap_or_else(|| base.repeat_days.clone()),
            vibrate: patch.vibrate.unwrap_or(base.vibrate),
        }
    }

    fn field_name(field: &AlarmField) -> &'static str {
        match field {
            AlarmField::Title(_) => "title",
            AlarmField::Time(_) => "time",
            AlarmField::RepeatDays(_) => "repeat_days",
            AlarmField::Vibrate(_) => "vibrate",
        }
    }
}

impl SliceHandle<'_, AlarmState> {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_field(AlarmField::Title(title.into()));
    }

    pub fn set_time(&mut self, time: Option<NaiveTime>) {
        self.set_field(AlarmField::Time(time));
    }

    pub fn set_repeat_days(&mut self, repeat_days: impl Into<String>) {
        self.set_field(AlarmField::RepeatDays(repeat_days.into()));
    }

    pub fn set_vibrate(&mut self, vibrate: bool) {
        self.set_field(AlarmField::Vibrate(vibrate));
    }
}

#[cfg(test)]
mod tests {
    use super::AlarmState;
    use crate::store::slice::Slice;
    use chrono::{NaiveTime, TimeZone, Utc};

    #[test]
    fn initial_time_is_truncated_to_minutes() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 6, 45, 31).unwrap();
        let state = AlarmState::initial(now);
        assert_eq!(state.time, NaiveTime::from_hms_opt(6, 45, 0));
        assert!(state.vibrate);
        assert!(state.repeat_days.is_empty());
    }
}
