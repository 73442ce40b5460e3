//! Countdown edit slice.

use super::hooks::SliceHandle;
use super::slice::{deserialize_present, Module, Slice, SliceAction};
use crate::model::item::CountdownMode;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub type CountdownAction = SliceAction<CountdownState>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountdownState {
    pub title: String,
    pub description: String,
    pub target_date: Option<DateTime<Utc>>,
    pub mode: CountdownMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum CountdownField {
    Title(String),
    Description(String),
    TargetDate(Option<DateTime<Utc>>),
    Mode(CountdownMode),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<CountdownMode>,
}

impl Slice for CountdownState {
    type Field = CountdownField;
    type Patch = CountdownPatch;

    const MODULE: Module = Module::Countdown;

    fn initial<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            target_date: Some(now.with_timezone(&Utc)),
            mode: CountdownMode::Countdown,
        }
    }

    fn write(&mut self, field: CountdownField, _now: DateTime<Utc>) {
        match field {
            CountdownField::Title(value) => self.title = value,
            CountdownField::Description(value) => self.description = value,
            CountdownField::TargetDate(value) => self.target_date = value,
            CountdownField::Mode(value) => self.mode = value,
        }
    }

    fn merged(base: &Self, patch: CountdownPatch) -> Self {
        Self {
            title: patch.title.unwrap_or_else(|| base.title.clone()),
            description: patch
                .description
                .unwrap_or_else(|| base.description.clone()),
            target_date: patch.target_date.unwrap_or(base.target_date),
            mode: patch.mode.unwrap_or(base.mode),
        }
    }

    fn field_name(field: &CountdownField) -> &'static str {
        match field {
            CountdownField::Title(_) => "title",
            CountdownField::Description(_) => "description",
            CountdownField::TargetDate(_) => "target_date",
            CountdownField::Mode(_) => "mode",
        }
    }
}

impl SliceHandle<'_, CountdownState> {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_field(CountdownField::Title(title.into()));
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.set_field(CountdownField::Description(description.into()));
    }

    pub fn set_target_date(&mut self, target_date: Option<DateTime<Utc>>) {
        self.set_field(CountdownField::TargetDate(target_date));
    }

    pub fn set_mode(&mut self, mode: CountdownMode) {
        self.set_field(CountdownField::Mode(mode));
    }
}
