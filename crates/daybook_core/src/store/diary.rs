//! Diary edit slice.

use super::hooks::SliceHandle;
use super::slice::{deserialize_present, Module, Slice, SliceAction};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub type DiaryAction = SliceAction<DiaryState>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryState {
    pub title: String,
    pub content: String,
    pub date: Option<NaiveDate>,
    pub mood: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DiaryField {
    Title(String),
    Content(String),
    Date(Option<NaiveDate>),
    Mood(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiaryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
}

impl Slice for DiaryState {
    type Field = DiaryField;
    type Patch = DiaryPatch;

    const MODULE: Module = Module::Diary;

    fn initial<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            date: Some(now.date_naive()),
            mood: String::new(),
        }
    }

    fn write(&mut self, field: DiaryField, _now: DateTime<Utc>) {
        match field {
            DiaryField::Title(value) => self.title = value,
            DiaryField::Content(value) => self.content = value,
            DiaryField::Date(value) => self.date = value,
            DiaryField::Mood(value) => self.mood = value,
        }
    }

    fn merged(base: &Self, patch: DiaryPatch) -> Self {
        Self {
            title: patch.title.unwrap_or_else(|| base.title.clone()),
            content: patch.content.unwrap_or_else(|| base.content.clone()),
            date: patch.date.unwrap_or(base.date),
            mood: patch.mood.unwrap_or_else(|| base.mood.clone()),
        }
    }

    fn field_name(field: &DiaryField) -> &'static str {
        match field {
            DiaryField::Title(_) => "title",
            DiaryField::Content(_) => "content",
            DiaryField::Date(_) => "date",
            DiaryField::Mood(_) => "mood",
        }
    }
}

impl SliceHandle<'_, DiaryState> {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_field(DiaryField::Title(title.into()));
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.set_field(DiaryField::Content(content.into()));
    }

    pub fn set_date(&mut self, date: Option<NaiveDate>) {
        self.set_field(DiaryField::Date(date));
    }

    pub fn set_mood(&mut self, mood: impl Into<String>) {
        self.set_field(DiaryField::Mood(mood.into()));
    }
}
