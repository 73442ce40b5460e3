//! Task edit slice.
//!
//! # Invariants
//! - Writing `no_due_date = true` clears `due_date` in the same transition.
//! - Writing `no_due_date = false` keeps an existing `due_date`, or restores
//!   it to "now" when it was cleared.
//! - The rule above applies to every `NoDueDate` write; there is no path that
//!   sets the flag without it.

use super::hooks::SliceHandle;
use super::slice::{deserialize_present, Module, Slice, SliceAction};
use crate::model::item::{TaskCategory, TaskRecurrence};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

pub type TaskAction = SliceAction<TaskState>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub title: String,
    pub description: String,
    pub category: TaskCategory,
    pub recurrence: TaskRecurrence,
    pub due_date: Option<DateTime<Utc>>,
    pub no_due_date: bool,
    pub reminder: bool,
}

/// Typed task field writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum TaskField {
    Title(String),
    Description(String),
    Category(TaskCategory),
    Recurrence(TaskRecurrence),
    DueDate(Option<DateTime<Utc>>),
    NoDueDate(bool),
    Reminder(bool),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TaskCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<TaskRecurrence>,
    #[serde(
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_due_date: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder: Option<bool>,
}

impl Slice for TaskState {
    type Field = TaskField;
    type Patch = TaskPatch;

    const MODULE: Module = Module::Task;

    fn initial<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: TaskCategory::Personal,
            recurrence: TaskRecurrence::Once,
            due_date: Some(now.with_timezone(&Utc)),
            no_due_date: false,
            reminder: false,
        }
    }

    fn write(&mut self, field: TaskField, now: DateTime<Utc>) {
        match field {
            TaskField::Title(value) => self.title = value,
            TaskField::Description(value) => self.description = value,
            TaskField::Category(value) => self.category = value,
            TaskField::Recurrence(value) => self.recurrence = value,
            TaskField::DueDate(value) => self.due_date = value,
            TaskField::NoDueDate(value) => {
                self.no_due_date = value;
                self.due_date = if value {
                    None
                } else {
                    Some(self.due_date.unwrap_or(now))
                };
            }
            TaskField::Reminder(value) => self.reminder = value,
        }
    }

    fn merged(base: &Self, patch: TaskPatch) -> Self {
        Self {
            title: patch.title.unwrap_or_else(|| base.title.clone()),
            description: patch
                .description
                .unwrap_or_else(|| base.description.clone()),
            category: patch.category.unwrap_or(base.category),
            recurrence: patch.recurrence.unwrap_or(base.recurrence),
            due_date: patch.due_date.unwrap_or(base.due_date),
            no_due_date: patch.no_due_date.unwrap_or(base.no_due_date),
            reminder: patch.reminder.unwrap_or(base.reminder),
        }
    }

    fn field_name(field: &TaskField) -> &'static str {
        match field {
            TaskField::Title(_) => "title",
            TaskField::Description(_) => "description",
            TaskField::Category(_) => "category",
            TaskField::Recurrence(_) => "recurrence",
            TaskField::DueDate(_) => "due_date",
            TaskField::NoDueDate(_) => "no_due_date",
            TaskField::Reminder(_) => "reminder",
        }
    }
}

impl SliceHandle<'_, TaskState> {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_field(TaskField::Title(title.into()));
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.set_field(TaskField::Description(description.into()));
    }

    pub fn set_category(&mut self, category: TaskCategory) {
        self.set_field(TaskField::Category(category));
    }

    pub fn set_recurrence(&mut self, recurrence: TaskRecurrence) {
        self.set_field(TaskField::Recurrence(recurrence));
    }

    pub fn set_due_date(&mut self, due_date: Option<DateTime<Utc>>) {
        self.set_field(TaskField::DueDate(due_date));
    }

    pub fn set_no_due_date(&mut self, no_due_date: bool) {
        self.set_field(TaskField::NoDueDate(no_due_date));
    }

    pub fn set_reminder(&mut self, reminder: bool) {
        self.set_field(TaskField::Reminder(reminder));
    }
}
