//! Edit-flow use cases: seed a provider from a record, commit it back.
//!
//! # Responsibility
//! - Mount one `EditItemContext` per edit screen, pre-filled from an
//!   existing record when editing.
//! - Validate the live slice on save and build the output record.
//!
//! # Invariants
//! - Seeding happens through exactly one `initialize` dispatch.
//! - Commit never mutates the context; a rejected save leaves it editable.
//! - Existing records keep `id`, `user_id`, `created_at` and fields the edit
//!   screen does not own (`completed`, `is_enabled`).

use crate::clock::Clock;
use crate::model::item::{Alarm, Countdown, Diary, ItemRecord, ItemType, Task, MAX_WEEKDAY};
use crate::store::{AlarmPatch, CountdownPatch, DiaryPatch, EditItemContext, TaskPatch};
use chrono::{DateTime, NaiveTime, Utc};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

static REPEAT_DAYS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(,\d+)*$").expect("valid repeat days regex"));

const ALARM_TIME_FORMAT: &str = "%H:%M";

pub type SaveResult<T> = Result<T, SaveError>;

/// Reasons a save is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveError {
    MissingTitle,
    MissingContent,
    MissingDate,
    MissingTime,
    /// Raw picker text that is not a comma list of weekdays `0..=6`.
    InvalidRepeatDays(String),
    KindMismatch {
        expected: ItemType,
        actual: ItemType,
    },
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "title is required"),
            Self::MissingContent => write!(f, "content is required"),
            Self::MissingDate => write!(f, "date is required"),
            Self::MissingTime => write!(f, "time is required"),
            Self::InvalidRepeatDays(raw) => write!(
                f,
                "repeat days must be comma-separated weekdays 0..={MAX_WEEKDAY}, got `{raw}`"
            ),
            Self::KindMismatch { expected, actual } => write!(
                f,
                "edit flow for `{}` cannot use a `{}` record",
                expected.as_str(),
                actual.as_str()
            ),
        }
    }
}

impl Error for SaveError {}

impl SaveError {
    /// Stable machine-readable code for logs and envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingTitle => "missing_title",
            Self::MissingContent => "missing_content",
            Self::MissingDate => "missing_date",
            Self::MissingTime => "missing_time",
            Self::InvalidRepeatDays(_) => "invalid_repeat_days",
            Self::KindMismatch { .. } => "kind_mismatch",
        }
    }
}

/// Edit-flow service for one signed-in user.
#[derive(Debug, Clone)]
pub struct EditService {
    clock: Arc<dyn Clock>,
    user_id: String,
}

impl EditService {
    pub fn new(clock: Arc<dyn Clock>, user_id: impl Into<String>) -> Self {
        Self {
            clock,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Mounts a provider for `kind`, seeded from `existing` when editing.
    ///
    /// # Errors
    /// - `KindMismatch` when `existing` is not a `kind` record.
    pub fn open(
        &self,
        kind: ItemType,
        existing: Option<&ItemRecord>,
    ) -> SaveResult<EditItemContext> {
        let mut ctx = EditItemContext::new(Arc::clone(&self.clock));
        let Some(record) = existing else {
            info!(
                "event=edit_open module=service status=ok kind={} mode=create",
                kind.as_str()
            );
            return Ok(ctx);
        };
        ensure_kind(kind, record)?;

        let now = ctx.now();
        match record {
            ItemRecord::Task(task) => ctx.task().initialize(TaskPatch {
                title: Some(task.title.clone()),
                description: Some(task.description.clone().unwrap_or_default()),
                category: Some(task.category),
                recurrence: Some(task.recurrence),
                due_date: Some(Some(task.due_date.unwrap_or(now))),
                no_due_date: Some(task.due_date.is_none()),
                reminder: Some(false),
            }),
            ItemRecord::Countdown(countdown) => ctx.countdown().initialize(CountdownPatch {
                title: Some(countdown.title.clone()),
                description: Some(countdown.description.clone().unwrap_or_default()),
                target_date: Some(Some(countdown.target_date)),
                mode: Some(countdown.mode),
            }),
            ItemRecord::Diary(diary) => ctx.diary().initialize(DiaryPatch {
                title: Some(diary.title.clone()),
                content: Some(diary.content.clone()),
                date: Some(Some(diary.date)),
                mood: Some(diary.mood.clone().unwrap_or_default()),
            }),
            ItemRecord::Alarm(alarm) => ctx.alarm().initialize(AlarmPatch {
                title: Some(alarm.title.clone()),
                // An unreadable stored time keeps the mount default.
                time: NaiveTime::parse_from_str(&alarm.time, ALARM_TIME_FORMAT)
                    .ok()
                    .map(Some),
                repeat_days: Some(join_repeat_days(alarm.repeat_days.as_deref())),
                vibrate: Some(alarm.vibrate),
            }),
        }

        info!(
            "event=edit_open module=service status=ok kind={} mode=update",
            kind.as_str()
        );
        Ok(ctx)
    }

    /// Builds the record to persist from the live `kind` slice of `ctx`.
    ///
    /// # Errors
    /// - `MissingTitle` when the trimmed title is empty (all kinds).
    /// - `MissingDate` for a countdown without target or a diary without date.
    /// - `MissingContent` for a diary with blank content.
    /// - `MissingTime` / `InvalidRepeatDays` for alarms.
    /// - `KindMismatch` when `existing` is not a `kind` record.
    pub fn commit(
        &self,
        ctx: &EditItemContext,
        kind: ItemType,
        existing: Option<&ItemRecord>,
    ) -> SaveResult<ItemRecord> {
        let result = self.build_record(ctx, kind, existing);
        let mode = if existing.is_some() { "update" } else { "create" };
        match &result {
            Ok(record) => info!(
                "event=edit_commit module=service status=ok kind={} mode={mode} item_id={}",
                kind.as_str(),
                record.id()
            ),
            Err(err) => warn!(
                "event=edit_commit module=service status=rejected kind={} mode={mode} error_code={}",
                kind.as_str(),
                err.code()
            ),
        }
        result
    }

    fn build_record(
        &self,
        ctx: &EditItemContext,
        kind: ItemType,
        existing: Option<&ItemRecord>,
    ) -> SaveResult<ItemRecord> {
        if let Some(record) = existing {
            ensure_kind(kind, record)?;
        }
        let identity = match existing {
            Some(record) => Identity {
                id: record.id(),
                user_id: record.user_id().to_string(),
                created_at: record.created_at(),
            },
            None => Identity {
                id: Uuid::new_v4(),
                user_id: self.user_id.clone(),
                created_at: self.clock.now(),
            },
        };
        let state = ctx.state();

        let record = match kind {
            ItemType::Task => {
                let task = &state.task;
                let title = required_title(&task.title)?;
                let completed = match existing {
                    Some(ItemRecord::Task(previous)) => previous.completed,
                    _ => false,
                };
                ItemRecord::Task(Task {
                    id: identity.id,
                    user_id: identity.user_id,
                    title,
                    description: optional_text(&task.description),
                    category: task.category,
                    recurrence: task.recurrence,
                    due_date: if task.no_due_date { None } else { task.due_date },
                    completed,
                    created_at: identity.created_at,
                })
            }
            ItemType::Countdown => {
                let countdown = &state.countdown;
                let title = required_title(&countdown.title)?;
                let target_date = countdown.target_date.ok_or(SaveError::MissingDate)?;
                ItemRecord::Countdown(Countdown {
                    id: identity.id,
                    user_id: identity.user_id,
                    title,
                    description: optional_text(&countdown.description),
                    target_date,
                    mode: countdown.mode,
                    created_at: identity.created_at,
                })
            }
            ItemType::Diary => {
                let diary = &state.diary;
                let title = required_title(&diary.title)?;
                let content = diary.content.trim();
                if content.is_empty() {
                    return Err(SaveError::MissingContent);
                }
                let date = diary.date.ok_or(SaveError::MissingDate)?;
                ItemRecord::Diary(Diary {
                    id: identity.id,
                    user_id: identity.user_id,
                    date,
                    title,
                    content: content.to_string(),
                    mood: optional_text(&diary.mood),
                    created_at: identity.created_at,
                })
            }
            ItemType::Alarm => {
                let alarm = &state.alarm;
                let title = required_title(&alarm.title)?;
                let time = alarm.time.ok_or(SaveError::MissingTime)?;
                let is_enabled = match existing {
                    Some(ItemRecord::Alarm(previous)) => previous.is_enabled,
                    _ => true,
                };
                ItemRecord::Alarm(Alarm {
                    id: identity.id,
                    user_id: identity.user_id,
                    title,
                    time: time.format(ALARM_TIME_FORMAT).to_string(),
                    repeat_days: parse_repeat_days(&alarm.repeat_days)?,
                    is_enabled,
                    vibrate: alarm.vibrate,
                    created_at: identity.created_at,
                })
            }
        };
        Ok(record)
    }
}

struct Identity {
    id: Uuid,
    user_id: String,
    created_at: DateTime<Utc>,
}

fn ensure_kind(expected: ItemType, record: &ItemRecord) -> SaveResult<()> {
    let actual = record.item_type();
    if actual != expected {
        return Err(SaveError::KindMismatch { expected, actual });
    }
    Ok(())
}

fn required_title(raw: &str) -> SaveResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SaveError::MissingTitle);
    }
    Ok(trimmed.to_string())
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parses the picker's comma list; blank means a one-shot alarm.
pub fn parse_repeat_days(raw: &str) -> SaveResult<Option<Vec<u8>>> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return Ok(None);
    }
    if !REPEAT_DAYS_RE.is_match(&compact) {
        return Err(SaveError::InvalidRepeatDays(raw.to_string()));
    }

    compact
        .split(',')
        .map(|part| {
            part.parse::<u8>()
                .ok()
                .filter(|day| *day <= MAX_WEEKDAY)
                .ok_or_else(|| SaveError::InvalidRepeatDays(raw.to_string()))
        })
        .collect::<SaveResult<Vec<_>>>()
        .map(Some)
}

/// Inverse of `parse_repeat_days` for seeding the picker.
pub fn join_repeat_days(days: Option<&[u8]>) -> String {
    days.unwrap_or_default()
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
