//! Item records handed to and from the document store.
//!
//! # Responsibility
//! - Define the persisted shape of tasks, countdowns, diary entries and
//!   alarms, plus the per-day task completion log.
//! - Validate wire-format fields before they reach persistence.
//!
//! # Invariants
//! - `id` is stable for the lifetime of an item and never reused.
//! - `Alarm::time` is always `HH:MM` (24h) once validated.
//! - `Alarm::repeat_days` entries are weekday numbers `0..=6`, 0 = Sunday.
//! - Completion log ids are `<task_id>_<YYYY-MM-DD>`, one per task per day.

use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static ALARM_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid alarm time regex"));

/// Stable identifier for every persisted item.
pub type ItemId = Uuid;

/// Highest weekday number accepted in alarm repeat lists (Saturday).
pub const MAX_WEEKDAY: u8 = 6;

/// Kind of item an edit flow operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Task,
    Countdown,
    Diary,
    Alarm,
}

impl ItemType {
    /// Stable lowercase label used in logs and wire payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Countdown => "countdown",
            Self::Diary => "diary",
            Self::Alarm => "alarm",
        }
    }

    /// Document-store collection name for this kind.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Task => "tasks",
            Self::Countdown => "countdowns",
            Self::Diary => "diaries",
            Self::Alarm => "alarms",
        }
    }

    /// Parses a wire label (`task|countdown|diary|alarm`), case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "task" => Some(Self::Task),
            "countdown" => Some(Self::Countdown),
            "diary" => Some(Self::Diary),
            "alarm" => Some(Self::Alarm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    #[default]
    Personal,
    Work,
    Health,
    Study,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskRecurrence {
    #[default]
    Once,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Direction a countdown counts relative to its target date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownMode {
    /// Elapsed time since the target date.
    Countup,
    /// Remaining time until the target date.
    #[default]
    Countdown,
}

/// Persisted task / to-do item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: ItemId,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: TaskCategory,
    pub recurrence: TaskRecurrence,
    /// `None` means the task has no due date.
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    pub id: ItemId,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_date: DateTime<Utc>,
    pub mode: CountdownMode,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diary {
    pub id: ItemId,
    pub user_id: String,
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    pub mood: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: ItemId,
    pub user_id: String,
    pub title: String,
    /// Time of day in `HH:MM`.
    pub time: String,
    /// `None` means a one-shot alarm.
    pub repeat_days: Option<Vec<u8>>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default = "default_true")]
    pub vibrate: bool,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Alarm {
    /// Validates wire-format fields.
    ///
    /// # Errors
    /// - `InvalidAlarmTime` when `time` is not `HH:MM`.
    /// - `InvalidRepeatDay` when any repeat day is above `MAX_WEEKDAY`.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if !ALARM_TIME_RE.is_match(self.time.as_str()) {
            return Err(ItemValidationError::InvalidAlarmTime(self.time.clone()));
        }
        if let Some(day) = self
            .repeat_days
            .iter()
            .flatten()
            .copied()
            .find(|day| *day > MAX_WEEKDAY)
        {
            return Err(ItemValidationError::InvalidRepeatDay(day));
        }
        Ok(())
    }
}

/// Any persisted item, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ItemRecord {
    Task(Task),
    Countdown(Countdown),
    Diary(Diary),
    Alarm(Alarm),
}

impl ItemRecord {
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Task(_) => ItemType::Task,
            Self::Countdown(_) => ItemType::Countdown,
            Self::Diary(_) => ItemType::Diary,
            Self::Alarm(_) => ItemType::Alarm,
        }
    }

    pub fn id(&self) -> ItemId {
        match self {
            Self::Task(item) => item.id,
            Self::Countdown(item) => item.id,
            Self::Diary(item) => item.id,
            Self::Alarm(item) => item.id,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Self::Task(item) => item.user_id.as_str(),
            Self::Countdown(item) => item.user_id.as_str(),
            Self::Diary(item) => item.user_id.as_str(),
            Self::Alarm(item) => item.user_id.as_str(),
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Task(item) => item.created_at,
            Self::Countdown(item) => item.created_at,
            Self::Diary(item) => item.created_at,
            Self::Alarm(item) => item.created_at,
        }
    }

    /// Decodes an untagged record body of a known kind.
    pub fn from_body(kind: ItemType, body: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            ItemType::Task => Self::Task(serde_json::from_value(body)?),
            ItemType::Countdown => Self::Countdown(serde_json::from_value(body)?),
            ItemType::Diary => Self::Diary(serde_json::from_value(body)?),
            ItemType::Alarm => Self::Alarm(serde_json::from_value(body)?),
        })
    }

    /// Untagged record body, as stored in the kind's collection.
    pub fn to_body(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::Task(item) => serde_json::to_value(item),
            Self::Countdown(item) => serde_json::to_value(item),
            Self::Diary(item) => serde_json::to_value(item),
            Self::Alarm(item) => serde_json::to_value(item),
        }
    }

    /// Validates kind-specific wire fields before persistence.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.id().is_nil() {
            return Err(ItemValidationError::NilId);
        }
        match self {
            Self::Alarm(alarm) => alarm.validate(),
            _ => Ok(()),
        }
    }
}

/// One completion of a task on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompletionLog {
    /// `<task_id>_<YYYY-MM-DD>`.
    pub id: String,
    pub task_id: ItemId,
    pub user_id: Option<String>,
    pub date: NaiveDate,
    pub completed_at: Option<DateTime<Utc>>,
    pub value: Option<f64>,
    pub note: Option<String>,
}

/// Builds the completion document id for one task on one day.
pub fn completion_log_id(task_id: ItemId, date: NaiveDate) -> String {
    format!("{task_id}_{}", date.format("%Y-%m-%d"))
}

/// Task joined with its completion state for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskWithStatus {
    #[serde(flatten)]
    pub task: Task,
    pub completed_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    NilId,
    InvalidAlarmTime(String),
    InvalidRepeatDay(u8),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "item id must not be nil"),
            Self::InvalidAlarmTime(value) => {
                write!(f, "alarm time must be HH:MM, got `{value}`")
            }
            Self::InvalidRepeatDay(day) => {
                write!(f, "repeat day {day} is out of range 0..={MAX_WEEKDAY}")
            }
        }
    }
}

impl Error for ItemValidationError {}

#[cfg(test)]
mod tests {
    use super::{completion_log_id, Alarm, ItemRecord, ItemType, ItemValidationError};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    fn alarm(time: &str, repeat_days: Option<Vec<u8>>) -> Alarm {
        Alarm {
            id: Uuid::new_v4(),
            user_id: "user-1".to_string(),
            title: "wake up".to_string(),
            time: time.to_string(),
            repeat_days,
            is_enabled: true,
            vibrate: true,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn item_type_parse_accepts_known_labels() {
        assert_eq!(ItemType::parse(" Diary "), Some(ItemType::Diary));
        assert_eq!(ItemType::parse("reminder"), None);
        assert_eq!(ItemType::Countdown.collection(), "countdowns");
    }

    #[test]
    fn alarm_validate_checks_time_and_days() {
        assert!(alarm("07:05", Some(vec![1, 3, 5])).validate().is_ok());
        assert_eq!(
            alarm("7:05", None).validate().unwrap_err(),
            ItemValidationError::InvalidAlarmTime("7:05".to_string())
        );
        assert_eq!(
            alarm("24:00", None).validate().unwrap_err(),
            ItemValidationError::InvalidAlarmTime("24:00".to_string())
        );
        assert_eq!(
            alarm("23:59", Some(vec![0, 7])).validate().unwrap_err(),
            ItemValidationError::InvalidRepeatDay(7)
        );
    }

    #[test]
    fn record_body_omits_kind_tag() {
        let record = ItemRecord::Alarm(alarm("06:30", None));
        let body = record.to_body().unwrap();
        assert!(body.get("type").is_none());
        assert_eq!(body["time"], "06:30");

        let decoded = ItemRecord::from_body(ItemType::Alarm, body.clone()).unwrap();
        assert_eq!(decoded, record);
        assert!(ItemRecord::from_body(ItemType::Diary, body).is_err());
    }

    #[test]
    fn completion_log_id_joins_task_and_day() {
        let task_id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        assert_eq!(
            completion_log_id(task_id, date),
            "11111111-2222-4333-8444-555555555555_2026-02-03"
        );
    }
}
