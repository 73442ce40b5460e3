//! Per-day task completion tracking.
//!
//! # Responsibility
//! - Record, remove and query task completion logs for one user.
//! - Join tasks with their completion state for a given day.
//!
//! # Invariants
//! - At most one log exists per task per day; re-marking overwrites it.
//! - "Today" is the local calendar date of the injected clock.
//! - Query results are ordered by date, newest first.

use crate::clock::Clock;
use crate::model::item::{completion_log_id, ItemId, TaskCompletionLog, TaskWithStatus};
use crate::repo::document_repo::{
    decode_document, user_collection, DocumentKey, DocumentStore, RepoError, RepoResult,
};
use crate::service::item_service::ItemService;
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeSet;
use std::sync::Arc;

const COMPLETION_COLLECTION: &str = "task_completion_logs";

pub struct CompletionService<R: DocumentStore> {
    repo: R,
    clock: Arc<dyn Clock>,
    user_id: String,
}

impl<R: DocumentStore> CompletionService<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>, user_id: impl Into<String>) -> Self {
        Self {
            repo,
            clock,
            user_id: user_id.into(),
        }
    }

    /// Marks `task_id` done on `date` (default today).
    pub fn mark_task_completed(
        &self,
        task_id: ItemId,
        date: Option<NaiveDate>,
        value: Option<f64>,
        note: Option<String>,
    ) -> RepoResult<TaskCompletionLog> {
        let now = self.clock.now();
        let date = date.unwrap_or_else(|| self.today());
        let log = TaskCompletionLog {
            id: completion_log_id(task_id, date),
            task_id,
            user_id: Some(self.user_id.clone()),
            date,
            completed_at: Some(now),
            value,
            note,
        };
        self.repo
            .put(&self.key(log.id.as_str()), &serde_json::to_value(&log)?)?;
        info!("event=task_complete module=service status=ok task_id={task_id} date={date}");
        Ok(log)
    }

    /// Removes the log for `task_id` on `date` (default today).
    ///
    /// Returns whether a log was removed; unmarking an unmarked task is not an error.
    pub fn unmark_task_completed(
        &self,
        task_id: ItemId,
        date: Option<NaiveDate>,
    ) -> RepoResult<bool> {
        let date = date.unwrap_or_else(|| self.today());
        match self.repo.delete(&self.key(&completion_log_id(task_id, date))) {
            Ok(()) => {
                info!(
                    "event=task_uncomplete module=service status=ok task_id={task_id} date={date}"
                );
                Ok(true)
            }
            Err(RepoError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Ids of tasks completed on `date` (default today).
    pub fn completed_task_ids(&self, date: Option<NaiveDate>) -> RepoResult<BTreeSet<ItemId>> {
        let date = date.unwrap_or_else(|| self.today());
        Ok(self
            .all_logs()?
            .into_iter()
            .filter(|log| log.date == date)
            .map(|log| log.task_id)
            .collect())
    }

    /// Every task of this user with its completion flag for `date`.
    pub fn tasks_with_status<T: DocumentStore>(
        &self,
        items: &ItemService<T>,
        date: Option<NaiveDate>,
    ) -> RepoResult<Vec<TaskWithStatus>> {
        let completed = self.completed_task_ids(date)?;
        Ok(items
            .list_tasks()?
            .into_iter()
            .map(|task| TaskWithStatus {
                completed_today: completed.contains(&task.id),
                task,
            })
            .collect())
    }

    /// Logs of one task, newest first, at most `limit` when non-zero.
    pub fn task_completion_logs(
        &self,
        task_id: ItemId,
        limit: Option<usize>,
    ) -> RepoResult<Vec<TaskCompletionLog>> {
        let mut logs: Vec<_> = self
            .all_logs()?
            .into_iter()
            .filter(|log| log.task_id == task_id)
            .collect();
        sort_newest_first(&mut logs);
        if let Some(limit) = limit.filter(|limit| *limit > 0) {
            logs.truncate(limit);
        }
        Ok(logs)
    }

    /// Logs dated within `start..=end`, newest first.
    pub fn completion_logs_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<TaskCompletionLog>> {
        let mut logs: Vec<_> = self
            .all_logs()?
            .into_iter()
            .filter(|log| (start..=end).contains(&log.date))
            .collect();
        sort_newest_first(&mut logs);
        Ok(logs)
    }

    fn today(&self) -> NaiveDate {
        self.clock.now_local().date_naive()
    }

    fn collection(&self) -> String {
        user_collection(&self.user_id, COMPLETION_COLLECTION)
    }

    fn key(&self, id: &str) -> DocumentKey {
        DocumentKey::new(self.collection(), id)
    }

    fn all_logs(&self) -> RepoResult<Vec<TaskCompletionLog>> {
        let collection = self.collection();
        self.repo
            .list(&collection)?
            .into_iter()
            .map(|(id, body)| decode_document(&DocumentKey::new(collection.as_str(), id), body))
            .collect()
    }
}

fn sort_newest_first(logs: &mut [TaskCompletionLog]) {
    logs.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
}
