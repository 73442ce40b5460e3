//! Item CRUD scoped to one user.
//!
//! # Responsibility
//! - Persist committed records under `users/<uid>/<collection>`.
//! - Decode stored documents back into typed records.
//!
//! # Invariants
//! - Records are validated before every write.
//! - A service never reads or writes another user's collections.

use crate::model::item::{ItemId, ItemRecord, ItemType, Task};
use crate::repo::document_repo::{
    user_collection, DocumentKey, DocumentStore, RepoError, RepoResult,
};
use log::info;
use serde_json::Value;

pub struct ItemService<R: DocumentStore> {
    repo: R,
    user_id: String,
}

impl<R: DocumentStore> ItemService<R> {
    pub fn new(repo: R, user_id: impl Into<String>) -> Self {
        Self {
            repo,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        self.user_id.as_str()
    }

    /// Inserts or replaces one record.
    ///
    /// # Errors
    /// - `Validation` when the record fails `ItemRecord::validate`.
    /// - `InvalidData` when the record belongs to another user.
    pub fn save_item(&self, record: &ItemRecord) -> RepoResult<ItemId> {
        record.validate()?;
        if record.user_id() != self.user_id {
            return Err(RepoError::InvalidData(format!(
                "record {} is owned by another user",
                record.id()
            )));
        }

        let kind = record.item_type();
        self.repo
            .put(&self.key(kind, record.id()), &record.to_body()?)?;
        info!(
            "event=item_save module=service status=ok kind={} item_id={}",
            kind.as_str(),
            record.id()
        );
        Ok(record.id())
    }

    pub fn get_item(&self, kind: ItemType, id: ItemId) -> RepoResult<Option<ItemRecord>> {
        let key = self.key(kind, id);
        self.repo
            .get(&key)?
            .map(|body| decode_record(kind, &key, body))
            .transpose()
    }

    /// Removes one record; `NotFound` when it does not exist.
    pub fn delete_item(&self, kind: ItemType, id: ItemId) -> RepoResult<()> {
        self.repo.delete(&self.key(kind, id))?;
        info!(
            "event=item_delete module=service status=ok kind={} item_id={id}",
            kind.as_str()
        );
        Ok(())
    }

    /// All records of one kind, newest first.
    pub fn list_items(&self, kind: ItemType) -> RepoResult<Vec<ItemRecord>> {
        let collection = user_collection(&self.user_id, kind.collection());
        let mut records = self
            .repo
            .list(&collection)?
            .into_iter()
            .map(|(id, body)| {
                decode_record(kind, &DocumentKey::new(collection.as_str(), id), body)
            })
            .collect::<RepoResult<Vec<_>>>()?;
        records.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(records)
    }

    /// All tasks of this user, newest first.
    pub fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        Ok(self
            .list_items(ItemType::Task)?
            .into_iter()
            .filter_map(|record| match record {
                ItemRecord::Task(task) => Some(task),
                _ => None,
            })
            .collect())
    }

    fn key(&self, kind: ItemType, id: ItemId) -> DocumentKey {
        DocumentKey::new(
            user_collection(&self.user_id, kind.collection()),
            id.to_string(),
        )
    }
}

fn decode_record(kind: ItemType, key: &DocumentKey, body: Value) -> RepoResult<ItemRecord> {
    let record = ItemRecord::from_body(kind, body)
        .map_err(|err| RepoError::InvalidData(format!("`{key}` does not decode: {err}")))?;
    record.validate()?;
    Ok(record)
}
