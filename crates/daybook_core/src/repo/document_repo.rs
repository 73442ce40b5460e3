//! Document-store contract and SQLite implementation.
//!
//! # Responsibility
//! - Store JSON documents addressed by `(collection, id)`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `put` is an upsert; the latest body wins.
//! - `list` returns documents in ascending id order.
//! - Read paths reject bodies that are not valid JSON instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::item::ItemValidationError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    Serialization(serde_json::Error),
    NotFound(DocumentKey),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::NotFound(key) => write!(f, "document not found: {key}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Address of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    /// Slash-separated collection path, e.g. `users/u1/tasks`.
    pub collection: String,
    pub id: String,
}

impl DocumentKey {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Collection path owned by one user: `users/<user_id>/<name>`.
pub fn user_collection(user_id: &str, name: &str) -> String {
    format!("users/{user_id}/{name}")
}

/// Decodes a stored body into a typed document.
///
/// # Errors
/// - `InvalidData` when the body does not match `T`.
pub fn decode_document<T: DeserializeOwned>(key: &DocumentKey, body: Value) -> RepoResult<T> {
    serde_json::from_value(body)
        .map_err(|err| RepoError::InvalidData(format!("`{key}` does not decode: {err}")))
}

/// Key/value document persistence.
pub trait DocumentStore {
    fn put(&self, key: &DocumentKey, body: &Value) -> RepoResult<()>;
    fn get(&self, key: &DocumentKey) -> RepoResult<Option<Value>>;
    /// Removes one document; `NotFound` when it does not exist.
    fn delete(&self, key: &DocumentKey) -> RepoResult<()>;
    /// All `(id, body)` pairs of one collection.
    fn list(&self, collection: &str) -> RepoResult<Vec<(String, Value)>>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn put(&self, key: &DocumentKey, body: &Value) -> RepoResult<()> {
        (**self).put(key, body)
    }

    fn get(&self, key: &DocumentKey) -> RepoResult<Option<Value>> {
        (**self).get(key)
    }

    fn delete(&self, key: &DocumentKey) -> RepoResult<()> {
        (**self).delete(key)
    }

    fn list(&self, collection: &str) -> RepoResult<Vec<(String, Value)>> {
        (**self).list(collection)
    }
}

/// SQLite-backed document store over the `documents` table.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Wraps a connection previously returned by `open_db*`.
    ///
    /// # Errors
    /// - `InvalidData` when the connection was not migrated to the latest schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected = latest_version();
        let actual = current_user_version(conn)?;
        if actual != expected {
            return Err(RepoError::InvalidData(format!(
                "connection schema version {actual} does not match expected {expected}"
            )));
        }
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn put(&self, key: &DocumentKey, body: &Value) -> RepoResult<()> {
        let encoded = serde_json::to_string(body)?;
        self.conn.execute(
            "INSERT INTO documents (collection, doc_id, body)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (collection, doc_id) DO UPDATE SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key.collection, key.id, encoded],
        )?;
        Ok(())
    }

    fn get(&self, key: &DocumentKey) -> RepoResult<Option<Value>> {
        let body: Option<String> = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2;",
                params![key.collection, key.id],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|text| parse_body(key, &text)).transpose()
    }

    fn delete(&self, key: &DocumentKey) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
            params![key.collection, key.id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(key.clone()));
        }
        Ok(())
    }

    fn list(&self, collection: &str) -> RepoResult<Vec<(String, Value)>> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, body FROM documents
             WHERE collection = ?1
             ORDER BY doc_id ASC;",
        )?;
        let mut rows = stmt.query([collection])?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let text: String = row.get(1)?;
            let body = parse_body(&DocumentKey::new(collection, id.as_str()), &text)?;
            documents.push((id, body));
        }

        Ok(documents)
    }
}

fn parse_body(key: &DocumentKey, text: &str) -> RepoResult<Value> {
    serde_json::from_str(text)
        .map_err(|err| RepoError::InvalidData(format!("body of `{key}` is not JSON: {err}")))
}

#[cfg(test)]
mod tests {
    use super::{user_collection, DocumentKey, DocumentStore, RepoError, SqliteDocumentStore};
    use crate::db::open_db_in_memory;
    use rusqlite::Connection;
    use serde_json::json;

    #[test]
    fn put_overwrites_existing_body() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let key = DocumentKey::new("users/u1/tasks", "a");

        store.put(&key, &json!({ "title": "first" })).unwrap();
        store.put(&key, &json!({ "title": "second" })).unwrap();

        assert_eq!(store.get(&key).unwrap(), Some(json!({ "title": "second" })));
        assert_eq!(store.list("users/u1/tasks").unwrap().len(), 1);
    }

    #[test]
    fn collections_are_isolated_per_user() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();
        let mine = user_collection("u1", "diaries");
        let theirs = user_collection("u2", "diaries");

        store.put(&DocumentKey::new(mine.as_str(), "b"), &json!(2)).unwrap();
        store.put(&DocumentKey::new(mine.as_str(), "a"), &json!(1)).unwrap();
        store.put(&DocumentKey::new(theirs.as_str(), "c"), &json!(3)).unwrap();

        let ids: Vec<String> = store
            .list(&mine)
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(mine, "users/u1/diaries");
    }

    #[test]
    fn delete_missing_document_is_not_found() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        let err = store
            .delete(&DocumentKey::new("users/u1/alarms", "missing"))
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(key) if key.id == "missing"));
    }

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let result = SqliteDocumentStore::try_new(&conn);
        assert!(matches!(result, Err(RepoError::InvalidData(_))));
    }

    #[test]
    fn corrupted_body_is_reported_as_invalid_data() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES ('c', 'x', 'not json');",
            [],
        )
        .unwrap();
        let store = SqliteDocumentStore::try_new(&conn).unwrap();

        let err = store.get(&DocumentKey::new("c", "x")).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}
