//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose edit sessions (open, dispatch, snapshot, commit, close) to Dart
//!   via FRB as JSON envelopes.
//! - Keep error semantics simple: every failure is an `ok=false` envelope.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Session state lives in one process-wide registry; each session is
//!   independent of every other.
//! - State and records cross the boundary as UTF-8 JSON strings.

use daybook_core::db::open_db;
use daybook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    EditService, ItemRecord, ItemService, ItemType, SessionId, SessionRegistry,
    SqliteDocumentStore, SystemClock,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};

const DB_FILE_NAME: &str = "daybook.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSIONS: OnceLock<Mutex<SessionRegistry>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Envelope returned by session lifecycle and dispatch calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSessionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Session the call addressed (or created).
    pub session_id: Option<String>,
    /// Root state as JSON after the call; `None` on failure and after close.
    pub state_json: Option<String>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl EditSessionResponse {
    fn success(session_id: SessionId, state_json: Option<String>, message: &str) -> Self {
        Self {
            ok: true,
            session_id: Some(session_id.to_string()),
            state_json,
            message: message.to_string(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            session_id: None,
            state_json: None,
            message: message.into(),
        }
    }
}

/// Envelope returned by `edit_session_commit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommitResponse {
    pub ok: bool,
    /// Stable id of the saved item.
    pub item_id: Option<String>,
    /// Saved record body as JSON.
    pub item_json: Option<String>,
    /// Machine-readable reason for rejected saves (`missing_title`, ...).
    pub error_code: Option<String>,
    pub message: String,
}

impl EditCommitResponse {
    fn failure(error_code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            item_id: None,
            item_json: None,
            error_code: error_code.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Opens an edit session for `item_type` (`task|countdown|diary|alarm`).
///
/// `item_json` is the stored record body when editing, `None` when creating.
///
/// # FFI contract
/// - Sync call, in-memory only.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_session_open(
    user_id: String,
    item_type: String,
    item_json: Option<String>,
) -> EditSessionResponse {
    let result = (|| {
        let kind = parse_item_type(&item_type)?;
        let existing = parse_existing(kind, item_json.as_deref())?;
        let ctx = edit_service(&user_id)
            .open(kind, existing.as_ref())
            .map_err(|err| err.to_string())?;
        let state_json = state_to_json(ctx.state())?;
        let session_id = with_sessions(|sessions| Ok(sessions.open(ctx)))?;
        Ok::<_, String>((session_id, state_json))
    })();

    match result {
        Ok((session_id, state_json)) => {
            EditSessionResponse::success(session_id, Some(state_json), "Session opened.")
        }
        Err(err) => EditSessionResponse::failure(format!("edit_session_open failed: {err}")),
    }
}

/// Applies one wire action (`{"module": .., "action": ..}`) to a session.
///
/// # FFI contract
/// - Unknown module or action kinds are accepted as no-ops.
/// - Malformed actions fail without changing state.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_session_dispatch(session_id: String, action_json: String) -> EditSessionResponse {
    let result = parse_session_id(&session_id).and_then(|id| {
        with_sessions(|sessions| {
            let state = sessions
                .dispatch_json(id, &action_json)
                .map_err(|err| err.to_string())?;
            state_to_json(state).map(|json| (id, json))
        })
    });

    match result {
        Ok((id, state_json)) => EditSessionResponse::success(id, Some(state_json), "Dispatched."),
        Err(err) => EditSessionResponse::failure(format!("edit_session_dispatch failed: {err}")),
    }
}

/// Returns the current root state of a session.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_session_snapshot(session_id: String) -> EditSessionResponse {
    let result = parse_session_id(&session_id).and_then(|id| {
        with_sessions(|sessions| {
            let ctx = sessions.get(id).map_err(|err| err.to_string())?;
            state_to_json(ctx.state()).map(|json| (id, json))
        })
    });

    match result {
        Ok((id, state_json)) => EditSessionResponse::success(id, Some(state_json), "Snapshot."),
        Err(err) => EditSessionResponse::failure(format!("edit_session_snapshot failed: {err}")),
    }
}

/// Discards a session. Later calls with the same id fail.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_session_close(session_id: String) -> EditSessionResponse {
    let result = parse_session_id(&session_id).and_then(|id| {
        with_sessions(|sessions| {
            sessions.close(id).map_err(|err| err.to_string())?;
            Ok(id)
        })
    });

    match result {
        Ok(id) => EditSessionResponse::success(id, None, "Session closed."),
        Err(err) => EditSessionResponse::failure(format!("edit_session_close failed: {err}")),
    }
}

/// Validates the session's `item_type` slice and saves the resulting record.
///
/// `existing_json` must be the body the session was opened with when editing.
/// A rejected save keeps the session open so it can be corrected; a
/// successful save closes it.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Sessions abandoned without a successful commit stay registered until
///   `edit_session_close`; the caller owns that cleanup.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_session_commit(
    session_id: String,
    user_id: String,
    item_type: String,
    existing_json: Option<String>,
) -> EditCommitResponse {
    let prepared = (|| {
        let id = parse_session_id(&session_id)?;
        let kind = parse_item_type(&item_type)?;
        let existing = parse_existing(kind, existing_json.as_deref())?;
        Ok::<_, String>((id, kind, existing))
    })();
    let (id, kind, existing) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            return EditCommitResponse::failure(None, format!("edit_session_commit failed: {err}"))
        }
    };

    let committed = with_sessions(|sessions| {
        let ctx = sessions.get(id).map_err(|err| err.to_string())?;
        Ok(edit_service(&user_id).commit(ctx, kind, existing.as_ref()))
    });
    let record = match committed {
        Ok(Ok(record)) => record,
        Ok(Err(save_err)) => {
            return EditCommitResponse::failure(Some(save_err.code()), save_err.to_string())
        }
        Err(err) => {
            return EditCommitResponse::failure(None, format!("edit_session_commit failed: {err}"))
        }
    };

    match save_record(&user_id, &record) {
        Ok(item_json) => {
            if let Err(err) = with_sessions(|sessions| {
                sessions.close(id).map_err(|err| err.to_string())
            }) {
                warn!("event=ffi_commit module=ffi status=warn reason=close_failed error={err}");
            }
            EditCommitResponse {
                ok: true,
                item_id: Some(record.id().to_string()),
                item_json: Some(item_json),
                error_code: None,
                message: "Saved.".to_string(),
            }
        }
        Err(err) => EditCommitResponse::failure(
            Some("persistence_failed"),
            format!("edit_session_commit failed: {err}"),
        ),
    }
}

fn edit_service(user_id: &str) -> EditService {
    EditService::new(Arc::new(SystemClock), user_id.trim())
}

fn with_sessions<T>(
    f: impl FnOnce(&mut SessionRegistry) -> Result<T, String>,
) -> Result<T, String> {
    let mut sessions = SESSIONS
        .get_or_init(|| Mutex::new(SessionRegistry::new()))
        .lock()
        .map_err(|_| {
            warn!("event=ffi_sessions module=ffi status=error error_code=lock_poisoned");
            "session registry is unavailable".to_string()
        })?;
    f(&mut *sessions)
}

fn parse_item_type(raw: &str) -> Result<ItemType, String> {
    ItemType::parse(raw).ok_or_else(|| {
        format!("unsupported item type `{}`; expected task|countdown|diary|alarm", raw.trim())
    })
}

fn parse_session_id(raw: &str) -> Result<SessionId, String> {
    SessionId::parse_str(raw.trim()).map_err(|_| format!("invalid session id `{}`", raw.trim()))
}

fn parse_existing(kind: ItemType, raw: Option<&str>) -> Result<Option<ItemRecord>, String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    let body = serde_json::from_str(raw).map_err(|err| format!("invalid item json: {err}"))?;
    ItemRecord::from_body(kind, body)
        .map(Some)
        .map_err(|err| format!("invalid {} record: {err}", kind.as_str()))
}

fn state_to_json(state: &daybook_core::RootState) -> Result<String, String> {
    serde_json::to_string(state).map_err(|err| format!("state encoding failed: {err}"))
}

fn save_record(user_id: &str, record: &ItemRecord) -> Result<String, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let store =
        SqliteDocumentStore::try_new(&conn).map_err(|err| format!("store init failed: {err}"))?;
    ItemService::new(store, user_id.trim())
        .save_item(record)
        .map_err(|err| err.to_string())?;
    record
        .to_body()
        .map(|body| body.to_string())
        .map_err(|err| format!("record encoding failed: {err}"))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("DAYBOOK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, edit_session_close, edit_session_commit, edit_session_dispatch,
        edit_session_open, edit_session_snapshot, init_logging, ping,
    };
    use daybook_core::db::open_db;
    use serde_json::Value;

    const TITLE_ACTION: &str = r#"{"module":"task","action":{"type":"set_field","payload":{"field":"title","value":"  Water plants  "}}}"#;

    fn state(json: Option<String>) -> Value {
        serde_json::from_str(&json.expect("state json")).expect("valid state json")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn open_rejects_unknown_item_type() {
        let response = edit_session_open("u1".to_string(), "reminder".to_string(), None);
        assert!(!response.ok);
        assert!(response.message.contains("unsupported item type"));
    }

    #[test]
    fn dispatch_updates_only_the_addressed_session() {
        let first = edit_session_open("u1".to_string(), "task".to_string(), None);
        let second = edit_session_open("u1".to_string(), "task".to_string(), None);
        assert!(first.ok && second.ok);
        let first_id = first.session_id.unwrap();
        let second_id = second.session_id.unwrap();

        let dispatched = edit_session_dispatch(first_id.clone(), TITLE_ACTION.to_string());
        assert!(dispatched.ok, "{}", dispatched.message);
        assert_eq!(state(dispatched.state_json)["task"]["title"], "  Water plants  ");

        let untouched = edit_session_snapshot(second_id.clone());
        assert_eq!(state(untouched.state_json)["task"]["title"], "");

        assert!(edit_session_close(first_id).ok);
        assert!(edit_session_close(second_id).ok);
    }

    #[test]
    fn closed_session_is_reported() {
        let opened = edit_session_open("u1".to_string(), "diary".to_string(), None);
        let id = opened.session_id.unwrap();
        assert!(edit_session_close(id.clone()).ok);

        let response = edit_session_snapshot(id);
        assert!(!response.ok);
        assert!(response.message.contains("no edit context"));
    }

    #[test]
    fn malformed_action_keeps_state() {
        let opened = edit_session_open("u1".to_string(), "alarm".to_string(), None);
        let id = opened.session_id.unwrap();
        let before = edit_session_snapshot(id.clone()).state_json;

        let response = edit_session_dispatch(id.clone(), "{not json".to_string());
        assert!(!response.ok);
        assert_eq!(edit_session_snapshot(id.clone()).state_json, before);
        assert!(edit_session_close(id).ok);
    }

    #[test]
    fn commit_rejects_blank_title_then_saves() {
        let opened = edit_session_open("u-ffi".to_string(), "task".to_string(), None);
        let id = opened.session_id.unwrap();

        let rejected = edit_session_commit(id.clone(), "u-ffi".to_string(), "task".to_string(), None);
        assert!(!rejected.ok);
        assert_eq!(rejected.error_code.as_deref(), Some("missing_title"));

        assert!(edit_session_dispatch(id.clone(), TITLE_ACTION.to_string()).ok);
        let saved = edit_session_commit(id.clone(), "u-ffi".to_string(), "task".to_string(), None);
        assert!(saved.ok, "{}", saved.message);
        let item: Value = serde_json::from_str(&saved.item_json.unwrap()).unwrap();
        assert_eq!(item["title"], "Water plants");

        let item_id = saved.item_id.unwrap();
        let conn = open_db(super::resolve_db_path()).expect("open db");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = 'users/u-ffi/tasks' AND doc_id = ?1",
                [item_id.as_str()],
                |row| row.get(0),
            )
            .expect("count saved task");
        assert_eq!(count, 1);

        let closed = edit_session_snapshot(id.clone());
        assert!(!closed.ok);
        assert!(!edit_session_close(id).ok);
    }
}
