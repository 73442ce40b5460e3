use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use daybook_core::db::{open_db, open_db_in_memory};
use daybook_core::{
    Alarm, CompletionService, Diary, FixedClock, ItemRecord, ItemService, ItemType,
    ItemValidationError, RepoError, SqliteDocumentStore, Task, TaskCategory, TaskRecurrence,
};
use std::sync::Arc;
use uuid::Uuid;

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn task(user_id: &str, title: &str, created_day: u32) -> Task {
    Task {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        title: title.to_string(),
        description: None,
        category: TaskCategory::Personal,
        recurrence: TaskRecurrence::Daily,
        due_date: None,
        completed: false,
        created_at: at(created_day),
    }
}

#[test]
fn save_get_list_delete_items() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let items = ItemService::new(&store, "u1");

    let older = ItemRecord::Task(task("u1", "older", 1));
    let newer = ItemRecord::Task(task("u1", "newer", 5));
    items.save_item(&older).unwrap();
    items.save_item(&newer).unwrap();

    let listed = items.list_items(ItemType::Task).unwrap();
    assert_eq!(listed, vec![newer.clone(), older.clone()]);
    assert_eq!(
        items.get_item(ItemType::Task, older.id()).unwrap(),
        Some(older.clone())
    );
    assert!(items.list_items(ItemType::Diary).unwrap().is_empty());

    items.delete_item(ItemType::Task, older.id()).unwrap();
    assert_eq!(items.get_item(ItemType::Task, older.id()).unwrap(), None);
    assert!(matches!(
        items.delete_item(ItemType::Task, older.id()),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn saving_again_replaces_the_record() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let items = ItemService::new(&store, "u1");

    let mut diary = Diary {
        id: Uuid::new_v4(),
        user_id: "u1".to_string(),
        date: date(2),
        title: "Day".to_string(),
        content: "first".to_string(),
        mood: None,
        created_at: at(2),
    };
    items.save_item(&ItemRecord::Diary(diary.clone())).unwrap();
    diary.content = "second".to_string();
    diary.mood = Some("calm".to_string());
    items.save_item(&ItemRecord::Diary(diary.clone())).unwrap();

    assert_eq!(
        items.list_items(ItemType::Diary).unwrap(),
        vec![ItemRecord::Diary(diary)]
    );
}

#[test]
fn invalid_or_foreign_records_are_not_written() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let items = ItemService::new(&store, "u1");

    let alarm = ItemRecord::Alarm(Alarm {
        id: Uuid::new_v4(),
        user_id: "u1".to_string(),
        title: "late".to_string(),
        time: "25:00".to_string(),
        repeat_days: None,
        is_enabled: true,
        vibrate: true,
        created_at: at(1),
    });
    assert!(matches!(
        items.save_item(&alarm),
        Err(RepoError::Validation(ItemValidationError::InvalidAlarmTime(_)))
    ));

    let foreign = ItemRecord::Task(task("u2", "not mine", 1));
    assert!(matches!(
        items.save_item(&foreign),
        Err(RepoError::InvalidData(_))
    ));
    assert!(items.list_items(ItemType::Alarm).unwrap().is_empty());
    assert!(items.list_items(ItemType::Task).unwrap().is_empty());
}

#[test]
fn users_do_not_see_each_other() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let mine = ItemService::new(&store, "u1");
    let theirs = ItemService::new(&store, "u2");

    let record = ItemRecord::Task(task("u1", "private", 1));
    mine.save_item(&record).unwrap();

    assert_eq!(theirs.get_item(ItemType::Task, record.id()).unwrap(), None);
    assert!(theirs.list_tasks().unwrap().is_empty());
}

#[test]
fn completion_logs_are_one_per_task_per_day() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let items = ItemService::new(&store, "u1");
    let completions = CompletionService::new(&store, Arc::new(FixedClock::new(at(10))), "u1");

    let water = task("u1", "water plants", 1);
    let read = task("u1", "read", 2);
    items.save_item(&ItemRecord::Task(water.clone())).unwrap();
    items.save_item(&ItemRecord::Task(read.clone())).unwrap();

    let first = completions
        .mark_task_completed(water.id, None, None, None)
        .unwrap();
    let again = completions
        .mark_task_completed(water.id, None, Some(2.5), Some("twice".to_string()))
        .unwrap();
    assert_eq!(first.id, again.id);
    assert_eq!(first.id, format!("{}_2026-03-10", water.id));
    assert_eq!(first.date, date(10));

    let logs = completions.task_completion_logs(water.id, None).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].value, Some(2.5));
    assert_eq!(logs[0].note.as_deref(), Some("twice"));

    let ids = completions.completed_task_ids(None).unwrap();
    assert!(ids.contains(&water.id));
    assert!(!ids.contains(&read.id));

    let statuses = completions.tasks_with_status(&items, None).unwrap();
    let flags: Vec<(String, bool)> = statuses
        .into_iter()
        .map(|status| (status.task.title, status.completed_today))
        .collect();
    assert_eq!(
        flags,
        vec![
            ("read".to_string(), false),
            ("water plants".to_string(), true)
        ]
    );

    assert!(completions.unmark_task_completed(water.id, None).unwrap());
    assert!(!completions.unmark_task_completed(water.id, None).unwrap());
    assert!(completions.completed_task_ids(None).unwrap().is_empty());
}

#[test]
fn completion_history_is_newest_first_with_limit_and_range() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("history.db")).unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let completions = CompletionService::new(&store, Arc::new(FixedClock::new(at(20))), "u1");

    let habit = Uuid::new_v4();
    let other = Uuid::new_v4();
    for day in [3, 7, 5, 9] {
        completions
            .mark_task_completed(habit, Some(date(day)), None, None)
            .unwrap();
    }
    completions
        .mark_task_completed(other, Some(date(6)), None, None)
        .unwrap();

    let recent: Vec<NaiveDate> = completions
        .task_completion_logs(habit, Some(2))
        .unwrap()
        .into_iter()
        .map(|log| log.date)
        .collect();
    assert_eq!(recent, vec![date(9), date(7)]);

    let unlimited = completions.task_completion_logs(habit, Some(0)).unwrap();
    assert_eq!(unlimited.len(), 4);

    let in_range: Vec<NaiveDate> = completions
        .completion_logs_in_range(date(5), date(7))
        .unwrap()
        .into_iter()
        .map(|log| log.date)
        .collect();
    assert_eq!(in_range, vec![date(7), date(6), date(5)]);

    assert!(completions
        .completion_logs_in_range(date(8), date(4))
        .unwrap()
        .is_empty());
}

#[test]
fn today_is_the_local_calendar_day() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteDocumentStore::try_new(&conn).unwrap();
    let late_evening_utc = Utc.with_ymd_and_hms(2026, 3, 10, 23, 30, 0).unwrap();
    let clock = FixedClock::with_offset(late_evening_utc, FixedOffset::east_opt(2 * 3600).unwrap());
    let completions = CompletionService::new(&store, Arc::new(clock), "u1");

    let task_id = Uuid::new_v4();
    let log = completions
        .mark_task_completed(task_id, None, None, None)
        .unwrap();

    assert_eq!(log.date, date(11));
    assert!(completions.completed_task_ids(None).unwrap().contains(&task_id));
    assert!(completions
        .completed_task_ids(Some(date(10)))
        .unwrap()
        .is_empty());
}
