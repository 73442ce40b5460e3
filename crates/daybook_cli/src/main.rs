//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `daybook_core` linkage without the Flutter runtime.
//! - Drive one scripted task edit session end-to-end against an in-memory
//!   database and print the saved record.

use daybook_core::db::open_db_in_memory;
use daybook_core::{
    CompletionService, EditService, ItemService, ItemType, SqliteDocumentStore, SystemClock,
    TaskCategory,
};
use std::error::Error;
use std::sync::Arc;

const SMOKE_USER: &str = "cli-smoke";

fn main() {
    println!("daybook_core ping={}", daybook_core::ping());
    println!("daybook_core version={}", daybook_core::core_version());

    if let Err(err) = run_task_session() {
        eprintln!("daybook_cli session failed: {err}");
        std::process::exit(1);
    }
}

fn run_task_session() -> Result<(), Box<dyn Error>> {
    let clock = Arc::new(SystemClock);
    let edit = EditService::new(clock.clone(), SMOKE_USER);

    let mut ctx = edit.open(ItemType::Task, None)?;
    {
        let mut task = ctx.task();
        task.set_title("  Stretch for ten minutes ");
        task.set_category(TaskCategory::Health);
        task.set_no_due_date(true);
    }
    let record = edit.commit(&ctx, ItemType::Task, None)?;

    let conn = open_db_in_memory()?;
    let store = SqliteDocumentStore::try_new(&conn)?;
    let items = ItemService::new(&store, SMOKE_USER);
    let completions = CompletionService::new(&store, clock, SMOKE_USER);

    items.save_item(&record)?;
    completions.mark_task_completed(record.id(), None, None, None)?;

    println!("saved={}", record.to_body()?);
    for task in completions.tasks_with_status(&items, None)? {
        println!("task={} completed_today={}", task.task.title, task.completed_today);
    }
    Ok(())
}
