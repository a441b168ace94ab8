//! The tree consistency engine.
//!
//! Every structural mutation goes through [`Store`]: sibling ordering,
//! bottom-up completion aggregation, and work-log write-through all happen
//! inside a single SQLite transaction, so a concurrent reader observes a
//! pre- or post-mutation snapshot and never a partial one.
//!
//! The store owns one connection behind a mutex. SQLite allows a single
//! writer per database; serializing callers onto one connection keeps write
//! transactions from ever contending in-process, and the busy timeout covers
//! contention with other processes.

mod category;
mod subtask;
mod task;
mod worklog;

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, Transaction, TransactionBehavior, params};

use crate::db;
use crate::error::{Result, StoreError};

/// Name given to a category created with an empty name.
pub const DEFAULT_CATEGORY_NAME: &str = "New Category";
/// Name given to a task created with an empty name.
pub const DEFAULT_TASK_NAME: &str = "New Task";
/// Name given to a subtask created with an empty name.
pub const DEFAULT_SUBTASK_NAME: &str = "New Subtask";

/// Handle to the task tree. Cheap to share behind an `Arc`; all operations
/// take `&self` and serialize internally.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) the database at `path` and migrate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened, configured, or
    /// migrated.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = db::open(path)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store for tests and ephemeral use.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be configured or migrated.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = db::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create the sample tree: two categories, one independent task and one
    /// aggregated task whose subtasks sit at 0 and 100.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the inserts fail.
    pub fn seed_sample(&self) -> Result<()> {
        let work = self.add_category("Work")?;
        let mut report = self.add_task(&work.id, "Finish Report")?;
        report.completion = crate::model::Completion::Independent(20);
        self.update_task(&report)?;

        let personal = self.add_category("Personal")?;
        let groceries = self.add_task(&personal.id, "Buy Groceries")?;
        self.add_subtask(&groceries.id, "Milk")?;
        let mut eggs = self.add_subtask(&groceries.id, "Eggs")?;
        eggs.completion = 100;
        self.update_subtask(&eggs)?;

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn normalized_name(name: &str, default: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        default.to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn validate_completion(field: &'static str, value: u8) -> Result<()> {
    if value > crate::model::MAX_COMPLETION {
        return Err(StoreError::InvalidInput {
            field,
            reason: format!("must be at most {}, got {value}", crate::model::MAX_COMPLETION),
        });
    }
    Ok(())
}

fn validate_hours(hours: f64) -> Result<()> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(StoreError::InvalidInput {
            field: "hours_worked",
            reason: format!("must be a non-negative finite number, got {hours}"),
        });
    }
    Ok(())
}

/// Rewrite `sort_order` densely from a caller-supplied permutation.
///
/// Listed ids take orders `0..`, in list position. Ids that do not belong to
/// the sibling set (and repeats) are ignored. Siblings the list omits are
/// appended after the reordered set in their prior relative order, so a
/// caller holding a stale view cannot drop rows.
fn reorder_scoped(
    tx: &Transaction<'_>,
    table: &str,
    scope: Option<(&str, &str)>,
    ids: &[String],
) -> Result<()> {
    let current: Vec<String> = {
        let (sql, scope_value) = match scope {
            Some((column, value)) => (
                format!(
                    "SELECT id FROM {table} WHERE {column} = ?1 ORDER BY sort_order ASC, id ASC"
                ),
                Some(value),
            ),
            None => (
                format!("SELECT id FROM {table} ORDER BY sort_order ASC, id ASC"),
                None,
            ),
        };
        let mut stmt = tx.prepare(&sql)?;
        match scope_value {
            Some(value) => stmt
                .query_map(params![value], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?,
            None => stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?,
        }
    };

    let members: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut chosen: HashSet<&str> = HashSet::new();
    let listed: Vec<&str> = ids
        .iter()
        .map(String::as_str)
        .filter(|id| members.contains(id) && chosen.insert(id))
        .collect();

    let mut stmt = tx.prepare(&format!("UPDATE {table} SET sort_order = ?1 WHERE id = ?2"))?;
    let mut next_order: i64 = 0;
    for id in &listed {
        stmt.execute(params![next_order, id])?;
        next_order += 1;
    }
    for id in current.iter().filter(|id| !chosen.contains(id.as_str())) {
        stmt.execute(params![next_order, id])?;
        next_order += 1;
    }

    Ok(())
}

fn immediate_tx(conn: &mut Connection) -> rusqlite::Result<Transaction<'_>> {
    conn.transaction_with_behavior(TransactionBehavior::Immediate)
}
