//! Task-level operations, including the cross-category move.

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{NodeKind, Result, StoreError};
use crate::model::{Completion, Task, aggregate};

use super::{
    DEFAULT_TASK_NAME, Store, category, fresh_id, immediate_tx, normalized_name, reorder_scoped,
    subtask, validate_completion,
};

impl Store {
    /// One task with its subtasks attached, completion tagged by mode.
    ///
    /// # Errors
    ///
    /// `NotFound` if no task has this id.
    pub fn get_task(&self, id: &str) -> Result<Task> {
        let conn = self.lock();
        task_by_id(&conn, id)
    }

    /// Append a new task to the bottom of a category.
    ///
    /// # Errors
    ///
    /// `NotFound` if the category does not exist.
    pub fn add_task(&self, category_id: &str, name: &str) -> Result<Task> {
        let name = normalized_name(name, DEFAULT_TASK_NAME);
        let id = fresh_id();

        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        if !category::category_exists(&tx, category_id)? {
            return Err(StoreError::not_found(NodeKind::Category, category_id));
        }

        let max_order: Option<i64> = tx.query_row(
            "SELECT MAX(sort_order) FROM tasks WHERE category_id = ?1",
            params![category_id],
            |row| row.get(0),
        )?;
        let sort_order = max_order.unwrap_or(0) + 1;

        tx.execute(
            "INSERT INTO tasks (id, category_id, name, sort_order) VALUES (?1, ?2, ?3, ?4)",
            params![id, category_id, name, sort_order],
        )?;
        tx.commit()?;

        tracing::debug!(task_id = %id, category_id = %category_id, sort_order, "task added");

        Ok(Task {
            id,
            category_id: category_id.to_owned(),
            name,
            description: String::new(),
            completion: Completion::Independent(0),
            public: false,
            subtasks: Vec::new(),
            work_logs: Vec::new(),
        })
    }

    /// Full-record replace of name, description, completion, and visibility.
    ///
    /// For a task with subtasks the caller-supplied completion is discarded:
    /// the aggregate is recomputed and persisted in the same transaction, so
    /// a stale read-modify-write can never clobber the derived value.
    ///
    /// # Errors
    ///
    /// `NotFound` if no task has this id; `InvalidInput` if the completion
    /// value exceeds 100.
    pub fn update_task(&self, task: &Task) -> Result<Task> {
        validate_completion("completion", task.completion.value())?;

        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        let mut updated = tx
            .query_row(
                "UPDATE tasks
                 SET name = ?1, description = ?2, completion = ?3, public = ?4
                 WHERE id = ?5
                 RETURNING id, category_id, name, description, completion, public",
                params![
                    task.name,
                    task.description,
                    task.completion.value(),
                    task.public,
                    task.id
                ],
                row_to_task,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(NodeKind::Task, &task.id))?;

        if let Some(aggregated) = reaggregate(&tx, &updated.id)? {
            updated.completion = Completion::Aggregated(aggregated);
        }
        updated.subtasks = subtask::subtasks_for_task(&tx, &updated.id)?;
        tx.commit()?;

        Ok(updated)
    }

    /// Remove a task and, through cascade, its subtasks and ledger entries.
    ///
    /// # Errors
    ///
    /// `NotFound` if no task has this id.
    pub fn delete_task(&self, id: &str) -> Result<Task> {
        let conn = self.lock();

        let removed = conn
            .query_row(
                "DELETE FROM tasks
                 WHERE id = ?1
                 RETURNING id, category_id, name, description, completion, public",
                params![id],
                row_to_task,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(NodeKind::Task, id))?;

        tracing::debug!(task_id = %id, "task deleted");
        Ok(removed)
    }

    /// Rewrite task order within a category from a caller-supplied
    /// permutation. Omitted tasks are appended after the listed ones in
    /// their prior order.
    ///
    /// # Errors
    ///
    /// `NotFound` if the category does not exist.
    pub fn reorder_tasks(&self, category_id: &str, ids: &[String]) -> Result<()> {
        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        if !category::category_exists(&tx, category_id)? {
            return Err(StoreError::not_found(NodeKind::Category, category_id));
        }

        reorder_scoped(&tx, "tasks", Some(("category_id", category_id)), ids)?;
        tx.commit()?;

        tracing::debug!(category_id = %category_id, count = ids.len(), "tasks reordered");
        Ok(())
    }

    /// Move a task into another category at the given position.
    ///
    /// In one transaction: destination siblings at or past `index` shift up
    /// by one, the task takes the slot, and the denormalized `category_id`
    /// on its subtasks and work logs is rewritten so category-scoped reads
    /// reflect the new membership immediately.
    ///
    /// # Errors
    ///
    /// `NotFound` if the task or destination category does not exist;
    /// `InvalidInput` if `index` is negative.
    pub fn move_task(&self, task_id: &str, new_category_id: &str, index: i64) -> Result<Task> {
        if index < 0 {
            return Err(StoreError::InvalidInput {
                field: "index",
                reason: format!("must be non-negative, got {index}"),
            });
        }

        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        if !category::category_exists(&tx, new_category_id)? {
            return Err(StoreError::not_found(NodeKind::Category, new_category_id));
        }

        tx.execute(
            "UPDATE tasks
             SET sort_order = sort_order + 1
             WHERE category_id = ?1 AND sort_order >= ?2",
            params![new_category_id, index],
        )?;

        let mut moved = tx
            .query_row(
                "UPDATE tasks
                 SET category_id = ?1, sort_order = ?2
                 WHERE id = ?3
                 RETURNING id, category_id, name, description, completion, public",
                params![new_category_id, index, task_id],
                row_to_task,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(NodeKind::Task, task_id))?;

        tx.execute(
            "UPDATE subtasks SET category_id = ?1 WHERE task_id = ?2",
            params![new_category_id, task_id],
        )?;
        tx.execute(
            "UPDATE work_logs SET category_id = ?1 WHERE task_id = ?2",
            params![new_category_id, task_id],
        )?;

        moved.subtasks = subtask::subtasks_for_task(&tx, task_id)?;
        moved.completion =
            Completion::from_stored(moved.completion.value(), !moved.subtasks.is_empty());
        tx.commit()?;

        tracing::debug!(
            task_id = %task_id,
            category_id = %new_category_id,
            index,
            "task moved"
        );
        Ok(moved)
    }
}

/// Recompute and persist a task's aggregate completion from its subtasks.
///
/// Returns `None` without touching the row when the task has no subtasks:
/// dropping the last subtask leaves the final aggregate behind as the new
/// independent value.
pub(super) fn reaggregate(conn: &Connection, task_id: &str) -> Result<Option<u8>> {
    let values = subtask::subtask_completions(conn, task_id)?;
    if values.is_empty() {
        return Ok(None);
    }

    let aggregated = aggregate(&values);
    conn.execute(
        "UPDATE tasks SET completion = ?1 WHERE id = ?2",
        params![aggregated, task_id],
    )?;
    Ok(Some(aggregated))
}

pub(super) fn category_of_task(conn: &Connection, task_id: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT category_id FROM tasks WHERE id = ?1",
        params![task_id],
        |row| row.get(0),
    )
    .optional()
}

pub(super) fn task_by_id(conn: &Connection, id: &str) -> Result<Task> {
    let mut task = conn
        .query_row(
            "SELECT id, category_id, name, description, completion, public
             FROM tasks
             WHERE id = ?1",
            params![id],
            row_to_task,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found(NodeKind::Task, id))?;

    task.subtasks = subtask::subtasks_for_task(conn, id)?;
    task.completion = Completion::from_stored(task.completion.value(), !task.subtasks.is_empty());
    Ok(task)
}

pub(super) fn tasks_for_category(conn: &Connection, category_id: &str) -> Result<Vec<Task>> {
    let mut tasks: Vec<Task> = {
        let mut stmt = conn.prepare(
            "SELECT id, category_id, name, description, completion, public
             FROM tasks
             WHERE category_id = ?1
             ORDER BY sort_order ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![category_id], row_to_task)?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };

    let mut subs = subtask::subtasks_for_category(conn, category_id)?;
    for task in &mut tasks {
        if let Some(owned) = subs.remove(&task.id) {
            task.subtasks = owned;
        }
        task.completion =
            Completion::from_stored(task.completion.value(), !task.subtasks.is_empty());
    }

    Ok(tasks)
}

pub(super) fn row_to_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        category_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        completion: Completion::Independent(row.get(4)?),
        public: row.get(5)?,
        subtasks: Vec::new(),
        work_logs: Vec::new(),
    })
}
