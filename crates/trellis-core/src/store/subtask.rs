//! Subtask-level operations. Every mutation here re-aggregates the parent
//! task in the same transaction.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{NodeKind, Result, StoreError};
use crate::model::Subtask;

use super::{
    DEFAULT_SUBTASK_NAME, Store, fresh_id, immediate_tx, normalized_name, reorder_scoped, task,
    validate_completion,
};

impl Store {
    /// # Errors
    ///
    /// `NotFound` if no subtask has this id.
    pub fn get_subtask(&self, id: &str) -> Result<Subtask> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, task_id, category_id, name, description, completion, public
             FROM subtasks
             WHERE id = ?1",
            params![id],
            row_to_subtask,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found(NodeKind::Subtask, id))
    }

    /// Append a new subtask to the bottom of a task and fold it into the
    /// task's aggregate. Adding the first subtask flips the task from
    /// independent to aggregated completion.
    ///
    /// # Errors
    ///
    /// `NotFound` if the task does not exist.
    pub fn add_subtask(&self, task_id: &str, name: &str) -> Result<Subtask> {
        let name = normalized_name(name, DEFAULT_SUBTASK_NAME);
        let id = fresh_id();

        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        let category_id = task::category_of_task(&tx, task_id)?
            .ok_or_else(|| StoreError::not_found(NodeKind::Task, task_id))?;

        let max_order: Option<i64> = tx.query_row(
            "SELECT MAX(sort_order) FROM subtasks WHERE task_id = ?1",
            params![task_id],
            |row| row.get(0),
        )?;
        let sort_order = max_order.unwrap_or(0) + 1;

        tx.execute(
            "INSERT INTO subtasks (id, task_id, category_id, name, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, task_id, category_id, name, sort_order],
        )?;
        let aggregated = task::reaggregate(&tx, task_id)?;
        tx.commit()?;

        tracing::debug!(
            subtask_id = %id,
            task_id = %task_id,
            sort_order,
            aggregated = aggregated.unwrap_or(0),
            "subtask added"
        );

        Ok(Subtask {
            id,
            task_id: task_id.to_owned(),
            category_id,
            name,
            description: String::new(),
            completion: 0,
            public: false,
            work_logs: Vec::new(),
        })
    }

    /// Full-record replace of name, description, completion, and visibility,
    /// then re-aggregate the parent task.
    ///
    /// # Errors
    ///
    /// `NotFound` if no subtask has this id; `InvalidInput` if the
    /// completion value exceeds 100.
    pub fn update_subtask(&self, sub: &Subtask) -> Result<Subtask> {
        validate_completion("completion", sub.completion)?;

        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        let updated = tx
            .query_row(
                "UPDATE subtasks
                 SET name = ?1, description = ?2, completion = ?3, public = ?4
                 WHERE id = ?5
                 RETURNING id, task_id, category_id, name, description, completion, public",
                params![sub.name, sub.description, sub.completion, sub.public, sub.id],
                row_to_subtask,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(NodeKind::Subtask, &sub.id))?;

        task::reaggregate(&tx, &updated.task_id)?;
        tx.commit()?;

        Ok(updated)
    }

    /// Remove a subtask and its ledger entries, then re-aggregate the parent
    /// task. Removing the last subtask leaves the task's completion at its
    /// final aggregate, now independently settable again.
    ///
    /// # Errors
    ///
    /// `NotFound` if no subtask has this id.
    pub fn delete_subtask(&self, id: &str) -> Result<Subtask> {
        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        let removed = tx
            .query_row(
                "DELETE FROM subtasks
                 WHERE id = ?1
                 RETURNING id, task_id, category_id, name, description, completion, public",
                params![id],
                row_to_subtask,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(NodeKind::Subtask, id))?;

        task::reaggregate(&tx, &removed.task_id)?;
        tx.commit()?;

        tracing::debug!(subtask_id = %id, task_id = %removed.task_id, "subtask deleted");
        Ok(removed)
    }

    /// Rewrite subtask order within a task from a caller-supplied
    /// permutation. Omitted subtasks are appended after the listed ones in
    /// their prior order.
    ///
    /// # Errors
    ///
    /// `NotFound` if the task does not exist.
    pub fn reorder_subtasks(&self, task_id: &str, ids: &[String]) -> Result<()> {
        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        if task::category_of_task(&tx, task_id)?.is_none() {
            return Err(StoreError::not_found(NodeKind::Task, task_id));
        }

        reorder_scoped(&tx, "subtasks", Some(("task_id", task_id)), ids)?;
        tx.commit()?;

        tracing::debug!(task_id = %task_id, count = ids.len(), "subtasks reordered");
        Ok(())
    }
}

pub(super) fn subtasks_for_task(conn: &Connection, task_id: &str) -> Result<Vec<Subtask>> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, category_id, name, description, completion, public
         FROM subtasks
         WHERE task_id = ?1
         ORDER BY sort_order ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![task_id], row_to_subtask)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// All subtasks under a category, grouped by owning task, each group in
/// sibling order.
pub(super) fn subtasks_for_category(
    conn: &Connection,
    category_id: &str,
) -> Result<HashMap<String, Vec<Subtask>>> {
    let mut stmt = conn.prepare(
        "SELECT id, task_id, category_id, name, description, completion, public
         FROM subtasks
         WHERE category_id = ?1
         ORDER BY sort_order ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![category_id], row_to_subtask)?;

    let mut grouped: HashMap<String, Vec<Subtask>> = HashMap::new();
    for sub in rows {
        let sub = sub?;
        grouped.entry(sub.task_id.clone()).or_default().push(sub);
    }
    Ok(grouped)
}

pub(super) fn subtask_completions(conn: &Connection, task_id: &str) -> rusqlite::Result<Vec<u8>> {
    let mut stmt = conn.prepare("SELECT completion FROM subtasks WHERE task_id = ?1")?;
    let rows = stmt.query_map(params![task_id], |row| row.get(0))?;
    rows.collect()
}

pub(super) fn row_to_subtask(row: &Row<'_>) -> rusqlite::Result<Subtask> {
    Ok(Subtask {
        id: row.get(0)?,
        task_id: row.get(1)?,
        category_id: row.get(2)?,
        name: row.get(3)?,
        description: row.get(4)?,
        completion: row.get(5)?,
        public: row.get(6)?,
        work_logs: Vec::new(),
    })
}
