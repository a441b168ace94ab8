//! The append-only work-log ledger.
//!
//! Appending an entry writes the completion estimate through to its owner in
//! the same transaction. Two exceptions keep the aggregate invariant intact:
//! a task-level entry on a task that has subtasks skips the write-through,
//! and a subtask-level entry re-aggregates the parent after updating the
//! subtask.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{NodeKind, Result, StoreError};
use crate::model::WorkLog;

use super::{Store, fresh_id, immediate_tx, task, validate_completion, validate_hours};

impl Store {
    /// Append a ledger entry against a task.
    ///
    /// `at` back-dates the entry; `None` stamps it now. Timestamps persist
    /// at whole-second precision. For a task with subtasks the entry is
    /// recorded but the estimate does not touch the aggregated completion.
    ///
    /// # Errors
    ///
    /// `NotFound` if the task does not exist; `InvalidInput` for negative
    /// or non-finite hours, or an estimate above 100.
    pub fn add_work_log_for_task(
        &self,
        task_id: &str,
        hours_worked: f64,
        work_description: &str,
        completion_estimate: u8,
        at: Option<DateTime<Utc>>,
    ) -> Result<WorkLog> {
        validate_hours(hours_worked)?;
        validate_completion("completion_estimate", completion_estimate)?;

        let id = fresh_id();
        let created_at = log_timestamp(at)?;

        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        let category_id = task::category_of_task(&tx, task_id)?
            .ok_or_else(|| StoreError::not_found(NodeKind::Task, task_id))?;

        tx.execute(
            "INSERT INTO work_logs (
                id, category_id, task_id, subtask_id,
                hours_worked, work_description, completion_estimate, created_at
             ) VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7)",
            params![
                id,
                category_id,
                task_id,
                hours_worked,
                work_description,
                completion_estimate,
                created_at.timestamp()
            ],
        )?;

        let has_subtasks: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM subtasks WHERE task_id = ?1)",
            params![task_id],
            |row| row.get(0),
        )?;
        if has_subtasks {
            tracing::warn!(
                task_id = %task_id,
                completion_estimate,
                "estimate not applied: task completion is aggregated from subtasks"
            );
        } else {
            tx.execute(
                "UPDATE tasks SET completion = ?1 WHERE id = ?2",
                params![completion_estimate, task_id],
            )?;
        }
        tx.commit()?;

        tracing::debug!(work_log_id = %id, task_id = %task_id, hours_worked, "work log appended");

        Ok(WorkLog {
            id,
            category_id,
            task_id: task_id.to_owned(),
            subtask_id: None,
            hours_worked,
            work_description: work_description.to_owned(),
            completion_estimate,
            created_at,
        })
    }

    /// Append a ledger entry against a subtask, write the estimate through
    /// to it, and re-aggregate the parent task.
    ///
    /// # Errors
    ///
    /// `NotFound` if the subtask does not exist; `InvalidInput` for
    /// negative or non-finite hours, or an estimate above 100.
    pub fn add_work_log_for_subtask(
        &self,
        subtask_id: &str,
        hours_worked: f64,
        work_description: &str,
        completion_estimate: u8,
        at: Option<DateTime<Utc>>,
    ) -> Result<WorkLog> {
        validate_hours(hours_worked)?;
        validate_completion("completion_estimate", completion_estimate)?;

        let id = fresh_id();
        let created_at = log_timestamp(at)?;

        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        let (task_id, category_id): (String, String) = tx
            .query_row(
                "SELECT task_id, category_id FROM subtasks WHERE id = ?1",
                params![subtask_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(NodeKind::Subtask, subtask_id))?;

        tx.execute(
            "INSERT INTO work_logs (
                id, category_id, task_id, subtask_id,
                hours_worked, work_description, completion_estimate, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                id,
                category_id,
                task_id,
                subtask_id,
                hours_worked,
                work_description,
                completion_estimate,
                created_at.timestamp()
            ],
        )?;
        tx.execute(
            "UPDATE subtasks SET completion = ?1 WHERE id = ?2",
            params![completion_estimate, subtask_id],
        )?;
        task::reaggregate(&tx, &task_id)?;
        tx.commit()?;

        tracing::debug!(
            work_log_id = %id,
            subtask_id = %subtask_id,
            hours_worked,
            "work log appended"
        );

        Ok(WorkLog {
            id,
            category_id,
            task_id,
            subtask_id: Some(subtask_id.to_owned()),
            hours_worked,
            work_description: work_description.to_owned(),
            completion_estimate,
            created_at,
        })
    }

    /// Every entry logged under a category, including all descendant tasks
    /// and subtasks, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_work_logs_for_category(&self, category_id: &str) -> Result<Vec<WorkLog>> {
        let conn = self.lock();
        work_logs_where(&conn, "category_id", category_id)
    }

    /// Entries for a task, including its subtasks' entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_work_logs_for_task(&self, task_id: &str) -> Result<Vec<WorkLog>> {
        let conn = self.lock();
        work_logs_where(&conn, "task_id", task_id)
    }

    /// Entries for one subtask, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_work_logs_for_subtask(&self, subtask_id: &str) -> Result<Vec<WorkLog>> {
        let conn = self.lock();
        work_logs_where(&conn, "subtask_id", subtask_id)
    }
}

fn log_timestamp(at: Option<DateTime<Utc>>) -> Result<DateTime<Utc>> {
    let requested = at.unwrap_or_else(Utc::now);
    DateTime::from_timestamp(requested.timestamp(), 0).ok_or_else(|| StoreError::InvalidInput {
        field: "created_at",
        reason: "timestamp out of range".into(),
    })
}

fn work_logs_where(conn: &Connection, column: &str, id: &str) -> Result<Vec<WorkLog>> {
    let sql = format!(
        "SELECT id, category_id, task_id, subtask_id,
                hours_worked, work_description, completion_estimate, created_at
         FROM work_logs
         WHERE {column} = ?1
         ORDER BY created_at DESC, id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![id], row_to_work_log)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn row_to_work_log(row: &Row<'_>) -> rusqlite::Result<WorkLog> {
    let secs: i64 = row.get(7)?;
    let created_at = DateTime::from_timestamp(secs, 0)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(7, secs))?;
    Ok(WorkLog {
        id: row.get(0)?,
        category_id: row.get(1)?,
        task_id: row.get(2)?,
        subtask_id: row.get(3)?,
        hours_worked: row.get(4)?,
        work_description: row.get(5)?,
        completion_estimate: row.get(6)?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::error::StoreError;
    use crate::model::Completion;
    use crate::store::Store;

    fn store_with_task() -> (Store, String) {
        let s = Store::open_in_memory().expect("open in-memory store");
        let cat = s.add_category("cat").expect("add category");
        let task = s.add_task(&cat.id, "task").expect("add task");
        (s, task.id)
    }

    #[test]
    fn task_log_writes_the_estimate_through() {
        let (s, task_id) = store_with_task();
        let log = s
            .add_work_log_for_task(&task_id, 1.5, "drafted the outline", 35, None)
            .expect("log");

        assert_eq!(log.completion_estimate, 35);
        assert!(log.subtask_id.is_none());
        assert_eq!(
            s.get_task(&task_id).expect("get").completion,
            Completion::Independent(35)
        );
    }

    #[test]
    fn aggregated_task_keeps_its_mean_when_logged_against() {
        let (s, task_id) = store_with_task();
        let mut sub = s.add_subtask(&task_id, "leaf").expect("add");
        sub.completion = 40;
        s.update_subtask(&sub).expect("update");

        s.add_work_log_for_task(&task_id, 3.0, "poked at it", 95, None)
            .expect("log");

        assert_eq!(
            s.get_task(&task_id).expect("get").completion,
            Completion::Aggregated(40)
        );
        assert_eq!(s.get_work_logs_for_task(&task_id).expect("logs").len(), 1);
    }

    #[test]
    fn subtask_log_updates_leaf_and_parent() {
        let (s, task_id) = store_with_task();
        let a = s.add_subtask(&task_id, "a").expect("add");
        s.add_subtask(&task_id, "b").expect("add");

        s.add_work_log_for_subtask(&a.id, 2.0, "finished half", 50, None)
            .expect("log");

        assert_eq!(s.get_subtask(&a.id).expect("get").completion, 50);
        assert_eq!(
            s.get_task(&task_id).expect("get").completion,
            Completion::Aggregated(25)
        );
    }

    #[test]
    fn logs_read_newest_first_even_when_back_dated() {
        let (s, task_id) = store_with_task();
        let yesterday = Utc.with_ymd_and_hms(2026, 8, 25, 9, 0, 0).single();
        let last_week = Utc.with_ymd_and_hms(2026, 8, 19, 17, 30, 0).single();

        s.add_work_log_for_task(&task_id, 1.0, "older entry", 10, last_week)
            .expect("log");
        let newest = s
            .add_work_log_for_task(&task_id, 1.0, "current entry", 30, None)
            .expect("log");
        s.add_work_log_for_task(&task_id, 1.0, "middle entry", 20, yesterday)
            .expect("log");

        let descriptions: Vec<String> = s
            .get_work_logs_for_task(&task_id)
            .expect("logs")
            .into_iter()
            .map(|l| l.work_description)
            .collect();
        assert_eq!(descriptions, ["current entry", "middle entry", "older entry"]);
        assert_eq!(newest.created_at.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn task_view_includes_subtask_entries() {
        let (s, task_id) = store_with_task();
        let sub = s.add_subtask(&task_id, "leaf").expect("add");

        s.add_work_log_for_task(&task_id, 1.0, "task-level", 10, None)
            .expect("log");
        s.add_work_log_for_subtask(&sub.id, 1.0, "leaf-level", 20, None)
            .expect("log");

        assert_eq!(s.get_work_logs_for_task(&task_id).expect("logs").len(), 2);
        assert_eq!(s.get_work_logs_for_subtask(&sub.id).expect("logs").len(), 1);
    }

    #[test]
    fn negative_and_non_finite_hours_are_rejected() {
        let (s, task_id) = store_with_task();
        for hours in [-0.5, f64::NAN, f64::INFINITY] {
            let err = s
                .add_work_log_for_task(&task_id, hours, "bad", 10, None)
                .expect_err("should fail");
            assert!(matches!(err, StoreError::InvalidInput { field: "hours_worked", .. }));
        }
    }

    #[test]
    fn logging_against_a_missing_owner_is_not_found() {
        let (s, _) = store_with_task();
        let err = s
            .add_work_log_for_subtask("no-such-subtask", 1.0, "x", 10, None)
            .expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
