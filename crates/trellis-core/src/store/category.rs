//! Category-level operations and full-tree assembly.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{NodeKind, Result, StoreError};
use crate::model::{Category, Completion};

use super::{
    DEFAULT_CATEGORY_NAME, Store, fresh_id, immediate_tx, normalized_name, reorder_scoped, subtask,
    task,
};

impl Store {
    /// The full tree: every category with its tasks and subtasks attached,
    /// each level in ascending `sort_order`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the queries fail.
    pub fn get_categories(&self) -> Result<Vec<Category>> {
        let conn = self.lock();

        let mut categories: Vec<Category> = {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, public
                 FROM categories
                 ORDER BY sort_order ASC, id ASC",
            )?;
            let rows = stmt.query_map([], row_to_category)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };

        let mut subtasks_by_task = {
            let mut stmt = conn.prepare(
                "SELECT id, task_id, category_id, name, description, completion, public
                 FROM subtasks
                 ORDER BY sort_order ASC, id ASC",
            )?;
            let rows = stmt.query_map([], subtask::row_to_subtask)?;
            let mut grouped: HashMap<String, Vec<_>> = HashMap::new();
            for sub in rows {
                let sub = sub?;
                grouped.entry(sub.task_id.clone()).or_default().push(sub);
            }
            grouped
        };

        let mut tasks_by_category = {
            let mut stmt = conn.prepare(
                "SELECT id, category_id, name, description, completion, public
                 FROM tasks
                 ORDER BY sort_order ASC, id ASC",
            )?;
            let rows = stmt.query_map([], task::row_to_task)?;
            let mut grouped: HashMap<String, Vec<_>> = HashMap::new();
            for row in rows {
                let mut task = row?;
                if let Some(subs) = subtasks_by_task.remove(&task.id) {
                    task.subtasks = subs;
                }
                task.completion =
                    Completion::from_stored(task.completion.value(), !task.subtasks.is_empty());
                grouped
                    .entry(task.category_id.clone())
                    .or_default()
                    .push(task);
            }
            grouped
        };

        for category in &mut categories {
            if let Some(tasks) = tasks_by_category.remove(&category.id) {
                category.tasks = tasks;
            }
        }

        Ok(categories)
    }

    /// One category with its subtree attached.
    ///
    /// # Errors
    ///
    /// `NotFound` if no category has this id.
    pub fn get_category(&self, id: &str) -> Result<Category> {
        let conn = self.lock();
        category_by_id(&conn, id)
    }

    /// Insert a new category at the top of the list.
    ///
    /// New categories take `min(sort_order) - 1` so the most recent one
    /// surfaces first. An empty name falls back to the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_category(&self, name: &str) -> Result<Category> {
        let name = normalized_name(name, DEFAULT_CATEGORY_NAME);
        let id = fresh_id();

        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;

        let min_order: Option<i64> =
            tx.query_row("SELECT MIN(sort_order) FROM categories", [], |row| {
                row.get(0)
            })?;
        let sort_order = min_order.unwrap_or(0) - 1;

        tx.execute(
            "INSERT INTO categories (id, name, sort_order) VALUES (?1, ?2, ?3)",
            params![id, name, sort_order],
        )?;
        tx.commit()?;

        tracing::debug!(category_id = %id, sort_order, "category added");

        Ok(Category {
            id,
            name,
            description: String::new(),
            public: false,
            tasks: Vec::new(),
            work_logs: Vec::new(),
        })
    }

    /// Full-record replace of name, description, and visibility.
    ///
    /// # Errors
    ///
    /// `NotFound` if no category has this id.
    pub fn update_category(&self, cat: &Category) -> Result<Category> {
        let conn = self.lock();

        let mut updated = conn
            .query_row(
                "UPDATE categories
                 SET name = ?1, description = ?2, public = ?3
                 WHERE id = ?4
                 RETURNING id, name, description, public",
                params![cat.name, cat.description, cat.public, cat.id],
                row_to_category,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(NodeKind::Category, &cat.id))?;

        updated.tasks = task::tasks_for_category(&conn, &updated.id)?;
        Ok(updated)
    }

    /// Remove a category and, through cascade, its whole subtree and ledger.
    ///
    /// # Errors
    ///
    /// `NotFound` if no category has this id.
    pub fn delete_category(&self, id: &str) -> Result<Category> {
        let conn = self.lock();

        let removed = conn
            .query_row(
                "DELETE FROM categories
                 WHERE id = ?1
                 RETURNING id, name, description, public",
                params![id],
                row_to_category,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found(NodeKind::Category, id))?;

        tracing::debug!(category_id = %id, "category deleted");
        Ok(removed)
    }

    /// Rewrite category order from a caller-supplied permutation. Omitted
    /// categories are appended after the listed ones in their prior order.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub fn reorder_categories(&self, ids: &[String]) -> Result<()> {
        let mut conn = self.lock();
        let tx = immediate_tx(&mut conn)?;
        reorder_scoped(&tx, "categories", None, ids)?;
        tx.commit()?;

        tracing::debug!(count = ids.len(), "categories reordered");
        Ok(())
    }
}

pub(super) fn category_by_id(conn: &Connection, id: &str) -> Result<Category> {
    let mut category = conn
        .query_row(
            "SELECT id, name, description, public
             FROM categories
             WHERE id = ?1",
            params![id],
            row_to_category,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found(NodeKind::Category, id))?;

    category.tasks = task::tasks_for_category(conn, id)?;
    Ok(category)
}

pub(super) fn category_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
}

pub(super) fn row_to_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        public: row.get(3)?,
        tasks: Vec::new(),
        work_logs: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use crate::error::StoreError;
    use crate::store::{DEFAULT_CATEGORY_NAME, Store};

    fn store() -> Store {
        Store::open_in_memory().expect("open in-memory store")
    }

    #[test]
    fn new_categories_surface_first() {
        let s = store();
        s.add_category("oldest").expect("add");
        s.add_category("middle").expect("add");
        s.add_category("newest").expect("add");

        let names: Vec<String> = s
            .get_categories()
            .expect("list")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["newest", "middle", "oldest"]);
    }

    #[test]
    fn blank_name_falls_back_to_default() {
        let s = store();
        let cat = s.add_category("   ").expect("add");
        assert_eq!(cat.name, DEFAULT_CATEGORY_NAME);
    }

    #[test]
    fn update_replaces_the_record() {
        let s = store();
        let mut cat = s.add_category("before").expect("add");
        cat.name = "after".into();
        cat.description = "now with a description".into();
        cat.public = true;

        let updated = s.update_category(&cat).expect("update");
        assert_eq!(updated.name, "after");
        assert!(updated.public);

        let read_back = s.get_category(&cat.id).expect("get");
        assert_eq!(read_back.description, "now with a description");
    }

    #[test]
    fn update_of_missing_category_is_not_found() {
        let s = store();
        let mut ghost = s.add_category("x").expect("add");
        s.delete_category(&ghost.id).expect("delete");
        ghost.name = "still here?".into();

        let err = s.update_category(&ghost).expect_err("should fail");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn reorder_applies_a_full_permutation() {
        let s = store();
        let a = s.add_category("a").expect("add");
        let b = s.add_category("b").expect("add");
        let c = s.add_category("c").expect("add");

        s.reorder_categories(&[b.id.clone(), c.id.clone(), a.id.clone()])
            .expect("reorder");

        let names: Vec<String> = s
            .get_categories()
            .expect("list")
            .into_iter()
            .map(|cat| cat.name)
            .collect();
        assert_eq!(names, ["b", "c", "a"]);
    }

    #[test]
    fn reorder_appends_omitted_categories_in_prior_order() {
        let s = store();
        let a = s.add_category("a").expect("add");
        let b = s.add_category("b").expect("add");
        let c = s.add_category("c").expect("add");
        let d = s.add_category("d").expect("add");
        // Current view order is d, c, b, a.

        s.reorder_categories(&[a.id.clone(), b.id.clone()])
            .expect("reorder");

        let names: Vec<String> = s
            .get_categories()
            .expect("list")
            .into_iter()
            .map(|cat| cat.name)
            .collect();
        assert_eq!(names, ["a", "b", "d", "c"]);
        let _ = (c, d);
    }

    #[test]
    fn reorder_ignores_foreign_and_duplicate_ids() {
        let s = store();
        let a = s.add_category("a").expect("add");
        let b = s.add_category("b").expect("add");

        s.reorder_categories(&[
            "not-a-category".into(),
            a.id.clone(),
            a.id.clone(),
            b.id.clone(),
        ])
        .expect("reorder");

        let names: Vec<String> = s
            .get_categories()
            .expect("list")
            .into_iter()
            .map(|cat| cat.name)
            .collect();
        assert_eq!(names, ["a", "b"]);
    }
}
