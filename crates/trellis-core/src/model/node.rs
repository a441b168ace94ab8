//! The three node levels and the work-log record.
//!
//! Field names mirror the persisted JSON contract. `work_logs` is a view
//! field: it stays empty on plain reads and is populated by the ledger
//! queries when a caller assembles a detail view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::completion::{Completion, aggregate};

/// A top-level grouping. Categories have no parent; their `public` flag is
/// authoritative for the whole subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    pub public: bool,
    pub tasks: Vec<Task>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_logs: Vec<WorkLog>,
}

impl Category {
    /// Mean completion across this category's tasks, truncated toward zero.
    /// A category with no tasks reads as 0.
    #[must_use]
    pub fn average_completion(&self) -> u8 {
        let values: Vec<u8> = self.tasks.iter().map(|t| t.completion.value()).collect();
        aggregate(&values)
    }
}

/// A unit of work under a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub completion: Completion,
    pub public: bool,
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_logs: Vec<WorkLog>,
}

/// A leaf under a task. Carries its category id denormalized so
/// category-scoped queries need no join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub task_id: String,
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub completion: u8,
    pub public: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_logs: Vec<WorkLog>,
}

/// One append-only ledger entry. `subtask_id` is `None` for task-level work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkLog {
    pub id: String,
    pub category_id: String,
    pub task_id: String,
    pub subtask_id: Option<String>,
    pub hours_worked: f64,
    pub work_description: String,
    pub completion_estimate: u8,
    pub created_at: DateTime<Utc>,
}
