//! Canonical SQLite schema for the task tree.
//!
//! Four tables, one per entity:
//! - `categories`, `tasks`, `subtasks` form the tree; every level carries a
//!   `sort_order` column and a `public` visibility flag
//! - `subtasks` and `work_logs` denormalize `category_id` so category-scoped
//!   queries need no join through the tree
//! - all foreign keys cascade, so deleting a node removes its whole subtree
//!   and ledger declaratively

/// Migration v1: entity tables plus the work-log lookup indexes.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    public INTEGER NOT NULL DEFAULT 0 CHECK (public IN (0, 1)),
    sort_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    completion INTEGER NOT NULL DEFAULT 0 CHECK (completion BETWEEN 0 AND 100),
    public INTEGER NOT NULL DEFAULT 0 CHECK (public IN (0, 1)),
    sort_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS subtasks (
    id TEXT PRIMARY KEY,
    task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    completion INTEGER NOT NULL DEFAULT 0 CHECK (completion BETWEEN 0 AND 100),
    public INTEGER NOT NULL DEFAULT 0 CHECK (public IN (0, 1)),
    sort_order INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS work_logs (
    id TEXT PRIMARY KEY,
    category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    subtask_id TEXT REFERENCES subtasks(id) ON DELETE CASCADE,
    hours_worked REAL NOT NULL CHECK (hours_worked >= 0),
    work_description TEXT NOT NULL DEFAULT '',
    completion_estimate INTEGER NOT NULL DEFAULT 0
        CHECK (completion_estimate BETWEEN 0 AND 100),
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_work_logs_category ON work_logs(category_id);
CREATE INDEX IF NOT EXISTS idx_work_logs_task ON work_logs(task_id);
CREATE INDEX IF NOT EXISTS idx_work_logs_subtask ON work_logs(subtask_id);
CREATE INDEX IF NOT EXISTS idx_work_logs_created_at ON work_logs(created_at DESC);
";

/// Migration v2: sibling read-path indexes for ordered tree assembly.
pub const MIGRATION_V2_SQL: &str = "
CREATE INDEX IF NOT EXISTS idx_tasks_category_order
    ON tasks(category_id, sort_order);

CREATE INDEX IF NOT EXISTS idx_subtasks_task_order
    ON subtasks(task_id, sort_order);

CREATE INDEX IF NOT EXISTS idx_subtasks_category
    ON subtasks(category_id);
";

/// Indexes expected by ledger and tree-assembly query paths.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_work_logs_category",
    "idx_work_logs_task",
    "idx_work_logs_subtask",
    "idx_work_logs_created_at",
    "idx_tasks_category_order",
    "idx_subtasks_task_order",
    "idx_subtasks_category",
];
