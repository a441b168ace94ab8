//! `trl logs` — the work-log ledger for one node, newest first.
//!
//! Category scope includes every entry logged under the category's tasks
//! and subtasks; task scope includes the task's subtask entries.

use crate::cmd::{open_store, try_store};
use crate::output::{OutputMode, render, write_work_log_line};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub target: LogsTarget,
}

#[derive(Subcommand, Debug)]
pub enum LogsTarget {
    /// All work logged anywhere under a category.
    Category {
        /// Category ID.
        id: String,
    },
    /// All work logged on a task or its subtasks.
    Task {
        /// Task ID.
        id: String,
    },
    /// Work logged directly on a subtask.
    Subtask {
        /// Subtask ID.
        id: String,
    },
}

pub fn run_logs(args: &LogsArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let store = open_store(db_path, output)?;

    let rows = match &args.target {
        LogsTarget::Category { id } => try_store(store.get_work_logs_for_category(id), output)?,
        LogsTarget::Task { id } => try_store(store.get_work_logs_for_task(id), output)?,
        LogsTarget::Subtask { id } => try_store(store.get_work_logs_for_subtask(id), output)?,
    };

    render(output, &rows, |rows, w| {
        if rows.is_empty() {
            return writeln!(w, "(no work logged)");
        }
        for row in rows {
            write_work_log_line(w, row)?;
        }
        Ok(())
    })
}
