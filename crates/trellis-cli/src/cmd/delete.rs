//! `trl delete` — cascade deletion.

use crate::cmd::{open_store, try_store};
use crate::output::{OutputMode, render};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(subcommand)]
    pub target: DeleteTarget,
}

#[derive(Subcommand, Debug)]
pub enum DeleteTarget {
    /// Delete a category with all of its tasks, subtasks, and work logs.
    Category {
        /// Category ID.
        id: String,
    },
    /// Delete a task with its subtasks and work logs.
    Task {
        /// Task ID.
        id: String,
    },
    /// Delete a subtask with its work logs; the parent task re-aggregates.
    Subtask {
        /// Subtask ID.
        id: String,
    },
}

pub fn run_delete(args: &DeleteArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let store = open_store(db_path, output)?;

    match &args.target {
        DeleteTarget::Category { id } => {
            let cat = try_store(store.delete_category(id), output)?;
            render(output, &cat, |cat, w| {
                writeln!(
                    w,
                    "✓ Deleted category \"{}\" and everything under it",
                    cat.name
                )
            })
        }
        DeleteTarget::Task { id } => {
            let task = try_store(store.delete_task(id), output)?;
            render(output, &task, |task, w| {
                writeln!(w, "✓ Deleted task \"{}\" and its subtasks", task.name)
            })
        }
        DeleteTarget::Subtask { id } => {
            let sub = try_store(store.delete_subtask(id), output)?;
            render(output, &sub, |sub, w| {
                writeln!(w, "✓ Deleted subtask \"{}\"", sub.name)
            })
        }
    }
}
