//! `trl add` — create a category, task, or subtask.

use crate::cmd::{open_store, try_store};
use crate::output::{OutputMode, render};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(subcommand)]
    pub target: AddTarget,
}

#[derive(Subcommand, Debug)]
pub enum AddTarget {
    /// Add a category at the front of the board.
    Category {
        /// Category name (a default name is used when omitted).
        name: Option<String>,
    },
    /// Append a task to the end of a category.
    Task {
        /// Parent category ID.
        #[arg(long)]
        category: String,

        /// Task name (a default name is used when omitted).
        name: Option<String>,
    },
    /// Append a subtask to the end of a task. The first subtask switches
    /// the parent's completion to aggregated mode.
    Subtask {
        /// Parent task ID.
        #[arg(long)]
        task: String,

        /// Subtask name (a default name is used when omitted).
        name: Option<String>,
    },
}

pub fn run_add(args: &AddArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let store = open_store(db_path, output)?;

    match &args.target {
        AddTarget::Category { name } => {
            let cat = try_store(store.add_category(name.as_deref().unwrap_or_default()), output)?;
            render(output, &cat, |cat, w| {
                writeln!(w, "✓ Added category \"{}\"  {}", cat.name, cat.id)
            })
        }
        AddTarget::Task { category, name } => {
            let task = try_store(
                store.add_task(category, name.as_deref().unwrap_or_default()),
                output,
            )?;
            render(output, &task, |task, w| {
                writeln!(
                    w,
                    "✓ Added task \"{}\" to category {}  {}",
                    task.name, task.category_id, task.id
                )
            })
        }
        AddTarget::Subtask { task, name } => {
            let sub = try_store(
                store.add_subtask(task, name.as_deref().unwrap_or_default()),
                output,
            )?;
            render(output, &sub, |sub, w| {
                writeln!(
                    w,
                    "✓ Added subtask \"{}\" to task {}  {}",
                    sub.name, sub.task_id, sub.id
                )
            })
        }
    }
}
