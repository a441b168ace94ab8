//! `trl move` — move a task to another category.

use crate::cmd::{open_store, try_store};
use crate::output::{OutputMode, render};
use clap::Args;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Task ID to move.
    pub task_id: String,

    /// Destination category ID.
    #[arg(long)]
    pub to: String,

    /// Sibling position in the destination (0 = front).
    #[arg(long, default_value = "0")]
    pub index: i64,
}

/// Move a task, its subtasks, and its work logs under a new category in
/// one transaction.
pub fn run_move(args: &MoveArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let store = open_store(db_path, output)?;
    let task = try_store(store.move_task(&args.task_id, &args.to, args.index), output)?;

    render(output, &task, |task, w| {
        writeln!(
            w,
            "✓ Moved task \"{}\" to category {}",
            task.name, task.category_id
        )
    })
}
