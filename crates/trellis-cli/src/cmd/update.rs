//! `trl update` — field updates with read-modify-write semantics.
//!
//! Flags that are omitted keep the node's current values, so a bare
//! `trl update task <ID> --name "New"` touches nothing else.

use crate::cmd::{open_store, try_store};
use crate::output::{OutputMode, render};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;
use trellis_core::model::Completion;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    #[command(subcommand)]
    pub target: UpdateTarget,
}

/// Fields common to all three node levels.
#[derive(Args, Debug)]
pub struct CommonFields {
    /// New name.
    #[arg(long)]
    pub name: Option<String>,

    /// New description.
    #[arg(long)]
    pub description: Option<String>,

    /// New visibility: `true` for public, `false` for private.
    #[arg(long, value_name = "BOOL")]
    pub public: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum UpdateTarget {
    /// Update a category's fields.
    Category {
        /// Category ID.
        id: String,

        #[command(flatten)]
        fields: CommonFields,
    },
    /// Update a task's fields. A completion set here is overridden by the
    /// subtask aggregate while the task has subtasks.
    Task {
        /// Task ID.
        id: String,

        #[command(flatten)]
        fields: CommonFields,

        /// New completion percentage (0-100).
        #[arg(long)]
        completion: Option<u8>,
    },
    /// Update a subtask's fields; the parent task re-aggregates.
    Subtask {
        /// Subtask ID.
        id: String,

        #[command(flatten)]
        fields: CommonFields,

        /// New completion percentage (0-100).
        #[arg(long)]
        completion: Option<u8>,
    },
}

pub fn run_update(args: &UpdateArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let store = open_store(db_path, output)?;

    match &args.target {
        UpdateTarget::Category { id, fields } => {
            let mut cat = try_store(store.get_category(id), output)?;
            apply_common(&mut cat.name, &mut cat.description, &mut cat.public, fields);
            let cat = try_store(store.update_category(&cat), output)?;
            render(output, &cat, |cat, w| {
                writeln!(w, "✓ Updated category \"{}\"", cat.name)
            })
        }
        UpdateTarget::Task {
            id,
            fields,
            completion,
        } => {
            let mut task = try_store(store.get_task(id), output)?;
            apply_common(
                &mut task.name,
                &mut task.description,
                &mut task.public,
                fields,
            );
            if let Some(pct) = *completion {
                task.completion = Completion::Independent(pct);
            }
            let task = try_store(store.update_task(&task), output)?;
            render(output, &task, |task, w| {
                writeln!(
                    w,
                    "✓ Updated task \"{}\" (completion {}%)",
                    task.name,
                    task.completion.value()
                )
            })
        }
        UpdateTarget::Subtask {
            id,
            fields,
            completion,
        } => {
            let mut sub = try_store(store.get_subtask(id), output)?;
            apply_common(&mut sub.name, &mut sub.description, &mut sub.public, fields);
            if let Some(pct) = *completion {
                sub.completion = pct;
            }
            let sub = try_store(store.update_subtask(&sub), output)?;
            render(output, &sub, |sub, w| {
                writeln!(
                    w,
                    "✓ Updated subtask \"{}\" (completion {}%)",
                    sub.name, sub.completion
                )
            })
        }
    }
}

fn apply_common(name: &mut String, description: &mut String, public: &mut bool, f: &CommonFields) {
    if let Some(v) = &f.name {
        name.clone_from(v);
    }
    if let Some(v) = &f.description {
        description.clone_from(v);
    }
    if let Some(v) = f.public {
        *public = v;
    }
}
