//! `trl show` — one node with its descendants and work-log view.
//!
//! The node's `work_logs` field is populated from the ledger before
//! rendering, so the JSON output is a self-contained detail view.

use crate::cmd::{open_store, try_store};
use crate::output::{
    OutputMode, render, write_kv, write_rule, write_subtask_line, write_task_line,
    write_work_log_line,
};
use clap::{Args, Subcommand};
use std::io::{self, Write};
use std::path::Path;
use trellis_core::model::WorkLog;

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(subcommand)]
    pub target: ShowTarget,
}

#[derive(Subcommand, Debug)]
pub enum ShowTarget {
    /// Show a category, its tasks, and the category-wide ledger.
    Category {
        /// Category ID.
        id: String,
    },
    /// Show a task, its subtasks, and its ledger (subtask entries included).
    Task {
        /// Task ID.
        id: String,
    },
    /// Show a subtask and its ledger.
    Subtask {
        /// Subtask ID.
        id: String,
    },
}

pub fn run_show(args: &ShowArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let store = open_store(db_path, output)?;

    match &args.target {
        ShowTarget::Category { id } => {
            let mut cat = try_store(store.get_category(id), output)?;
            cat.work_logs = try_store(store.get_work_logs_for_category(id), output)?;

            render(output, &cat, |cat, w| {
                write_kv(w, "category", &cat.name)?;
                write_kv(w, "id", &cat.id)?;
                write_kv(w, "visibility", visibility(cat.public))?;
                write_kv(w, "average", format!("{}%", cat.average_completion()))?;
                if !cat.description.is_empty() {
                    write_kv(w, "description", &cat.description)?;
                }
                write_rule(w)?;
                for task in &cat.tasks {
                    write_task_line(w, task)?;
                    for sub in &task.subtasks {
                        write_subtask_line(w, sub)?;
                    }
                }
                write_ledger(w, &cat.work_logs)
            })
        }
        ShowTarget::Task { id } => {
            let mut task = try_store(store.get_task(id), output)?;
            task.work_logs = try_store(store.get_work_logs_for_task(id), output)?;

            render(output, &task, |task, w| {
                write_kv(w, "task", &task.name)?;
                write_kv(w, "id", &task.id)?;
                write_kv(w, "category", &task.category_id)?;
                write_kv(w, "visibility", visibility(task.public))?;
                let completion = if task.completion.is_aggregated() {
                    format!(
                        "{}% (aggregated from {} subtasks)",
                        task.completion.value(),
                        task.subtasks.len()
                    )
                } else {
                    format!("{}%", task.completion.value())
                };
                write_kv(w, "completion", completion)?;
                if !task.description.is_empty() {
                    write_kv(w, "description", &task.description)?;
                }
                if !task.subtasks.is_empty() {
                    write_rule(w)?;
                    for sub in &task.subtasks {
                        write_subtask_line(w, sub)?;
                    }
                }
                write_ledger(w, &task.work_logs)
            })
        }
        ShowTarget::Subtask { id } => {
            let mut sub = try_store(store.get_subtask(id), output)?;
            sub.work_logs = try_store(store.get_work_logs_for_subtask(id), output)?;

            render(output, &sub, |sub, w| {
                write_kv(w, "subtask", &sub.name)?;
                write_kv(w, "id", &sub.id)?;
                write_kv(w, "task", &sub.task_id)?;
                write_kv(w, "category", &sub.category_id)?;
                write_kv(w, "visibility", visibility(sub.public))?;
                write_kv(w, "completion", format!("{}%", sub.completion))?;
                if !sub.description.is_empty() {
                    write_kv(w, "description", &sub.description)?;
                }
                write_ledger(w, &sub.work_logs)
            })
        }
    }
}

const fn visibility(public: bool) -> &'static str {
    if public { "public" } else { "private" }
}

fn write_ledger(w: &mut dyn Write, logs: &[WorkLog]) -> io::Result<()> {
    write_rule(w)?;
    if logs.is_empty() {
        return writeln!(w, "work log: (empty)");
    }
    writeln!(w, "work log ({} entries, newest first)", logs.len())?;
    for log in logs {
        write_work_log_line(w, log)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_parses_all_three_targets() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ShowArgs,
        }

        let w = Wrapper::parse_from(["test", "category", "cat-1"]);
        assert!(matches!(w.args.target, ShowTarget::Category { ref id } if id == "cat-1"));

        let w = Wrapper::parse_from(["test", "task", "task-1"]);
        assert!(matches!(w.args.target, ShowTarget::Task { ref id } if id == "task-1"));

        let w = Wrapper::parse_from(["test", "subtask", "sub-1"]);
        assert!(matches!(w.args.target, ShowTarget::Subtask { ref id } if id == "sub-1"));
    }

    #[test]
    fn ledger_section_handles_empty() {
        let mut buf = Vec::new();
        write_ledger(&mut buf, &[]).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("work log: (empty)"));
    }
}
