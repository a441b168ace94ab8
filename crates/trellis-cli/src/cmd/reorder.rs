//! `trl reorder` — submit a sibling permutation.
//!
//! Listed IDs take positions in the order given; siblings left out keep
//! their relative order after the listed ones. IDs from other parents are
//! ignored.

use crate::cmd::{open_store, try_store};
use crate::output::{OutputMode, render_success};
use clap::{Args, Subcommand};
use std::path::Path;

#[derive(Args, Debug)]
pub struct ReorderArgs {
    #[command(subcommand)]
    pub target: ReorderTarget,
}

#[derive(Subcommand, Debug)]
pub enum ReorderTarget {
    /// Reorder the top-level categories.
    Categories {
        /// Category IDs in the desired order.
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Reorder the tasks within one category.
    Tasks {
        /// Parent category ID.
        #[arg(long)]
        category: String,

        /// Task IDs in the desired order.
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Reorder the subtasks within one task.
    Subtasks {
        /// Parent task ID.
        #[arg(long)]
        task: String,

        /// Subtask IDs in the desired order.
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

pub fn run_reorder(args: &ReorderArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let store = open_store(db_path, output)?;

    match &args.target {
        ReorderTarget::Categories { ids } => {
            try_store(store.reorder_categories(ids), output)?;
            render_success(output, &format!("Reordered {} categories", ids.len()))
        }
        ReorderTarget::Tasks { category, ids } => {
            try_store(store.reorder_tasks(category, ids), output)?;
            render_success(
                output,
                &format!("Reordered {} tasks in category {category}", ids.len()),
            )
        }
        ReorderTarget::Subtasks { task, ids } => {
            try_store(store.reorder_subtasks(task, ids), output)?;
            render_success(
                output,
                &format!("Reordered {} subtasks in task {task}", ids.len()),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reorder_categories_takes_id_list() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ReorderArgs,
        }

        let w = Wrapper::parse_from(["test", "categories", "c1", "c2", "c3"]);
        match w.args.target {
            ReorderTarget::Categories { ids } => assert_eq!(ids, ["c1", "c2", "c3"]),
            other => panic!("unexpected target: {other:?}"),
        }
    }

    #[test]
    fn reorder_tasks_requires_category_and_ids() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ReorderArgs,
        }

        assert!(Wrapper::try_parse_from(["test", "tasks", "--category", "c1"]).is_err());
        assert!(Wrapper::try_parse_from(["test", "tasks", "t1", "t2"]).is_err());

        let w = Wrapper::parse_from(["test", "tasks", "--category", "c1", "t2", "t1"]);
        match w.args.target {
            ReorderTarget::Tasks { category, ids } => {
                assert_eq!(category, "c1");
                assert_eq!(ids, ["t2", "t1"]);
            }
            other => panic!("unexpected target: {other:?}"),
        }
    }

    #[test]
    fn reorder_subtasks_parses() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ReorderArgs,
        }

        let w = Wrapper::parse_from(["test", "subtasks", "--task", "t1", "s2", "s1"]);
        match w.args.target {
            ReorderTarget::Subtasks { task, ids } => {
                assert_eq!(task, "t1");
                assert_eq!(ids, ["s2", "s1"]);
            }
            other => panic!("unexpected target: {other:?}"),
        }
    }
}
