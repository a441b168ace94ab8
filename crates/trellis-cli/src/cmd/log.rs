//! `trl log` — append a work-log entry.

use crate::cmd::{open_store, try_store};
use crate::output::{CliError, OutputMode, render, render_error};
use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::Path;
use trellis_core::error::ErrorCode;

#[derive(Args, Debug)]
pub struct LogArgs {
    #[command(subcommand)]
    pub target: LogTarget,
}

#[derive(Subcommand, Debug)]
pub enum LogTarget {
    /// Log work against a task. The estimate writes through to the task's
    /// completion unless the task aggregates from subtasks.
    Task {
        /// Task ID.
        id: String,

        #[command(flatten)]
        entry: EntryArgs,
    },
    /// Log work against a subtask; the estimate writes through to the
    /// subtask and the parent task re-aggregates.
    Subtask {
        /// Subtask ID.
        id: String,

        #[command(flatten)]
        entry: EntryArgs,
    },
}

#[derive(Args, Debug)]
pub struct EntryArgs {
    /// Hours spent.
    #[arg(long)]
    pub hours: f64,

    /// Completion estimate after this work (0-100).
    #[arg(long)]
    pub estimate: u8,

    /// What was done.
    #[arg(long, default_value = "")]
    pub note: String,

    /// Back-date the entry to this RFC3339 timestamp.
    #[arg(long, value_name = "RFC3339")]
    pub at: Option<String>,
}

fn parse_at(at: Option<&str>) -> anyhow::Result<Option<DateTime<Utc>>> {
    at.map(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|ts| ts.with_timezone(&Utc))
            .with_context(|| format!("invalid --at timestamp: {raw}"))
    })
    .transpose()
}

pub fn run_log(args: &LogArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let (id, entry) = match &args.target {
        LogTarget::Task { id, entry } | LogTarget::Subtask { id, entry } => (id, entry),
    };

    let at = match parse_at(entry.at.as_deref()) {
        Ok(at) => at,
        Err(e) => {
            render_error(
                output,
                &CliError::with_details(
                    e.to_string(),
                    "Use RFC3339, e.g. 2026-08-26T12:00:00Z",
                    ErrorCode::ValueOutOfRange.code(),
                ),
            )?;
            return Err(e);
        }
    };

    let store = open_store(db_path, output)?;

    let log = match &args.target {
        LogTarget::Task { .. } => try_store(
            store.add_work_log_for_task(id, entry.hours, &entry.note, entry.estimate, at),
            output,
        )?,
        LogTarget::Subtask { .. } => try_store(
            store.add_work_log_for_subtask(id, entry.hours, &entry.note, entry.estimate, at),
            output,
        )?,
    };

    render(output, &log, |log, w| {
        let scope = log
            .subtask_id
            .as_ref()
            .map_or_else(|| format!("task {}", log.task_id), |s| format!("subtask {s}"));
        writeln!(
            w,
            "✓ Logged {:.2}h on {scope} (estimate {}%)",
            log.hours_worked, log.completion_estimate
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_task_parses_required_flags() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: LogArgs,
        }

        let w = Wrapper::parse_from([
            "test", "task", "task-1", "--hours", "2.5", "--estimate", "60",
        ]);
        match w.args.target {
            LogTarget::Task { id, entry } => {
                assert_eq!(id, "task-1");
                assert!((entry.hours - 2.5).abs() < f64::EPSILON);
                assert_eq!(entry.estimate, 60);
                assert_eq!(entry.note, "");
                assert!(entry.at.is_none());
            }
            other => panic!("unexpected target: {other:?}"),
        }
    }

    #[test]
    fn log_requires_hours_and_estimate() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: LogArgs,
        }

        assert!(Wrapper::try_parse_from(["test", "task", "task-1"]).is_err());
        assert!(Wrapper::try_parse_from(["test", "task", "task-1", "--hours", "1"]).is_err());
    }

    #[test]
    fn log_subtask_accepts_note_and_backdate() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: LogArgs,
        }

        let w = Wrapper::parse_from([
            "test",
            "subtask",
            "sub-1",
            "--hours",
            "0.5",
            "--estimate",
            "100",
            "--note",
            "polished it off",
            "--at",
            "2026-08-25T09:00:00Z",
        ]);
        match w.args.target {
            LogTarget::Subtask { id, entry } => {
                assert_eq!(id, "sub-1");
                assert_eq!(entry.note, "polished it off");
                assert_eq!(entry.at.as_deref(), Some("2026-08-25T09:00:00Z"));
            }
            other => panic!("unexpected target: {other:?}"),
        }
    }

    #[test]
    fn parse_at_accepts_rfc3339_with_offset() {
        let parsed = parse_at(Some("2026-08-26T14:30:00+02:00")).expect("parse");
        let ts = parsed.expect("some");
        assert_eq!(ts.to_rfc3339(), "2026-08-26T12:30:00+00:00");
    }

    #[test]
    fn parse_at_rejects_garbage() {
        assert!(parse_at(Some("yesterday")).is_err());
    }

    #[test]
    fn parse_at_none_passes_through() {
        assert!(parse_at(None).expect("parse").is_none());
    }
}
