//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: readable text for terminals, stable JSON for scripts and
//! agents. Errors render to stderr as `{"error": {...}}` in JSON mode.

use serde::Serialize;
use std::io::{self, Write};
use trellis_core::StoreError;
use trellis_core::model::{Category, Subtask, Task, WorkLog};

/// Shared width for horizontal separators in human output.
pub const RULE_WIDTH: usize = 68;

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per result, or a JSON array).
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. `E2001`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create a simple error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// Create an error with a suggestion and error code.
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }
}

/// Convert a [`StoreError`] into a [`CliError`], carrying its stable code.
impl From<&StoreError> for CliError {
    fn from(err: &StoreError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.suggestion().map(str::to_owned),
            error_code: Some(err.error_code().code().to_owned()),
        }
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In human mode,
/// the provided `human_fn` closure produces the text output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render a success message to stdout.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "ok": true,
                "message": message,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "✓ {message}")?;
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Human tree and ledger rendering, shared by list/show/logs
// ────────────────────────────────────────────────────────────────────────────

/// Write a horizontal separator.
pub fn write_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

/// Render a left-aligned key/value line.
pub fn write_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<13} {}", format!("{key}:"), value.as_ref())
}

const fn visibility_label(public: bool) -> &'static str {
    if public { "public" } else { "private" }
}

/// One line per category, with its average completion and task tree.
pub fn write_tree(w: &mut dyn Write, categories: &[Category]) -> io::Result<()> {
    for cat in categories {
        write_category_line(w, cat)?;
        for task in &cat.tasks {
            write_task_line(w, task)?;
            for sub in &task.subtasks {
                write_subtask_line(w, sub)?;
            }
        }
    }
    Ok(())
}

pub fn write_category_line(w: &mut dyn Write, cat: &Category) -> io::Result<()> {
    writeln!(
        w,
        "{}  [avg {:>3}%]  {}  {}",
        cat.name,
        cat.average_completion(),
        visibility_label(cat.public),
        cat.id
    )
}

pub fn write_task_line(w: &mut dyn Write, task: &Task) -> io::Result<()> {
    writeln!(
        w,
        "  [{:>3}%] {}  {}",
        task.completion.value(),
        task.name,
        task.id
    )
}

pub fn write_subtask_line(w: &mut dyn Write, sub: &Subtask) -> io::Result<()> {
    writeln!(w, "      [{:>3}%] {}  {}", sub.completion, sub.name, sub.id)
}

/// One ledger entry per line, timestamp first.
pub fn write_work_log_line(w: &mut dyn Write, log: &WorkLog) -> io::Result<()> {
    writeln!(
        w,
        "{}  {:>7.2}h  est {:>3}%  {}",
        log.created_at.to_rfc3339(),
        log.hours_worked,
        log.completion_estimate,
        log.work_description
    )
}
