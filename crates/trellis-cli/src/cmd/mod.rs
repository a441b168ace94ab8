//! Subcommand implementations for the `trl` binary.

pub mod add;
pub mod completions;
pub mod delete;
pub mod init;
pub mod list;
pub mod log;
pub mod logs;
pub mod move_cmd;
pub mod reorder;
pub mod show;
pub mod update;

use crate::output::{CliError, OutputMode, render_error};
use std::path::Path;
use trellis_core::Store;
use trellis_core::error::ErrorCode;

/// Open the store at `db_path`, refusing to create a missing database.
///
/// Every command except `init` goes through here; a missing file renders
/// `E1001` with its hint and aborts.
pub fn open_store(db_path: &Path, output: OutputMode) -> anyhow::Result<Store> {
    if !db_path.exists() {
        let code = ErrorCode::NotInitialized;
        render_error(
            output,
            &CliError::with_details(code.message(), code.hint().unwrap_or_default(), code.code()),
        )?;
        anyhow::bail!("database not found: {}", db_path.display());
    }
    Store::open(db_path)
}

/// Unwrap a store result, rendering a structured error before propagating.
pub fn try_store<T>(result: trellis_core::Result<T>, output: OutputMode) -> anyhow::Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            Err(e.into())
        }
    }
}
