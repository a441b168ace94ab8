//! `trl init` — create the database.

use anyhow::{Context as _, Result};
use clap::Args;
use std::path::Path;
use trellis_core::Store;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Seed the fresh database with a small sample tree.
    #[arg(long)]
    pub sample: bool,

    /// Re-initialize even if the database file already exists.
    #[arg(long)]
    pub force: bool,
}

/// Execute `trl init`. Creates the SQLite database and runs migrations;
/// with `--sample`, seeds two categories of example data.
///
/// # Errors
///
/// Returns an error if the database already exists and `--force` is not
/// set, or if any filesystem or database operation fails.
pub fn run_init(args: &InitArgs, db_path: &Path, quiet: bool) -> Result<()> {
    if db_path.exists() {
        if !args.force {
            anyhow::bail!(
                "{} already exists. Use `trl init --force` to start over.",
                db_path.display()
            );
        }
        remove_database_files(db_path)?;
    }

    let store = Store::open(db_path)?;
    if args.sample {
        store.seed_sample()?;
    }

    println!("✓ Initialized trellis database at {}", db_path.display());
    if !quiet {
        println!();
        println!("Next steps:");
        println!("  Add a category:   trl add category \"Work\"");
        println!("  Add a task:       trl add task --category <ID> \"Finish report\"");
        println!("  See the tree:     trl list");
    }
    Ok(())
}

/// Remove the database plus its WAL sidecar files, so a forced re-init
/// cannot replay a stale write-ahead log into the fresh database.
fn remove_database_files(db_path: &Path) -> Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let mut path = db_path.as_os_str().to_owned();
        path.push(suffix);
        let path = Path::new(&path);
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(())
}
