//! `trl list` — the full tree with per-category average completion.

use crate::cmd::{open_store, try_store};
use crate::output::{OutputMode, render, write_tree};
use clap::Args;
use std::io::Write;
use std::path::Path;
use trellis_core::visibility::filter_visible;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Render what an unauthenticated reader would see: only nodes marked
    /// public, pruned top-down.
    #[arg(long)]
    pub as_public: bool,
}

pub fn run_list(args: &ListArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let store = open_store(db_path, output)?;
    let categories = try_store(store.get_categories(), output)?;
    let categories = filter_visible(categories, !args.as_public);

    render(output, &categories, |cats, w| {
        if cats.is_empty() {
            return writeln!(w, "(no categories)");
        }
        write_tree(w, cats)
    })
}
