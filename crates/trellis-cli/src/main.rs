#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use trellis_core::config;
use trellis_core::error::ErrorCode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "trellis: a tree-structured task tracker with a work-log ledger",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Path to the database file (default: `TRELLIS_DB`, then the user
    /// config, then the platform data directory).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, environment, and user config.
    fn output_mode(&self, user_output: Option<&str>) -> OutputMode {
        let env_format = env::var("FORMAT").ok();
        if config::resolve_output(self.json, env_format.as_deref(), user_output) == "json" {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Lifecycle",
        about = "Create the database",
        long_about = "Create the trellis database, running any pending migrations.",
        after_help = "EXAMPLES:\n    # Create an empty database\n    trl init\n\n    # Create a database seeded with a small sample tree\n    trl init --sample\n\n    # Start over\n    trl init --force"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show the full tree",
        long_about = "Show every category with its tasks, subtasks, and per-category average completion.",
        after_help = "EXAMPLES:\n    # The whole board\n    trl list\n\n    # What an unauthenticated reader would see\n    trl list --as-public\n\n    # Emit machine-readable output\n    trl list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one node in detail",
        long_about = "Show a category, task, or subtask with its descendants and its work-log view.",
        after_help = "EXAMPLES:\n    # Show a task with its subtasks and ledger\n    trl show task 4f8d1c2e-...\n\n    # Emit machine-readable output\n    trl show category 9a31e0b7-... --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Add a category, task, or subtask",
        long_about = "Add a node. Categories go to the front of the board; tasks and subtasks append after their siblings.",
        after_help = "EXAMPLES:\n    # A new category, then a task under it\n    trl add category \"Work\"\n    trl add task --category <CATEGORY_ID> \"Finish report\"\n\n    # A subtask (switches the task to aggregated completion)\n    trl add subtask --task <TASK_ID> \"Draft the outline\""
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Update fields on a node",
        long_about = "Update name, description, visibility, or completion. Omitted flags keep current values.",
        after_help = "EXAMPLES:\n    # Rename a task\n    trl update task <TASK_ID> --name \"Finish the report\"\n\n    # Set a subtask's completion (the parent re-aggregates)\n    trl update subtask <SUBTASK_ID> --completion 80\n\n    # Make a category visible to unauthenticated readers\n    trl update category <CATEGORY_ID> --public true"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(
        next_help_heading = "Edit",
        about = "Delete a node and its subtree",
        long_about = "Delete a category, task, or subtask. Children and work logs go with it.",
        after_help = "EXAMPLES:\n    # Delete a task, its subtasks, and their work logs\n    trl delete task <TASK_ID>\n\n    # Emit machine-readable output\n    trl delete subtask <SUBTASK_ID> --json"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Ordering",
        about = "Reorder siblings",
        long_about = "Submit a new sibling order. Omitted siblings keep their relative order after the listed ones; foreign IDs are ignored.",
        after_help = "EXAMPLES:\n    # Reorder the board's categories\n    trl reorder categories <ID_A> <ID_B>\n\n    # Reorder tasks within a category\n    trl reorder tasks --category <CATEGORY_ID> <ID_B> <ID_A>"
    )]
    Reorder(cmd::reorder::ReorderArgs),

    #[command(
        next_help_heading = "Ordering",
        about = "Move a task to another category",
        long_about = "Move a task (with its subtasks and work logs) under another category at a given position.",
        after_help = "EXAMPLES:\n    # Move to the front of another category\n    trl move <TASK_ID> --to <CATEGORY_ID>\n\n    # Move to a specific position\n    trl move <TASK_ID> --to <CATEGORY_ID> --index 2"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Ledger",
        about = "Log work against a task or subtask",
        long_about = "Append an immutable work-log entry. Estimates write through to the node's completion; a task that aggregates from subtasks records the entry without applying the estimate.",
        after_help = "EXAMPLES:\n    # Log 2.5 hours on a task\n    trl log task <TASK_ID> --hours 2.5 --estimate 60 --note \"wrote the outline\"\n\n    # Back-date an entry\n    trl log subtask <SUBTASK_ID> --hours 1 --estimate 100 --at 2026-08-25T09:00:00Z"
    )]
    Log(cmd::log::LogArgs),

    #[command(
        next_help_heading = "Ledger",
        about = "Show the ledger for a node",
        long_about = "Show work-log entries newest first. Category scope includes all descendants; task scope includes subtask entries.",
        after_help = "EXAMPLES:\n    # Everything logged under a category\n    trl logs category <CATEGORY_ID>\n\n    # Emit machine-readable output\n    trl logs task <TASK_ID> --json"
    )]
    Logs(cmd::logs::LogsArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    trl completions bash\n\n    # Generate zsh completions\n    trl completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("TRELLIS_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "trellis=debug,info"
        } else {
            "trellis=info,warn"
        })
    });

    let format = env::var("TRELLIS_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let user_config = match config::load_user_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Output mode is unresolved until the config loads; use the flag alone.
            let mode = if cli.json {
                OutputMode::Json
            } else {
                OutputMode::Human
            };
            let code = ErrorCode::ConfigParseError;
            render_error(
                mode,
                &CliError::with_details(
                    format!("{e:#}"),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            return Err(e);
        }
    };

    let output = cli.output_mode(user_config.output.as_deref());

    let db_path = config::resolve_db_path(cli.db.clone(), config::db_path_from_env(), &user_config)
        .ok_or_else(|| {
            anyhow::anyhow!("could not determine a database path; pass --db or set TRELLIS_DB")
        })?;

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, &db_path, cli.quiet),
        Commands::List(ref args) => cmd::list::run_list(args, output, &db_path),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &db_path),
        Commands::Add(ref args) => cmd::add::run_add(args, output, &db_path),
        Commands::Update(ref args) => cmd::update::run_update(args, output, &db_path),
        Commands::Delete(ref args) => cmd::delete::run_delete(args, output, &db_path),
        Commands::Reorder(ref args) => cmd::reorder::run_reorder(args, output, &db_path),
        Commands::Move(ref args) => cmd::move_cmd::run_move(args, output, &db_path),
        Commands::Log(ref args) => cmd::log::run_log(args, output, &db_path),
        Commands::Logs(ref args) => cmd::logs::run_logs(args, output, &db_path),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
