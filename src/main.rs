use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wsedit::plan::{normalize, WorkItem};
use wsedit::report::{display_path, render_diff};
use wsedit::{
    format_workspace_edit, load_from_path, ActionLog, ApplyConfig, ApplyResult, ConsoleLog,
    DiskFs, EditApplier, NullLog, WorkspaceEdit,
};

#[derive(Parser)]
#[command(name = "wsedit")]
#[command(about = "Apply LSP workspace edits to files on disk", long_about = None)]
#[command(version)]
struct Cli {
    /// Log engine diagnostics to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a workspace edit
    Apply {
        /// WorkspaceEdit JSON file, or `-` for stdin
        edit: PathBuf,

        /// Preview - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        preview: bool,

        /// Show unified diff of text changes
        #[arg(short, long)]
        diff: bool,

        /// Workspace root: relative locations resolve here, nothing outside is touched
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the per-file results as JSON instead of action lines
        #[arg(long)]
        json: bool,
    },

    /// Print a workspace edit in readable form without applying it
    Show {
        /// WorkspaceEdit JSON file, or `-` for stdin
        edit: PathBuf,

        /// Base directory for relative paths (defaults to the current directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            edit,
            preview,
            diff,
            workspace,
            config,
            json,
        } => cmd_apply(&edit, preview, diff, workspace, config, json),

        Commands::Show { edit, workspace } => cmd_show(&edit, workspace),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Helper: Read and parse the WorkspaceEdit payload
fn read_edit(source: &Path) -> Result<WorkspaceEdit> {
    let input = if source == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read workspace edit from stdin")?;
        buf
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))?
    };

    WorkspaceEdit::from_json(&input).context("invalid WorkspaceEdit JSON")
}

/// Resolve the effective config: file values first, then CLI flags
fn resolve_config(
    config_path: Option<PathBuf>,
    preview: bool,
    workspace: Option<PathBuf>,
) -> Result<ApplyConfig> {
    let mut config = match config_path {
        Some(path) => load_from_path(&path)?,
        None => ApplyConfig::default(),
    };

    config.preview |= preview;
    if workspace.is_some() {
        config.workspace_root = workspace;
    }
    Ok(config)
}

fn cmd_apply(
    edit_source: &Path,
    preview: bool,
    show_diff: bool,
    workspace: Option<PathBuf>,
    config_path: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = resolve_config(config_path, preview, workspace)?;
    let edit = read_edit(edit_source)?;
    let base = match &config.workspace_root {
        Some(root) => root
            .canonicalize()
            .with_context(|| format!("workspace root {} does not exist", root.display()))?,
        None => env::current_dir()?,
    };

    let log: &dyn ActionLog = if json { &NullLog } else { &ConsoleLog };
    let applier = EditApplier::new(DiskFs, log, config)?.with_display_base(&base);

    if applier.is_preview() && !json {
        println!("{}", "[PREVIEW - nothing will be modified]".cyan());
    }

    let plan = normalize(&edit);
    let mut results: Vec<ApplyResult> = Vec::with_capacity(plan.len());

    for item in &plan {
        if show_diff && !json {
            print_diff(&applier, item, &base);
        }

        let result = applier.apply_item(item).map_err(|e| {
            if !json {
                eprintln!("{} {}", "✗".red(), e);
                if results.is_empty() {
                    eprintln!("  No files were modified");
                } else {
                    eprintln!(
                        "  {} earlier item(s) were already applied and were not rolled back",
                        results.len()
                    );
                }
            }
            e
        })?;
        results.push(result);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!();
    println!("{}", "Summary:".bold());
    for result in &results {
        println!(
            "  {} {}: {}",
            "✓".green(),
            display_path(&result.file, Some(&base)),
            result.changes
        );
    }
    let total: usize = results.iter().map(|r| r.changes).sum();
    let verb = if applier.is_preview() {
        "would change"
    } else {
        "changed"
    };
    println!(
        "  {} items, {} {}",
        format!("{}", results.len()).green(),
        format!("{}", total).green(),
        verb
    );

    Ok(())
}

/// Helper: Show the diff a text batch will produce
///
/// A batch that cannot be rendered yet (e.g. a file created earlier in the
/// same edit while previewing) is skipped with a warning; the apply step
/// reports real errors.
fn print_diff<L: ActionLog>(applier: &EditApplier<DiskFs, L>, item: &WorkItem<'_>, base: &Path) {
    let WorkItem::TextEdits { location, edits } = item else {
        return;
    };
    if edits.is_empty() {
        return;
    }

    match applier.render_text_edits(location, edits) {
        Ok(rendered) if rendered.original != rendered.edited => {
            let file = display_path(&rendered.file, Some(base));
            print!("{}", render_diff(&file, &rendered.original, &rendered.edited));
        }
        Ok(_) => {}
        Err(e) => eprintln!("{}", format!("Warning: cannot diff {location}: {e}").yellow()),
    }
}

fn cmd_show(edit_source: &Path, workspace: Option<PathBuf>) -> Result<()> {
    let edit = read_edit(edit_source)?;
    let base = match workspace {
        Some(path) => path,
        None => env::current_dir()?,
    };

    print!("{}", format_workspace_edit(&edit, &base));
    Ok(())
}
