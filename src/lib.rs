//! imlabel: annotation-state tracking for labeling a directory of images.
//!
//! imlabel keeps track of which images under a root directory have been
//! labeled, with which tags, and which labeled images have since vanished
//! from disk. It serves paginated, filtered views over that state and picks
//! the next image to label at random.
//!
//! # Modules
//!
//! - [`catalog`]: Discovery of the labelable images under a root
//! - [`schema`]: The fixed label taxonomy (`labels.json`)
//! - [`store`]: Persisted labels and reconciliation (`annotation.json`)
//! - [`query`]: Counts, filters, pagination and next-item selection
//! - [`workspace`]: The context object tying the above together
//! - [`error`]: Error types for imlabel operations

pub mod catalog;
pub mod error;
pub mod query;
pub mod schema;
pub mod store;
pub mod workspace;

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::LabelerError;
pub use workspace::{SharedWorkspace, Workspace};

use query::PageRequest;

/// The imlabel CLI application.
#[derive(Parser)]
#[command(name = "imlabel")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory containing the images, labels.json and annotation.json.
    #[arg(short, long, env = "IMLABEL_DIRECTORY", required = true)]
    directory: PathBuf,

    /// Output format for reports.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Pick a random unlabeled image.
    Next,
    /// List labeled images, optionally filtered by label.
    Labeled(LabeledArgs),
    /// List unlabeled images.
    Unlabeled(PageArgs),
    /// Show one image with its current labels.
    Show(PathArgs),
    /// Replace the labels of an image.
    Assign(AssignArgs),
    /// Remove the labels of an image.
    Clear(PathArgs),
    /// Delete an image from disk and forget its labels.
    Delete(PathArgs),
    /// Rescan the directory and reconcile the annotation.
    Reload,
    /// Summarize label usage.
    Stats,
    /// Report an image's size and dimensions, or dump its bytes.
    Image(ImageArgs),
}

#[derive(clap::Args)]
struct PageArgs {
    /// Page number (clamped to the available range).
    #[arg(long, allow_negative_numbers = true)]
    page: Option<i64>,

    /// Images per page (clamped to 1..=100, default 25).
    #[arg(long, allow_negative_numbers = true)]
    per_page: Option<i64>,
}

impl PageArgs {
    fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.per_page)
    }
}

#[derive(clap::Args)]
struct LabeledArgs {
    /// Comma-separated labels; images carrying any of them are listed.
    #[arg(long)]
    labels: Option<String>,

    #[command(flatten)]
    paging: PageArgs,
}

#[derive(clap::Args)]
struct PathArgs {
    /// Image path relative to the directory.
    path: String,
}

#[derive(clap::Args)]
struct AssignArgs {
    /// Image path relative to the directory.
    path: String,

    /// Labels to assign; an empty list marks the image as labeled with none.
    labels: Vec<String>,
}

#[derive(clap::Args)]
struct ImageArgs {
    /// Image path relative to the directory.
    path: String,

    /// Write the raw image bytes to stdout instead of a summary.
    #[arg(long)]
    raw: bool,
}

/// Result of a delete, for JSON output.
#[derive(Serialize)]
struct DeleteReport {
    counts: query::Counts,
    deleted: store::ForgetOutcome,
}

/// Run the imlabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelerError> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("imlabel {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Annotation-state tracker for labeling a directory of images.");
        println!();
        println!("Run 'imlabel --help' for usage information.");
        return Ok(());
    };

    let mut workspace = Workspace::open(&cli.directory)?;
    let output = cli.output;

    match command {
        Commands::Next => emit(output, &workspace.next()),
        Commands::Labeled(args) => {
            let selected = args
                .labels
                .as_deref()
                .map(query::parse_label_filter)
                .unwrap_or_else(BTreeSet::new);
            emit(
                output,
                &workspace.list_labeled(&selected, args.paging.request()),
            )
        }
        Commands::Unlabeled(args) => emit(output, &workspace.list_unlabeled(args.request())),
        Commands::Show(args) => emit(output, &workspace.item(&args.path)?),
        Commands::Assign(args) => emit(output, &workspace.assign(&args.path, &args.labels)?),
        Commands::Clear(args) => emit(output, &workspace.clear(&args.path)?),
        Commands::Delete(args) => {
            let (counts, deleted) = workspace.delete(&args.path)?;
            match output {
                OutputFormat::Json => emit_json(&DeleteReport { counts, deleted }),
                OutputFormat::Text => {
                    if deleted.file_deleted {
                        println!("Deleted {}", args.path);
                    } else {
                        println!("No file to delete at {}", args.path);
                    }
                    print!("{}", counts);
                    Ok(())
                }
            }
        }
        Commands::Reload => emit(output, &workspace.reload()?),
        Commands::Stats => emit(output, &workspace.stats()),
        Commands::Image(args) => {
            let payload = workspace.image(&args.path)?;
            if args.raw {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&payload.bytes)?;
                stdout.flush()?;
                Ok(())
            } else {
                emit(output, &payload)
            }
        }
    }
}

fn emit<T>(output: OutputFormat, report: &T) -> Result<(), LabelerError>
where
    T: Serialize + std::fmt::Display,
{
    match output {
        OutputFormat::Json => emit_json(report),
        OutputFormat::Text => {
            print!("{}", report);
            Ok(())
        }
    }
}

fn emit_json<T: Serialize>(report: &T) -> Result<(), LabelerError> {
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::from)?;
    println!("{}", json);
    Ok(())
}
