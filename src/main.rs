//! Command-line front end of the merger.

use anyhow::Context as _;
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use draft_roll_merger::conf::CLEANED_FOLDER;
use draft_roll_merger::conf::FINAL_OUTPUT;
use draft_roll_merger::conf::INPUT_FOLDER;
use draft_roll_merger::conf::TARGET_SHEET_NAME;
use draft_roll_merger::pipeline::mirror::merge_with_mirror;
use draft_roll_merger::pipeline::sink;
use draft_roll_merger::pipeline::source::read_files;
use draft_roll_merger::pipeline::source::scan_directory;
use draft_roll_merger::pipeline::MergeOptions;
use draft_roll_merger::pipeline::MergeReport;
use draft_roll_merger::pipeline::Merger;
use draft_roll_merger::SheetLocator;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "draft-roll-merger",
    version,
    about = "Merge the Draft Roll Control Chart sheet of many Excel files into one",
    after_help = "EXAMPLES:\n  \
                  # Merge uploaded files, tagging rows with the name before -Format-A1\n  \
                  draft-roll-merger --tag files a.xlsx b.xlsx --output merged.xlsx\n\n  \
                  # Merge every workbook in ./data-a1, detecting the sheet by name\n  \
                  draft-roll-merger --auto-sheet folder\n\n  \
                  # Trim every sheet into ./cleaned first, then merge\n  \
                  draft-roll-merger clean --base-dir /srv/scripts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use the first sheet whose name contains "draft" and "roll"
    #[arg(long, global = true, conflicts_with = "sheet")]
    auto_sheet: bool,

    /// Exact name of the sheet to read
    #[arg(long, global = true, value_name = "NAME")]
    sheet: Option<String>,

    /// Prepend a "Panchayat Name" column derived from each file name
    #[arg(long, global = true)]
    tag: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge the given files, read into memory
    Files {
        /// Workbooks to merge, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output path, or "-" for stdout
        #[arg(short, long, default_value = FINAL_OUTPUT)]
        output: PathBuf,
    },

    /// Merge every workbook of a folder
    Folder(FolderArgs),

    /// Trim every workbook into a cleaned folder, then merge the cleaned copies
    Clean {
        #[command(flatten)]
        folder: FolderArgs,

        /// Folder receiving the trimmed copies, relative to the base directory
        #[arg(long, default_value = CLEANED_FOLDER)]
        cleaned: PathBuf,
    },
}

#[derive(Args)]
struct FolderArgs {
    /// Directory the other paths are relative to
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,

    /// Folder scanned for .xlsx files
    #[arg(long, default_value = INPUT_FOLDER)]
    input: PathBuf,

    /// Merged workbook path
    #[arg(short, long, default_value = FINAL_OUTPUT)]
    output: PathBuf,
}

impl Cli {
    fn options(&self) -> MergeOptions {
        let locator = if self.auto_sheet {
            SheetLocator::AutoDetect
        } else {
            SheetLocator::Fixed(self.sheet.clone().unwrap_or_else(|| TARGET_SHEET_NAME.to_owned()))
        };
        MergeOptions {
            locator,
            tag: self.tag,
            ..MergeOptions::default()
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = cli.options();
    match &cli.command {
        Commands::Files { files, output } => {
            let sources = read_files(files)?;
            let report = Merger::new(options)?.run(&sources)?;
            let bytes = sink::serialize(&report.table)?;
            if output.as_os_str() == "-" {
                std::io::stdout()
                    .lock()
                    .write_all(&bytes)
                    .context("Failed to write merged workbook to stdout")?;
                summarize(&report, "stdout");
            } else {
                std::fs::write(output, &bytes)
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                summarize(&report, &output.display().to_string());
            }
        }
        Commands::Folder(folder) => {
            let sources = scan_directory(&folder.base_dir.join(&folder.input))?;
            info!(files = sources.len(), "Found Excel files");
            let report = Merger::new(options)?.run(&sources)?;
            save(&report, &folder.base_dir.join(&folder.output))?;
        }
        Commands::Clean { folder, cleaned } => {
            let sources = scan_directory(&folder.base_dir.join(&folder.input))?;
            info!(files = sources.len(), "Found Excel files");
            let report = merge_with_mirror(&options, &sources, &folder.base_dir.join(cleaned))?;
            save(&report, &folder.base_dir.join(&folder.output))?;
        }
    }
    Ok(())
}

fn save(report: &MergeReport, path: &Path) -> Result<()> {
    sink::save(&report.table, path)?;
    summarize(report, &path.display().to_string());
    Ok(())
}

fn summarize(report: &MergeReport, destination: &str) {
    info!(
        total_rows = report.total_rows(),
        files_processed = report.files_seen,
        files_merged = report.files_merged,
        skipped = report.warnings.len(),
        output = destination,
        "Merge completed successfully"
    );
}
