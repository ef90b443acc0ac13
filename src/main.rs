use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use ivm_report::export::{ExportOptions, ExportSummary, Exporter};
use ivm_report::models::Team;
use ivm_report::pdf_generator::RenderOptions;
use ivm_report::source::{FileReportSource, HttpReportSource, ReportSource, DEFAULT_API_URL};

#[derive(Parser, Debug)]
#[clap(
    name = "ivm-report",
    version = "0.1.0",
    about = "Generate IVM security status reports as PDF",
    long_about = None
)]
struct Args {
    /// Team to export (application, infrastructure, offensive, cti, bas)
    #[arg(short = 't', long, conflicts_with = "consolidated", required_unless_present = "consolidated")]
    team: Option<Team>,

    /// Export one document covering every team
    #[arg(short = 'c', long)]
    consolidated: bool,

    /// Base URL of the dashboard API
    #[arg(short = 'a', long, default_value = DEFAULT_API_URL, conflicts_with = "data_dir")]
    api_url: String,

    /// Read <team>.json and <team>.settings.json from this directory instead of the API
    #[arg(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// Directory the PDF is written to
    #[arg(short = 'o', long, default_value = ".")]
    output_dir: PathBuf,

    /// Lay the document out and report its page count without writing it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    let options = ExportOptions {
        output_dir: args.output_dir.clone(),
        dry_run: args.dry_run,
        render: RenderOptions::default(),
    };

    let summary = match &args.data_dir {
        Some(dir) => run(Exporter::new(FileReportSource::new(dir), options), &args).await?,
        None => run(Exporter::new(HttpReportSource::new(&args.api_url), options), &args).await?,
    };

    match summary.path {
        Some(path) => info!("✓ {} ({} pages)", path.display(), summary.pages),
        None => info!("✓ {} would be written ({} pages)", summary.filename, summary.pages),
    }
    Ok(())
}

async fn run<S: ReportSource>(exporter: Exporter<S>, args: &Args) -> Result<ExportSummary> {
    if args.consolidated {
        return exporter
            .export_consolidated()
            .await
            .context("Failed to export consolidated report");
    }

    let team = args.team.context("No team selected")?;
    exporter
        .export_team(team)
        .await
        .context(format!("Failed to export {} report", team.label()))
}
