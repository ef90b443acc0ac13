use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

use crate::error::ReportError;
use crate::models::Team;
use crate::pdf_generator::{consolidated_filename, team_filename, PdfGenerator, RenderOptions, RenderedReport};
use crate::report_data::TeamReport;
use crate::settings::SectionSettings;
use crate::source::ReportSource;

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    /// Lay documents out without writing anything.
    pub dry_run: bool,
    pub render: RenderOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            dry_run: false,
            render: RenderOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub filename: String,
    /// Written file; `None` for a dry run.
    pub path: Option<PathBuf>,
    pub pages: usize,
}

/// Clears its flag when dropped, whether the export succeeded or not.
struct InProgress<'a>(&'a AtomicBool);

impl<'a> InProgress<'a> {
    fn acquire(flag: &'a AtomicBool, what: &'static str) -> Result<Self, ReportError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ReportError::ExportInProgress(what))?;
        Ok(Self(flag))
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The two export entry points. Each can run once at a time; the two are
/// independent of each other.
pub struct Exporter<S: ReportSource> {
    source: S,
    generator: PdfGenerator,
    output_dir: PathBuf,
    dry_run: bool,
    exporting: AtomicBool,
    exporting_consolidated: AtomicBool,
}

impl<S: ReportSource> Exporter<S> {
    pub fn new(source: S, options: ExportOptions) -> Self {
        Self {
            source,
            generator: PdfGenerator::new(options.render),
            output_dir: options.output_dir,
            dry_run: options.dry_run,
            exporting: AtomicBool::new(false),
            exporting_consolidated: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.load(Ordering::Acquire)
    }

    pub fn is_exporting_consolidated(&self) -> bool {
        self.exporting_consolidated.load(Ordering::Acquire)
    }

    pub async fn export_team(&self, team: Team) -> Result<ExportSummary, ReportError> {
        let _guard = InProgress::acquire(&self.exporting, "team report")?;
        info!("Exporting {} report from {}", team.label(), self.source.describe());

        let result = self.run_team(team).await;
        if let Err(e) = &result {
            error!("PDF export failed for {}: {}", team.label(), e);
        }
        result
    }

    pub async fn export_consolidated(&self) -> Result<ExportSummary, ReportError> {
        let _guard = InProgress::acquire(&self.exporting_consolidated, "consolidated report")?;
        info!("Exporting consolidated report from {}", self.source.describe());

        let result = self.run_consolidated().await;
        if let Err(e) = &result {
            error!("Consolidated PDF export failed: {}", e);
        }
        result
    }

    async fn run_team(&self, team: Team) -> Result<ExportSummary, ReportError> {
        let report = self.load(team).await?;

        if self.dry_run {
            let canvas = self.generator.layout_team(&report);
            let filename = team_filename(report.label(), self.generator.options().generated_on)?;
            return Ok(self.planned(filename, canvas.pages().len()));
        }

        let rendered = self.generator.generate_team_report(&report)?;
        self.write(rendered).await
    }

    async fn run_consolidated(&self) -> Result<ExportSummary, ReportError> {
        let mut reports = try_join_all(Team::ALL.iter().map(|team| self.load(*team))).await?;
        reports.sort_by_key(TeamReport::team);

        if self.dry_run {
            let canvas = self.generator.layout_consolidated(&reports);
            let filename = consolidated_filename(self.generator.options().generated_on);
            return Ok(self.planned(filename, canvas.pages().len()));
        }

        let rendered = self.generator.generate_consolidated_report(&reports)?;
        self.write(rendered).await
    }

    /// Fetch a team's data and section settings. Settings are optional: a
    /// failure there falls back to the default layout.
    async fn load(&self, team: Team) -> Result<TeamReport, ReportError> {
        debug!("Fetching {} report", team);
        let data = self.source.fetch_report(team).await?;
        if data.team != team {
            return Err(ReportError::InvalidReport(format!(
                "requested '{}' but received '{}'",
                team, data.team
            )));
        }

        let settings = match self.source.fetch_settings(team).await {
            Ok(settings) => SectionSettings::from_settings(&settings),
            Err(e) => {
                warn!("Using default sections for {}: {}", team, e);
                SectionSettings::default()
            }
        };
        Ok(TeamReport::new(data, settings))
    }

    fn planned(&self, filename: String, pages: usize) -> ExportSummary {
        info!("Dry run: {} would have {} pages", filename, pages);
        ExportSummary {
            filename,
            path: None,
            pages,
        }
    }

    async fn write(&self, rendered: RenderedReport) -> Result<ExportSummary, ReportError> {
        let path = write_atomically(&self.output_dir, &rendered.filename, &rendered.bytes).await?;
        info!("Report saved: {} ({} pages)", path.display(), rendered.pages);
        Ok(ExportSummary {
            filename: rendered.filename,
            path: Some(path),
            pages: rendered.pages,
        })
    }
}

/// Write to a hidden sibling first and rename into place, so a failed write
/// never leaves a truncated PDF under the final name.
pub async fn write_atomically(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf, ReportError> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(filename);
    let partial = dir.join(format!(".{}.partial", filename));

    if let Err(e) = tokio::fs::write(&partial, bytes).await {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e.into());
    }
    tokio::fs::rename(&partial, &path).await?;
    Ok(path)
}
