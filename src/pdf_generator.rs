use chrono::{Local, NaiveDate};
use regex::Regex;
use tracing::debug;

use crate::canvas::{Canvas, RecordingCanvas, TextStyle};
use crate::charts::{BarGroup, BarSeries, GroupedBarChart, ValueAxis};
use crate::colors::{rate_color, risk_color, Colors};
use crate::drawing::{card_row, columns, table_header, table_row, Cell, MetricCard};
use crate::error::ReportError;
use crate::layout::{PageGeometry, PageLayout};
use crate::metrics::{format_count, truncate_label};
use crate::pdf_canvas::PdfCanvas;
use crate::report_data::{OrganizationOverview, TeamReport, TEAM_OPEN_HIGHLIGHT_ABOVE};
use crate::sections::{card_heading, render_team_sections, table_heading, title_block};

use crate::canvas::Align::{Left, Right};

pub const PRODUCT_NAME: &str = "IVM Security Dashboard";
const FOOTER_OFFSET: f32 = 8.0;

#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Date printed in footers and used in file names.
    pub generated_on: NaiveDate,
    pub product_name: String,
    pub geometry: PageGeometry,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            generated_on: Local::now().date_naive(),
            product_name: PRODUCT_NAME.to_string(),
            geometry: PageGeometry::default(),
        }
    }
}

/// A finished document, ready to be written in one go.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub pages: usize,
}

fn sanitize_label(label: &str) -> Result<String, ReportError> {
    let re = Regex::new(r#"[\s<>:"/\\|?*]+"#)?;
    Ok(re.replace_all(label.trim(), "_").to_string())
}

/// `<Label>_Security_Report_<YYYY-MM-DD>.pdf` with whitespace runs as `_`.
pub fn team_filename(label: &str, date: NaiveDate) -> Result<String, ReportError> {
    Ok(format!(
        "{}_Security_Report_{}.pdf",
        sanitize_label(label)?,
        date.format("%Y-%m-%d")
    ))
}

pub fn consolidated_filename(date: NaiveDate) -> String {
    format!("IVM_Consolidated_Security_Report_{}.pdf", date.format("%Y-%m-%d"))
}

pub struct PdfGenerator {
    options: RenderOptions,
}

impl PdfGenerator {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Lay out a single-team document on any canvas, footer included.
    pub fn compose_team<C: Canvas>(&self, canvas: &mut C, report: &TeamReport) {
        let mut page = PageLayout::new(canvas, self.options.geometry);
        self.render_team(&mut page, report);
        self.add_footer(canvas);
    }

    /// Lay out the consolidated document: title and overview pages, then
    /// every team's document in the given order.
    pub fn compose_consolidated<C: Canvas>(&self, canvas: &mut C, reports: &[TeamReport]) {
        let mut page = PageLayout::new(canvas, self.options.geometry);
        self.render_overview(&mut page, reports);
        for report in reports {
            self.render_team(&mut page, report);
        }
        self.add_footer(canvas);
    }

    pub fn layout_team(&self, report: &TeamReport) -> RecordingCanvas {
        let mut canvas = RecordingCanvas::new();
        self.compose_team(&mut canvas, report);
        canvas
    }

    pub fn layout_consolidated(&self, reports: &[TeamReport]) -> RecordingCanvas {
        let mut canvas = RecordingCanvas::new();
        self.compose_consolidated(&mut canvas, reports);
        canvas
    }

    pub fn generate_team_report(&self, report: &TeamReport) -> Result<RenderedReport, ReportError> {
        let title = format!("{} Security Report", report.label());
        let mut canvas = self.pdf_canvas(&title)?;
        self.compose_team(&mut canvas, report);
        let pages = canvas.page_count();

        Ok(RenderedReport {
            filename: team_filename(report.label(), self.options.generated_on)?,
            bytes: canvas.finish()?,
            pages,
        })
    }

    pub fn generate_consolidated_report(&self, reports: &[TeamReport]) -> Result<RenderedReport, ReportError> {
        let mut canvas = self.pdf_canvas("IVM Consolidated Security Report")?;
        self.compose_consolidated(&mut canvas, reports);
        let pages = canvas.page_count();

        Ok(RenderedReport {
            filename: consolidated_filename(self.options.generated_on),
            bytes: canvas.finish()?,
            pages,
        })
    }

    fn pdf_canvas(&self, title: &str) -> Result<PdfCanvas, ReportError> {
        let PageGeometry { width, height, .. } = self.options.geometry;
        PdfCanvas::new(title, width, height)
    }

    fn render_team<C: Canvas>(&self, page: &mut PageLayout<'_, C>, report: &TeamReport) {
        debug!("Rendering {} report from page {}", report.team(), page.page_count() + 1);
        page.new_page();
        title_block(page, report);
        render_team_sections(page, report);
    }

    fn render_overview<C: Canvas>(&self, page: &mut PageLayout<'_, C>, reports: &[TeamReport]) {
        page.new_page();
        let center = page.geometry().center_x();
        let title = TextStyle::new(28.0, Colors::WHITE).bold().centered();

        page.set_y(40.0);
        let y = page.y();
        page.canvas().text("IVM Consolidated", center, y, &title);
        page.advance(12.0);
        let y = page.y();
        page.canvas().text("Security Report", center, y, &title);
        page.advance(15.0);

        let y = page.y();
        page.canvas()
            .line(center - 40.0, y, center + 40.0, y, Colors::BLUE, 1.0);
        page.advance(12.0);

        let month = reports
            .first()
            .map(|r| r.report_month().to_string())
            .unwrap_or_else(|| self.options.generated_on.format("%B %Y").to_string());
        let y = page.y();
        page.canvas()
            .text(&month, center, y, &TextStyle::new(12.0, Colors::MUTED).centered());
        page.advance(20.0);

        let y = page.y();
        page.canvas()
            .text("Teams Included:", center, y, &TextStyle::new(10.0, Colors::BLUE).centered());
        page.advance(8.0);
        for report in reports {
            let y = page.y();
            page.canvas()
                .text(report.label(), center, y, &TextStyle::new(10.0, Colors::WHITE).centered());
            page.advance(6.0);
        }
        page.advance(15.0);

        let overview = OrganizationOverview::from_reports(reports);
        card_heading(page, "Organization Overview");
        card_row(
            page,
            &[
                MetricCard::new("Total Open", format_count(overview.total_open), overview.open_needs_attention()),
                MetricCard::new("Total Closed", format_count(overview.total_closed), false),
                MetricCard::new("Avg MTTR", format!("{:.1}d", overview.avg_mttr), false),
                MetricCard::new(
                    "Avg Remediation",
                    format!("{:.0}%", overview.avg_remediation),
                    overview.remediation_needs_attention(),
                ),
                MetricCard::new(
                    "Avg Risk",
                    format!("{:.1}/10", overview.avg_risk),
                    overview.risk_needs_attention(),
                ),
            ],
        );
        page.advance(12.0);

        self.render_comparison_table(page, reports);
        page.advance(6.0);
        self.render_comparison_chart(page, reports);
    }

    fn render_comparison_table<C: Canvas>(&self, page: &mut PageLayout<'_, C>, reports: &[TeamReport]) {
        table_heading(page, "Team Comparison");
        let cols = columns(
            page.content_width(),
            &[
                ("Team", 0.25, Left),
                ("Open", 0.12, Right),
                ("Closed", 0.12, Right),
                ("MTTR", 0.12, Right),
                ("Remediation", 0.13, Right),
                ("Coverage", 0.13, Right),
                ("Risk", 0.13, Right),
            ],
        );
        table_header(page, &cols);

        for report in reports {
            let stats = report.stats();
            let remediation = report.remediation_rate();
            let open_color = if stats.open_findings > TEAM_OPEN_HIGHLIGHT_ABOVE {
                Colors::RED
            } else {
                Colors::WHITE
            };
            table_row(
                page,
                &[
                    Cell::colored(report.label(), Colors::BLUE),
                    Cell::colored(format_count(stats.open_findings), open_color),
                    Cell::colored(format_count(stats.closed_findings), Colors::GREEN),
                    Cell::new(format!("{:.1}d", stats.mttr)),
                    Cell::colored(format!("{}%", remediation), rate_color(f64::from(remediation))),
                    Cell::new(format!("{:.1}%", stats.coverage)),
                    Cell::colored(format!("{:.1}", stats.risk_score), risk_color(stats.risk_score)),
                ],
                &cols,
            );
        }
    }

    /// Remediation rate next to the risk score scaled to a percentage of 10.
    fn render_comparison_chart<C: Canvas>(&self, page: &mut PageLayout<'_, C>, reports: &[TeamReport]) {
        let series = [
            BarSeries::new("Remediation %", Colors::GREEN),
            BarSeries::new("Risk (x10%)", Colors::YELLOW),
        ];
        let groups: Vec<BarGroup> = reports
            .iter()
            .map(|report| {
                let risk = report.stats().risk_score;
                BarGroup::new(
                    truncate_label(report.label(), 12, 11),
                    vec![f64::from(report.remediation_rate()), risk * 10.0],
                )
                .with_color(1, risk_color(risk))
            })
            .collect();

        GroupedBarChart::new("Team Risk & Remediation Comparison", &series)
            .plot_height(40.0)
            .bar_width(0.3, 14.0)
            .axis(ValueAxis::Percent)
            .draw(page, &groups);
    }

    /// `Generated on <date> | <product> | Page i of N` on every page.
    fn add_footer<C: Canvas>(&self, canvas: &mut C) {
        let total = canvas.page_count();
        let geometry = self.options.geometry;
        let style = TextStyle::new(7.0, Colors::FOOTER).centered();
        let date = self.options.generated_on.format("%-m/%-d/%Y");

        for index in 0..total {
            canvas.set_page(index);
            let text = format!(
                "Generated on {} | {} | Page {} of {}",
                date,
                self.options.product_name,
                index + 1,
                total
            );
            canvas.text(&text, geometry.center_x(), geometry.height - FOOTER_OFFSET, &style);
        }
    }
}
