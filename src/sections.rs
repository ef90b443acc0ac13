//! Per-topic report sections. Each composer draws at the cursor and leaves
//! it below its own output; hidden sections draw nothing.

use crate::canvas::{Canvas, TextStyle};
use crate::charts::{
    line_chart, overlay_bar_chart, BarGroup, BarSeries, GroupedBarChart, OverlayBar, ProgressBar,
    ProgressChart, ProgressRow,
};
use crate::colors::{is_high_risk, rate_color, remediation_needs_attention, Colors};
use crate::drawing::{
    card_row, columns, heading, table_header, table_row, Cell, Column, MetricCard, CARD_HEIGHT,
    HEADER_HEIGHT, ROW_HEIGHT,
};
use crate::layout::PageLayout;
use crate::metrics::{
    format_change, format_count, format_number, format_signed, kpi_change, latest_simulation_rows,
    months_with_data, resolution_rate, severity_rows, truncate_label, AssessmentRow, TrendTable,
};
use crate::models::{Assessment, BasSimulation, MonthlyComparison};
use crate::report_data::{TeamReport, TEAM_OPEN_HIGHLIGHT_ABOVE};
use crate::settings::SectionKey;

use crate::canvas::Align::{Left, Right};

const TABLE_HEADING_GAP: f32 = 6.0;
const CARD_HEADING_GAP: f32 = 8.0;
const AFTER_TABLE: f32 = 4.0;
const AFTER_CARDS: f32 = 10.0;
/// KPI progress labels may exceed the target by up to this many points.
pub const KPI_OVERFLOW_CAP: f64 = 50.0;

/// Heading for a table section, kept on the same page as the header row
/// and first data row.
pub fn table_heading<C: Canvas>(page: &mut PageLayout<'_, C>, title: &str) {
    page.ensure_space(TABLE_HEADING_GAP + HEADER_HEIGHT + ROW_HEIGHT);
    heading(page, title, TABLE_HEADING_GAP);
}

pub fn card_heading<C: Canvas>(page: &mut PageLayout<'_, C>, title: &str) {
    page.ensure_space(CARD_HEADING_GAP + CARD_HEIGHT);
    heading(page, title, CARD_HEADING_GAP);
}

/// Report title, team label and month, underlined in the accent color.
pub fn title_block<C: Canvas>(page: &mut PageLayout<'_, C>, report: &TeamReport) {
    let center = page.geometry().center_x();
    let (margin, right) = (page.margin(), page.geometry().right());
    let y = page.y();
    page.canvas().text(
        "Security Status Report",
        center,
        y + 8.0,
        &TextStyle::new(22.0, Colors::WHITE).bold().centered(),
    );
    page.advance(14.0);

    let y = page.y();
    page.canvas()
        .text(report.label(), center, y, &TextStyle::new(14.0, Colors::BLUE).bold().centered());
    page.advance(7.0);

    let y = page.y();
    page.canvas()
        .text(report.report_month(), center, y, &TextStyle::new(10.0, Colors::MUTED).centered());
    page.advance(4.0);

    let y = page.y();
    page.canvas().line(margin, y, right, y, Colors::BLUE, 0.5);
    page.advance(10.0);
}

pub fn summary_cards(report: &TeamReport) -> Vec<MetricCard> {
    let stats = report.stats();
    let remediation = report.remediation_rate();
    vec![
        MetricCard::new(
            "Open Findings",
            format_count(stats.open_findings),
            stats.open_findings > TEAM_OPEN_HIGHLIGHT_ABOVE,
        ),
        MetricCard::new("Closed Findings", format_count(stats.closed_findings), false),
        MetricCard::new("Avg. MTTR", format!("{:.1} days", stats.mttr), false),
        MetricCard::new(
            "Remediation Rate",
            format!("{}%", remediation),
            remediation_needs_attention(f64::from(remediation)),
        ),
    ]
}

pub fn executive_summary<C: Canvas>(page: &mut PageLayout<'_, C>, report: &TeamReport) {
    let key = SectionKey::ExecutiveSummary;
    if !report.settings.is_visible(key) {
        return;
    }
    card_heading(page, report.settings.title(key));
    card_row(page, &summary_cards(report));
    page.advance(AFTER_CARDS);
}

pub fn kpi_section<C: Canvas>(page: &mut PageLayout<'_, C>, report: &TeamReport) {
    let key = SectionKey::Kpis;
    if !report.settings.is_visible(key) {
        return;
    }
    table_heading(page, report.settings.title(key));

    let cols = columns(
        page.content_width(),
        &[
            ("KPI Name", 0.28, Left),
            ("Current", 0.15, Right),
            ("Previous", 0.15, Right),
            ("Change", 0.12, Right),
            ("Target", 0.15, Right),
            ("Progress", 0.15, Right),
        ],
    );
    table_header(page, &cols);

    for kpi in &report.data.kpis {
        let previous = match kpi.previous_value {
            Some(prev) => Cell::colored(format!("{} {}", format_number(prev), kpi.unit), Colors::MUTED),
            None => Cell::colored("-", Colors::MUTED),
        };
        let change = match kpi_change(kpi.value, kpi.previous_value) {
            Some(change) => {
                let color = if change >= 0.0 { Colors::GREEN } else { Colors::RED };
                Cell::colored(format_change(change), color)
            }
            None => Cell::colored("-", Colors::MUTED),
        };
        let target = match kpi.target {
            Some(target) if target != 0.0 => Cell::new(format!("{} {}", format_number(target), kpi.unit)),
            _ => Cell::new("-"),
        };
        let progress = match kpi.progress_to_target {
            Some(progress) => Cell::colored(format!("{}%", progress), rate_color(progress as f64)),
            None => Cell::colored("-", Colors::MUTED),
        };

        let cells = [
            Cell::new(kpi.name.clone()),
            Cell::new(format!("{} {}", format_number(kpi.value), kpi.unit)),
            previous,
            change,
            target,
            progress,
        ];
        table_row(page, &cells, &cols);
    }
    page.advance(AFTER_TABLE);

    let rows: Vec<ProgressRow> = report
        .data
        .kpis
        .iter()
        .filter_map(|kpi| {
            kpi.progress_to_target.map(|progress| ProgressRow {
                label: kpi.name.clone(),
                bars: vec![ProgressBar::new(progress as f64)],
            })
        })
        .collect();
    ProgressChart::new("KPI Progress", KPI_OVERFLOW_CAP).draw(page, &rows);
}

pub fn severity_section<C: Canvas>(page: &mut PageLayout<'_, C>, report: &TeamReport) {
    let key = SectionKey::Severity;
    if !report.settings.is_visible(key) {
        return;
    }
    table_heading(page, report.settings.title(key));

    let cols = columns(
        page.content_width(),
        &[
            ("Severity", 0.2, Left),
            ("Total Found", 0.2, Right),
            ("Resolved", 0.2, Right),
            ("Open", 0.2, Right),
            ("Resolution Rate", 0.2, Right),
        ],
    );
    table_header(page, &cols);

    let rows = severity_rows(&report.data.vulnerability_summary);
    for (severity, counts) in &rows {
        let rate = resolution_rate(counts.resolved, counts.total);
        table_row(
            page,
            &[
                Cell::colored(severity.label(), Colors::severity_text(*severity)),
                Cell::new(format_count(counts.total)),
                Cell::colored(format_count(counts.resolved), Colors::GREEN),
                Cell::colored(format_count(counts.open), Colors::RED),
                Cell::colored(format!("{}%", rate), rate_color(f64::from(rate))),
            ],
            &cols,
        );
    }
    page.advance(AFTER_TABLE);

    let bars: Vec<OverlayBar> = rows
        .iter()
        .map(|(severity, counts)| OverlayBar {
            label: severity.label().to_string(),
            total: counts.total,
            resolved: counts.resolved,
            color: Colors::severity_bar(*severity),
            label_color: Colors::severity_text(*severity),
        })
        .collect();
    overlay_bar_chart(page, "Severity Distribution (Resolved vs Open)", &bars);
}

pub fn coverage_cards(report: &TeamReport) -> Vec<MetricCard> {
    let stats = report.stats();
    vec![
        MetricCard::new("Total Assets", format_count(stats.total_assets), false),
        MetricCard::new("Assessed Assets", format_count(stats.assessed_assets), false),
        MetricCard::new("Coverage", format!("{:.1}%", stats.coverage), false),
        MetricCard::new(
            "Risk Score",
            format!("{:.1}/10", stats.risk_score),
            is_high_risk(stats.risk_score),
        ),
        MetricCard::new("Compliance", format!("{:.1}%", stats.compliance_score), false),
    ]
}

pub fn coverage_section<C: Canvas>(page: &mut PageLayout<'_, C>, report: &TeamReport) {
    let key = SectionKey::Coverage;
    if !report.settings.is_visible(key) {
        return;
    }
    card_heading(page, report.settings.title(key));
    card_row(page, &coverage_cards(report));
    page.advance(AFTER_CARDS);
}

pub fn monthly_findings_section<C: Canvas>(page: &mut PageLayout<'_, C>, report: &TeamReport) {
    let key = SectionKey::MonthlyFindings;
    let findings = &report.data.monthly_findings;
    if findings.is_empty() || !report.settings.is_visible(key) {
        return;
    }
    table_heading(page, report.settings.title(key));

    let cols = columns(
        page.content_width(),
        &[("Month", 0.4, Left), ("Found", 0.3, Right), ("Resolved", 0.3, Right)],
    );
    table_header(page, &cols);
    for finding in findings {
        table_row(
            page,
            &[
                Cell::new(finding.month.clone()),
                Cell::colored(format_count(finding.found), Colors::RED),
                Cell::colored(format_count(finding.resolved), Colors::GREEN),
            ],
            &cols,
        );
    }
    page.advance(AFTER_TABLE);

    let series = [
        BarSeries::new("Found", Colors::RED),
        BarSeries::new("Resolved", Colors::GREEN),
    ];
    let groups: Vec<BarGroup> = findings
        .iter()
        .map(|f| BarGroup::new(f.month.clone(), vec![f.found as f64, f.resolved as f64]))
        .collect();
    GroupedBarChart::new("Monthly Findings Chart", &series)
        .plot_height(42.0)
        .bar_width(0.3, 12.0)
        .draw(page, &groups);
}

pub fn trend_metrics_section<C: Canvas>(page: &mut PageLayout<'_, C>, report: &TeamReport) {
    let key = SectionKey::TrendMetrics;
    if report.data.trend_metrics.is_empty() || !report.settings.is_visible(key) {
        return;
    }
    table_heading(page, report.settings.title(key));

    let table = TrendTable::from_metrics(&report.data.trend_metrics);
    let width = page.content_width();
    let series_width = width * 0.75 / table.series.len().max(1) as f32;
    let mut cols = columns(width, &[("Date", 0.25, Left)]);
    cols.extend(
        table
            .series
            .iter()
            .map(|name| Column::right(truncate_label(name, 12, 11), series_width)),
    );
    table_header(page, &cols);

    for (d, date) in table.dates.iter().enumerate() {
        let mut cells = vec![Cell::new(date.clone())];
        cells.extend((0..table.series.len()).map(|s| {
            let text = table
                .value(s, d)
                .map(|v| format!("{:.1}", v))
                .unwrap_or_else(|| "-".to_string());
            Cell::colored(text, Colors::series(s))
        }));
        table_row(page, &cells, &cols);
    }
    page.advance(AFTER_TABLE);

    line_chart(page, "Trend Lines", &table);
}

fn comparison_month_label(month: &MonthlyComparison) -> String {
    let current = if month.is_current { " (Current)" } else { "" };
    format!("{} {}{}", month.month, month.year, current)
}

pub fn monthly_comparison_section<C: Canvas>(
    page: &mut PageLayout<'_, C>,
    report: &TeamReport,
    months: &[MonthlyComparison],
) {
    let key = SectionKey::MonthlyComparison;
    let with_data = months_with_data(months);
    if with_data.is_empty() || !report.settings.is_visible(key) {
        return;
    }
    table_heading(page, report.settings.title(key));

    let cols = columns(
        page.content_width(),
        &[
            ("Month", 0.25, Left),
            ("Total", 0.2, Right),
            ("Resolved", 0.2, Right),
            ("Open", 0.15, Right),
            ("Resolution Rate", 0.2, Right),
        ],
    );
    table_header(page, &cols);
    for month in months {
        let label_color = if month.is_current { Colors::BLUE } else { Colors::WHITE };
        table_row(
            page,
            &[
                Cell::colored(comparison_month_label(month), label_color),
                Cell::new(format_count(month.total_vulnerabilities)),
                Cell::colored(format_count(month.resolved), Colors::GREEN),
                Cell::colored(format_count(month.open), Colors::RED),
                Cell::colored(
                    format!("{}%", format_number(month.resolution_rate)),
                    rate_color(month.resolution_rate),
                ),
            ],
            &cols,
        );
    }
    page.advance(AFTER_TABLE);

    let series = [
        BarSeries::new("Total", Colors::BLUE),
        BarSeries::new("Resolved", Colors::GREEN),
        BarSeries::new("Open", Colors::RED),
    ];
    let groups: Vec<BarGroup> = with_data
        .iter()
        .map(|m| {
            let short: String = m.month.chars().take(3).collect();
            BarGroup::new(
                short,
                vec![m.total_vulnerabilities as f64, m.resolved as f64, m.open as f64],
            )
            .emphasized(m.is_current)
        })
        .collect();
    GroupedBarChart::new("Monthly Trend Chart", &series)
        .plot_height(38.0)
        .bar_width(0.25, 12.0)
        .draw(page, &groups);
}

pub fn assessment_section<C: Canvas>(
    page: &mut PageLayout<'_, C>,
    report: &TeamReport,
    assessments: &[Assessment],
) {
    let key = SectionKey::Assessments;
    if assessments.is_empty() || !report.settings.is_visible(key) {
        return;
    }
    table_heading(page, report.settings.title(key));

    let cols = columns(
        page.content_width(),
        &[
            ("Type", 0.25, Left),
            ("Prev Done", 0.15, Right),
            ("Curr Done", 0.15, Right),
            ("Prev Vulns", 0.15, Right),
            ("Curr Vulns", 0.15, Right),
            ("Change", 0.15, Right),
        ],
    );
    table_header(page, &cols);

    let rows: Vec<AssessmentRow> = assessments.iter().map(AssessmentRow::from_assessment).collect();
    for row in &rows {
        let change = row.change();
        let change_color = if change <= 0 { Colors::GREEN } else { Colors::RED };
        table_row(
            page,
            &[
                Cell::new(row.label.clone()),
                Cell::new(row.previous_completed.to_string()),
                Cell::new(row.current_completed.to_string()),
                Cell::new(row.previous_vulns.to_string()),
                Cell::new(row.current_vulns.to_string()),
                Cell::colored(format_signed(change), change_color),
            ],
            &cols,
        );
    }
    page.advance(AFTER_TABLE);

    let series = [
        BarSeries::new("Previous", Colors::MUTED),
        BarSeries::new("Current", Colors::BLUE),
    ];
    let groups: Vec<BarGroup> = rows
        .iter()
        .map(|row| {
            BarGroup::new(
                truncate_label(&row.label, 8, 7),
                vec![row.previous_vulns as f64, row.current_vulns as f64],
            )
        })
        .collect();
    GroupedBarChart::new("Assessment Vulnerabilities: Previous vs Current Cycle", &series)
        .plot_height(38.0)
        .bar_width(0.3, 10.0)
        .label_size(5.0)
        .draw(page, &groups);
}

pub fn bas_section<C: Canvas>(
    page: &mut PageLayout<'_, C>,
    report: &TeamReport,
    simulations: &[BasSimulation],
) {
    let key = SectionKey::BasSimulations;
    if simulations.is_empty() || !report.settings.is_visible(key) {
        return;
    }
    table_heading(page, report.settings.title(key));

    let cols = columns(
        page.content_width(),
        &[
            ("Simulation Type", 0.35, Left),
            ("Prevention Rate", 0.2, Right),
            ("Detection Rate", 0.2, Right),
            ("Total Sims", 0.25, Right),
        ],
    );
    table_header(page, &cols);

    let rows = latest_simulation_rows(simulations);
    for row in &rows {
        table_row(
            page,
            &[
                Cell::new(row.label.clone()),
                Cell::colored(format!("{:.1}%", row.prevention_rate), rate_color(row.prevention_rate)),
                Cell::colored(format!("{:.1}%", row.detection_rate), rate_color(row.detection_rate)),
                Cell::new(row.total_simulations.to_string()),
            ],
            &cols,
        );
    }
    page.advance(AFTER_TABLE);

    let bars: Vec<ProgressRow> = rows
        .iter()
        .map(|row| ProgressRow {
            label: row.label.clone(),
            bars: vec![
                ProgressBar::tagged(row.prevention_rate, "Prev"),
                ProgressBar::tagged(row.detection_rate, "Det"),
            ],
        })
        .collect();
    ProgressChart::new("Prevention & Detection Rates", 0.0).draw(page, &bars);
}

/// Sections after the title block, in report order. The team-specific
/// block is chosen by the report's detail variant.
pub fn render_team_sections<C: Canvas>(page: &mut PageLayout<'_, C>, report: &TeamReport) {
    executive_summary(page, report);
    kpi_section(page, report);
    severity_section(page, report);
    coverage_section(page, report);
    monthly_findings_section(page, report);
    trend_metrics_section(page, report);

    let detail = &report.data.detail;
    if let Some(months) = detail.monthly_comparison() {
        monthly_comparison_section(page, report, months);
    }
    if let Some(assessments) = detail.assessments() {
        assessment_section(page, report, assessments);
    }
    if let Some(simulations) = detail.bas_simulations() {
        bas_section(page, report, simulations);
    }
}
