mod common;

use ivm_report::canvas::{DrawOp, RecordingCanvas};
use ivm_report::models::Team;
use ivm_report::pdf_generator::PdfGenerator;
use ivm_report::report_data::TeamReport;
use ivm_report::settings::SectionSettings;

use common::{all_reports, render_options, report_data, setting, team_report};

const BOTTOM_LIMIT: f32 = 282.0;

fn generator() -> PdfGenerator {
    PdfGenerator::new(render_options())
}

fn is_background(op: &DrawOp) -> bool {
    matches!(op, DrawOp::FillRect { x, y, h, .. } if *x == 0.0 && *y == 0.0 && *h == 297.0)
}

fn is_footer(op: &DrawOp) -> bool {
    op.as_text().is_some_and(|text| text.starts_with("Generated on "))
}

fn assert_within_margins(canvas: &RecordingCanvas) {
    for (index, ops) in canvas.pages().iter().enumerate() {
        for op in ops.iter().filter(|op| !is_background(op) && !is_footer(op)) {
            assert!(
                op.bottom() <= BOTTOM_LIMIT + 0.01,
                "page {} overflows the bottom margin: {:?}",
                index + 1,
                op
            );
        }
    }
}

fn assert_footers(canvas: &RecordingCanvas) {
    let total = canvas.pages().len();
    for index in 0..total {
        let expected = format!(
            "Generated on 1/15/2025 | IVM Security Dashboard | Page {} of {}",
            index + 1,
            total
        );
        let footers: Vec<_> = canvas.page_texts(index).into_iter().filter(|t| t.starts_with("Generated on ")).collect();
        assert_eq!(footers, vec![expected.as_str()]);
    }
}

#[test]
fn team_report_paginates_inside_margins() {
    for team in Team::ALL {
        let canvas = generator().layout_team(&team_report(team));
        assert!(canvas.pages().len() >= 2, "{} fits on one page", team);
        assert_within_margins(&canvas);
        assert_footers(&canvas);
    }
}

#[test]
fn team_report_starts_with_title_block() {
    let canvas = generator().layout_team(&team_report(Team::Cti));
    let texts = canvas.page_texts(0);
    assert_eq!(&texts[..3], &["Security Status Report", "Threat Intelligence", "January 2025"]);
    assert!(canvas.find_text("Executive Summary").is_some());
    assert!(canvas.find_text("1,823").is_some());
}

#[test]
fn severities_without_findings_are_left_out() {
    let canvas = generator().layout_team(&team_report(Team::Application));
    assert!(canvas.find_text("Critical").is_some());
    assert!(canvas.find_text("Medium").is_some());
    assert!(canvas.find_text("Low").is_none());
    assert!(canvas.find_text("Info").is_none());
}

#[test]
fn team_specific_blocks_follow_the_team() {
    let gen = generator();

    let application = gen.layout_team(&team_report(Team::Application));
    assert!(application.find_text("3-Month Vulnerability Trend").is_some());
    assert!(application.find_text("BAS Simulation Performance").is_none());

    let offensive = gen.layout_team(&team_report(Team::Offensive));
    assert!(offensive.find_text("Assessment Comparison (Current vs Previous Cycle)").is_some());
    assert!(offensive.find_text("3-Month Vulnerability Trend").is_none());

    let bas = gen.layout_team(&team_report(Team::Bas));
    assert!(bas.find_text("BAS Simulation Performance").is_some());
    assert!(bas.find_text("Email Gateway").is_some());
}

#[test]
fn section_settings_hide_and_rename() {
    let settings = SectionSettings::from_settings(&[
        setting("section_kpis_visible", "false"),
        setting("section_severity_title", "Findings by Severity"),
        setting("theme", "dark"),
    ]);
    let report = TeamReport::new(report_data(Team::Infrastructure), settings);
    let canvas = generator().layout_team(&report);

    assert!(canvas.find_text("Key Performance Indicators").is_none());
    assert!(canvas.find_text("Patch SLA").is_none());
    assert!(canvas.find_text("Findings by Severity").is_some());
    assert!(canvas.find_text("Vulnerability Summary by Severity").is_none());
}

#[test]
fn layout_is_deterministic() {
    let report = team_report(Team::Offensive);
    let first = generator().layout_team(&report);
    let second = generator().layout_team(&report);
    assert_eq!(first.pages(), second.pages());

    let reports = all_reports();
    let first = generator().layout_consolidated(&reports);
    let second = generator().layout_consolidated(&reports);
    assert_eq!(first.pages(), second.pages());
}

#[test]
fn consolidated_report_appends_teams_in_order() {
    let gen = generator();
    let reports = all_reports();
    let consolidated = gen.layout_consolidated(&reports);

    assert_eq!(consolidated.page_texts(0)[..2], ["IVM Consolidated", "Security Report"]);
    assert!(consolidated.find_text("Organization Overview").is_some());
    assert!(consolidated.find_text("Team Comparison").is_some());

    let team_pages: usize = reports.iter().map(|r| gen.layout_team(r).pages().len()).sum();
    let overview_pages = consolidated.pages().len() - team_pages;
    assert!(overview_pages >= 1);

    // Each team document opens on a fresh page with its own title block.
    let mut start = overview_pages;
    for report in &reports {
        let texts = consolidated.page_texts(start);
        assert_eq!(texts[0], "Security Status Report");
        assert_eq!(texts[1], report.label());
        start += gen.layout_team(report).pages().len();
    }
    assert_eq!(start, consolidated.pages().len());

    assert_within_margins(&consolidated);
    assert_footers(&consolidated);
}

#[test]
fn organization_overview_aggregates_teams() {
    let canvas = generator().layout_consolidated(&all_reports());
    // 5 x 456 open findings, 5 x 1,823 closed.
    assert!(canvas.find_text("2,280").is_some());
    assert!(canvas.find_text("9,115").is_some());
    assert!(canvas.find_text("6.2/10").is_some());
}

#[test]
fn generated_team_pdf_is_a_pdf() {
    let rendered = generator().generate_team_report(&team_report(Team::Application)).unwrap();
    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert_eq!(rendered.filename, "Application_Security_Security_Report_2025-01-15.pdf");
    assert_eq!(rendered.pages, generator().layout_team(&team_report(Team::Application)).pages().len());
}

#[test]
fn generated_consolidated_pdf_is_a_pdf() {
    let rendered = generator().generate_consolidated_report(&all_reports()).unwrap();
    assert!(rendered.bytes.starts_with(b"%PDF"));
    assert_eq!(rendered.filename, "IVM_Consolidated_Security_Report_2025-01-15.pdf");
}
