mod common;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use ivm_report::error::ReportError;
use ivm_report::export::{ExportOptions, Exporter};
use ivm_report::models::Team;
use ivm_report::source::{FileReportSource, ReportSource};

use common::{render_options, report_json, setting, MockSource};

fn options(dir: &Path) -> ExportOptions {
    ExportOptions {
        output_dir: dir.to_path_buf(),
        dry_run: false,
        render: render_options(),
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn team_export_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let exporter = Exporter::new(MockSource::new(), options(dir.path()));

    let summary = exporter.export_team(Team::Infrastructure).await.unwrap();

    assert_eq!(summary.filename, "Infrastructure_Security_Report_2025-01-15.pdf");
    let path = summary.path.unwrap();
    assert_eq!(path, dir.path().join(&summary.filename));
    assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    assert!(summary.pages >= 2);
    assert_eq!(files_in(dir.path()), vec![summary.filename]);
    assert!(!exporter.is_exporting());
}

#[tokio::test]
async fn failed_fetch_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource {
        failing_reports: vec![Team::Cti],
        ..MockSource::new()
    };
    let exporter = Exporter::new(source, options(dir.path()));

    let err = exporter.export_team(Team::Cti).await.unwrap_err();
    assert!(matches!(err, ReportError::Fetch { team: Team::Cti, status: 503 }));
    assert!(files_in(dir.path()).is_empty());
    assert!(!exporter.is_exporting());

    let err = exporter.export_consolidated().await.unwrap_err();
    assert!(matches!(err, ReportError::Fetch { team: Team::Cti, .. }));
    assert!(files_in(dir.path()).is_empty());
    assert!(!exporter.is_exporting_consolidated());
}

#[tokio::test]
async fn settings_failure_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource {
        failing_settings: vec![Team::Bas],
        ..MockSource::new()
    };
    let exporter = Exporter::new(source, options(dir.path()));

    let summary = exporter.export_team(Team::Bas).await.unwrap();
    assert!(summary.path.is_some());
}

#[tokio::test]
async fn mismatched_team_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let source = MockSource {
        impersonate: Some(Team::Application),
        ..MockSource::new()
    };
    let exporter = Exporter::new(source, options(dir.path()));

    let err = exporter.export_team(Team::Infrastructure).await.unwrap_err();
    assert!(matches!(err, ReportError::InvalidReport(_)));
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn consolidated_export_orders_teams_regardless_of_arrival() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MockSource::new();
    source.delays.insert(Team::Application, Duration::from_millis(40));
    source.delays.insert(Team::Infrastructure, Duration::from_millis(30));
    source.delays.insert(Team::Offensive, Duration::from_millis(20));
    source.delays.insert(Team::Cti, Duration::from_millis(10));

    let mut opts = options(dir.path());
    opts.dry_run = true;
    let exporter = Exporter::new(source, opts);

    let summary = exporter.export_consolidated().await.unwrap();
    assert_eq!(summary.filename, "IVM_Consolidated_Security_Report_2025-01-15.pdf");
    assert_eq!(exporter.source().calls(), Team::ALL.len());

    let generator = ivm_report::PdfGenerator::new(render_options());
    let canvas = generator.layout_consolidated(&common::all_reports());
    assert_eq!(summary.pages, canvas.pages().len());
}

#[tokio::test]
async fn consolidated_export_applies_team_settings() {
    let dir = tempfile::tempdir().unwrap();
    let mut source = MockSource::new();
    source
        .settings
        .insert(Team::Offensive, vec![setting("section_assessments_visible", "false")]);
    let exporter = Exporter::new(source, options(dir.path()));

    let summary = exporter.export_consolidated().await.unwrap();
    assert!(std::fs::read(summary.path.unwrap()).unwrap().starts_with(b"%PDF"));
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path());
    opts.dry_run = true;
    let exporter = Exporter::new(MockSource::new(), opts);

    let summary = exporter.export_team(Team::Application).await.unwrap();
    assert_eq!(summary.path, None);
    assert!(summary.pages >= 2);
    assert!(files_in(dir.path()).is_empty());
}

#[tokio::test]
async fn second_export_is_rejected_while_one_runs() {
    let dir = tempfile::tempdir().unwrap();
    let gate = Arc::new(Notify::new());
    let source = MockSource {
        gate: Some(gate.clone()),
        ..MockSource::new()
    };
    let exporter = Exporter::new(source, options(dir.path()));

    let (first, ()) = tokio::join!(exporter.export_team(Team::Application), async {
        while exporter.source().calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(exporter.is_exporting());
        assert!(!exporter.is_exporting_consolidated());

        let second = exporter.export_team(Team::Cti).await;
        assert!(matches!(second, Err(ReportError::ExportInProgress(_))));
        gate.notify_one();
    });

    assert!(first.is_ok());
    assert!(!exporter.is_exporting());
    assert_eq!(exporter.source().calls(), 1);
}

#[tokio::test]
async fn file_source_reads_report_and_optional_settings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cti.json"), report_json(Team::Cti).to_string()).unwrap();
    let source = FileReportSource::new(dir.path());

    let report = source.fetch_report(Team::Cti).await.unwrap();
    assert_eq!(report.team, Team::Cti);
    assert!(source.fetch_settings(Team::Cti).await.unwrap().is_empty());

    std::fs::write(
        dir.path().join("cti.settings.json"),
        r#"[{"settingKey": "section_kpis_visible", "settingValue": "false"}]"#,
    )
    .unwrap();
    let settings = source.fetch_settings(Team::Cti).await.unwrap();
    assert_eq!(settings, vec![setting("section_kpis_visible", "false")]);

    assert!(source.fetch_report(Team::Bas).await.is_err());
}
