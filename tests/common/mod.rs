#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use ivm_report::error::ReportError;
use ivm_report::models::{ReportData, Team};
use ivm_report::pdf_generator::RenderOptions;
use ivm_report::report_data::TeamReport;
use ivm_report::settings::{DashboardSetting, SectionSettings};
use ivm_report::source::ReportSource;

pub fn generated_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

pub fn render_options() -> RenderOptions {
    RenderOptions {
        generated_on: generated_on(),
        ..RenderOptions::default()
    }
}

fn detail(team: Team) -> (&'static str, Value) {
    match team {
        Team::Offensive => (
            "assessments",
            json!([
                {
                    "assessmentType": "External Penetration Test",
                    "currentCompleted": 4, "previousCompleted": 3,
                    "currentVulnsDetected": 21, "previousVulnsDetected": 30,
                    "currentCritical": 1, "previousCritical": 3,
                    "currentHigh": 5, "previousHigh": 7,
                    "currentMedium": 9, "previousMedium": 12,
                    "currentLow": 6, "previousLow": 8,
                    "cycleLabel": "Q1 2025", "previousCycleLabel": "Q4 2024"
                },
                {
                    "assessmentType": "Red Team Exercise",
                    "currentCompleted": 1, "previousCompleted": 1,
                    "currentVulnsDetected": 8, "previousVulnsDetected": 6,
                    "currentCritical": 2, "previousCritical": 1,
                    "currentHigh": 3, "previousHigh": 2,
                    "currentMedium": 2, "previousMedium": 2,
                    "currentLow": 1, "previousLow": 1,
                    "cycleLabel": "Q1 2025", "previousCycleLabel": "Q4 2024"
                }
            ]),
        ),
        Team::Bas => (
            "basSimulations",
            json!([
                { "simulationType": "Email Gateway", "month": "12", "year": 2024, "totalSimulations": 120,
                  "attacksBlocked": 100, "attacksDetected": 110, "attacksMissed": 10,
                  "preventionRate": 83.3, "detectionRate": 91.7 },
                { "simulationType": "Email Gateway", "month": "1", "year": 2025, "totalSimulations": 140,
                  "attacksBlocked": 126, "attacksDetected": 133, "attacksMissed": 7,
                  "preventionRate": 90.0, "detectionRate": 95.0 },
                { "simulationType": "Endpoint", "month": "1", "year": 2025, "totalSimulations": 80,
                  "attacksBlocked": 44, "attacksDetected": 60, "attacksMissed": 20,
                  "preventionRate": 55.0, "detectionRate": 75.0 }
            ]),
        ),
        Team::Application | Team::Infrastructure | Team::Cti => (
            "monthlyComparison",
            json!([
                { "month": "November", "year": 2024, "totalVulnerabilities": 310, "resolved": 240,
                  "open": 70, "resolutionRate": 77.4, "isCurrent": false },
                { "month": "December", "year": 2024, "totalVulnerabilities": 0, "resolved": 0,
                  "open": 0, "resolutionRate": 0.0, "isCurrent": false },
                { "month": "January", "year": 2025, "totalVulnerabilities": 280, "resolved": 230,
                  "open": 50, "resolutionRate": 82.1, "isCurrent": true }
            ]),
        ),
    }
}

/// A fully populated `/api/report/:team` payload.
pub fn report_json(team: Team) -> Value {
    let mut report = json!({
        "generatedAt": "2025-01-15T10:00:00.000Z",
        "reportMonth": "January 2025",
        "team": team.id(),
        "stats": {
            "totalAssets": 1200,
            "assessedAssets": 1100,
            "openFindings": 456,
            "closedFindings": 1823,
            "mttr": 12.5,
            "riskScore": 6.2,
            "coverage": 91.7,
            "complianceScore": 88.0
        },
        "kpis": [
            { "name": "Patch SLA", "value": 87.5, "target": 95, "unit": "%", "trend": "up", "previousValue": 82.3 },
            { "name": "Scan Coverage", "value": 97.0, "target": 90, "unit": "%", "trend": "stable", "previousValue": 97.0 },
            { "name": "Mean Time to Triage", "value": 2.5, "target": null, "unit": "days", "trend": "down", "previousValue": 3.0 }
        ],
        "vulnerabilitySummary": {
            "critical": { "total": 12, "resolved": 10, "open": 2 },
            "high": { "total": 85, "resolved": 60, "open": 25 },
            "medium": { "total": 240, "resolved": 150, "open": 90 },
            "low": { "total": 0, "resolved": 0, "open": 0 },
            "info": { "total": 40, "resolved": 40, "open": 0 }
        },
        "monthlyFindings": [
            { "month": "Aug", "found": 120, "resolved": 90 },
            { "month": "Sep", "found": 140, "resolved": 130 },
            { "month": "Oct", "found": 0, "resolved": 0 },
            { "month": "Nov", "found": 110, "resolved": 125 },
            { "month": "Dec", "found": 95, "resolved": 100 },
            { "month": "Jan", "found": 105, "resolved": 98 }
        ],
        "trendMetrics": [
            { "date": "2024-11-01", "metricName": "Risk Score", "value": 6.8 },
            { "date": "2024-12-01", "metricName": "Risk Score", "value": 6.5 },
            { "date": "2025-01-01", "metricName": "Risk Score", "value": 6.2 },
            { "date": "2024-11-01", "metricName": "Open Criticals", "value": 5.0 },
            { "date": "2025-01-01", "metricName": "Open Criticals", "value": 2.0 }
        ],
        "assessments": null,
        "basSimulations": null,
        "monthlyComparison": null
    });
    let (key, value) = detail(team);
    report[key] = value;
    report
}

pub fn report_data(team: Team) -> ReportData {
    serde_json::from_value(report_json(team)).unwrap()
}

pub fn team_report(team: Team) -> TeamReport {
    TeamReport::new(report_data(team), SectionSettings::default())
}

pub fn all_reports() -> Vec<TeamReport> {
    Team::ALL.iter().map(|team| team_report(*team)).collect()
}

pub fn setting(key: &str, value: &str) -> DashboardSetting {
    DashboardSetting {
        setting_key: key.to_string(),
        setting_value: value.to_string(),
    }
}

/// In-memory source with per-team latency, optional failures and call
/// counting.
#[derive(Default)]
pub struct MockSource {
    pub settings: HashMap<Team, Vec<DashboardSetting>>,
    pub delays: HashMap<Team, Duration>,
    pub failing_reports: Vec<Team>,
    pub failing_settings: Vec<Team>,
    /// Serve this team's payload for every request.
    pub impersonate: Option<Team>,
    pub gate: Option<Arc<Notify>>,
    pub report_calls: AtomicUsize,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.report_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportSource for MockSource {
    async fn fetch_report(&self, team: Team) -> Result<ReportData, ReportError> {
        self.report_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(delay) = self.delays.get(&team) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_reports.contains(&team) {
            return Err(ReportError::Fetch { team, status: 503 });
        }
        Ok(report_data(self.impersonate.unwrap_or(team)))
    }

    async fn fetch_settings(&self, team: Team) -> Result<Vec<DashboardSetting>, ReportError> {
        if self.failing_settings.contains(&team) {
            return Err(ReportError::Fetch { team, status: 500 });
        }
        Ok(self.settings.get(&team).cloned().unwrap_or_default())
    }

    fn describe(&self) -> String {
        "mock".to_string()
    }
}
