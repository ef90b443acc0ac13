use crate::colors::{is_high_risk, remediation_needs_attention};
use crate::metrics::remediation_rate;
use crate::models::{ReportData, Team, TeamStats};
use crate::settings::SectionSettings;

/// Consolidated overview flags total open findings above this count.
pub const ORG_OPEN_HIGHLIGHT_ABOVE: u64 = 500;
/// Single-team summary flags open findings above this count.
pub const TEAM_OPEN_HIGHLIGHT_ABOVE: u64 = 100;

/// A team's report data together with its section overrides.
#[derive(Debug, Clone)]
pub struct TeamReport {
    pub data: ReportData,
    pub settings: SectionSettings,
}

impl TeamReport {
    pub fn new(data: ReportData, settings: SectionSettings) -> Self {
        Self { data, settings }
    }

    pub fn team(&self) -> Team {
        self.data.team
    }

    pub fn label(&self) -> &'static str {
        self.data.team.label()
    }

    pub fn report_month(&self) -> &str {
        &self.data.report_month
    }

    pub fn stats(&self) -> &TeamStats {
        &self.data.stats
    }

    pub fn remediation_rate(&self) -> u32 {
        remediation_rate(self.data.stats.open_findings, self.data.stats.closed_findings)
    }
}

/// Organization-wide figures for the consolidated title page. Averages are
/// plain means across teams.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrganizationOverview {
    pub total_open: u64,
    pub total_closed: u64,
    pub avg_mttr: f64,
    pub avg_remediation: f64,
    pub avg_risk: f64,
}

impl OrganizationOverview {
    pub fn from_reports(reports: &[TeamReport]) -> Self {
        let count = reports.len().max(1) as f64;
        let mean = |f: &dyn Fn(&TeamReport) -> f64| reports.iter().map(f).sum::<f64>() / count;

        Self {
            total_open: reports.iter().map(|r| r.stats().open_findings).sum(),
            total_closed: reports.iter().map(|r| r.stats().closed_findings).sum(),
            avg_mttr: mean(&|r| r.stats().mttr),
            avg_remediation: mean(&|r| f64::from(r.remediation_rate())),
            avg_risk: mean(&|r| r.stats().risk_score),
        }
    }

    pub fn open_needs_attention(&self) -> bool {
        self.total_open > ORG_OPEN_HIGHLIGHT_ABOVE
    }

    pub fn remediation_needs_attention(&self) -> bool {
        remediation_needs_attention(self.avg_remediation)
    }

    pub fn risk_needs_attention(&self) -> bool {
        is_high_risk(self.avg_risk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TeamDetail;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn report(team: Team, open: u64, closed: u64, risk: f64) -> TeamReport {
        let data = ReportData {
            generated_at: Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap(),
            report_month: "January 2025".to_string(),
            team,
            stats: TeamStats {
                open_findings: open,
                closed_findings: closed,
                mttr: 10.0,
                risk_score: risk,
                ..Default::default()
            },
            kpis: vec![],
            vulnerability_summary: BTreeMap::new(),
            monthly_findings: vec![],
            trend_metrics: vec![],
            detail: TeamDetail::MonthlyComparison(vec![]),
        };
        TeamReport::new(data, SectionSettings::default())
    }

    #[test]
    fn remediation_rate_uses_open_and_closed() {
        let r = report(Team::Application, 456, 1823, 6.2);
        assert_eq!(r.remediation_rate(), 80);
        assert_eq!(r.label(), "Application Security");
    }

    #[test]
    fn overview_averages_are_unweighted() {
        let reports = vec![
            report(Team::Application, 100, 900, 4.0),  // 90%
            report(Team::Infrastructure, 600, 400, 9.0), // 40%
        ];
        let overview = OrganizationOverview::from_reports(&reports);
        assert_eq!(overview.total_open, 700);
        assert_eq!(overview.total_closed, 1300);
        assert_eq!(overview.avg_remediation, 65.0);
        assert_eq!(overview.avg_risk, 6.5);
        assert!(overview.open_needs_attention());
        assert!(overview.remediation_needs_attention());
        assert!(!overview.risk_needs_attention());
    }

    #[test]
    fn empty_overview_is_zero() {
        let overview = OrganizationOverview::from_reports(&[]);
        assert_eq!(overview.total_open, 0);
        assert_eq!(overview.avg_mttr, 0.0);
    }
}
