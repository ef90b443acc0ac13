use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Application,
    Infrastructure,
    Offensive,
    Cti,
    Bas,
}

impl Team {
    /// Fixed display order used by the consolidated report.
    pub const ALL: [Team; 5] = [
        Team::Application,
        Team::Infrastructure,
        Team::Offensive,
        Team::Cti,
        Team::Bas,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Team::Application => "application",
            Team::Infrastructure => "infrastructure",
            Team::Offensive => "offensive",
            Team::Cti => "cti",
            Team::Bas => "bas",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Team::Application => "Application Security",
            Team::Infrastructure => "Infrastructure",
            Team::Offensive => "Offensive Security",
            Team::Cti => "Threat Intelligence",
            Team::Bas => "BAS Simulations",
        }
    }

    /// Which team-specific block the collaborator attaches for this team.
    pub fn detail_kind(&self) -> DetailKind {
        match self {
            Team::Offensive => DetailKind::Assessments,
            Team::Bas => DetailKind::BasSimulations,
            Team::Application | Team::Infrastructure | Team::Cti => DetailKind::MonthlyComparison,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Team {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Team::ALL
            .iter()
            .copied()
            .find(|team| team.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown team '{}' (expected one of: application, infrastructure, offensive, cti, bas)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailKind {
    MonthlyComparison,
    Assessments,
    BasSimulations,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamStats {
    pub total_assets: u64,
    pub assessed_assets: u64,
    pub open_findings: u64,
    pub closed_findings: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub mttr: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub risk_score: f64,         // 0-10
    #[serde(deserialize_with = "null_as_default")]
    pub coverage: f64,           // 0-100
    #[serde(deserialize_with = "null_as_default")]
    pub compliance_score: f64,   // 0-100
}

/// Nullable columns arrive as `null`; read them as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default = "default_unit", deserialize_with = "unit_or_default")]
    pub unit: String,
    #[serde(default)]
    pub trend: Option<Trend>,
    #[serde(default)]
    pub previous_value: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub progress_to_target: Option<i64>,
}

fn default_unit() -> String {
    "%".to_string()
}

fn unit_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_unit))
}

impl Kpi {
    pub fn trend(&self) -> Trend {
        self.trend.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub total: u64,
    pub resolved: u64,
    pub open: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyFinding {
    pub month: String,
    pub found: u64,
    pub resolved: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendMetric {
    pub date: String,
    pub metric_name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyComparison {
    pub month: String,
    pub year: i32,
    pub total_vulnerabilities: u64,
    pub resolved: u64,
    pub open: u64,
    pub resolution_rate: f64,
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assessment {
    pub assessment_type: String,
    pub current_completed: u64,
    pub previous_completed: u64,
    pub current_vulns_detected: u64,
    pub previous_vulns_detected: u64,
    pub current_critical: u64,
    pub previous_critical: u64,
    pub current_high: u64,
    pub previous_high: u64,
    pub current_medium: u64,
    pub previous_medium: u64,
    pub current_low: u64,
    pub previous_low: u64,
    pub cycle_label: String,
    pub previous_cycle_label: String,
}

impl Assessment {
    pub fn previous_vulnerabilities(&self) -> u64 {
        self.previous_critical + self.previous_high + self.previous_medium + self.previous_low
    }

    pub fn current_vulnerabilities(&self) -> u64 {
        self.current_critical + self.current_high + self.current_medium + self.current_low
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasSimulation {
    pub simulation_type: String,
    pub month: String,
    pub year: i32,
    pub total_simulations: u64,
    pub attacks_blocked: u64,
    pub attacks_detected: u64,
    pub attacks_missed: u64,
    pub prevention_rate: f64,
    pub detection_rate: f64,
}

/// The team-specific block of a report. Exactly one exists per team.
#[derive(Debug, Clone, PartialEq)]
pub enum TeamDetail {
    MonthlyComparison(Vec<MonthlyComparison>),
    Assessments(Vec<Assessment>),
    BasSimulations(Vec<BasSimulation>),
}

impl TeamDetail {
    pub fn kind(&self) -> DetailKind {
        match self {
            TeamDetail::MonthlyComparison(_) => DetailKind::MonthlyComparison,
            TeamDetail::Assessments(_) => DetailKind::Assessments,
            TeamDetail::BasSimulations(_) => DetailKind::BasSimulations,
        }
    }

    pub fn monthly_comparison(&self) -> Option<&[MonthlyComparison]> {
        match self {
            TeamDetail::MonthlyComparison(months) => Some(months),
            _ => None,
        }
    }

    pub fn assessments(&self) -> Option<&[Assessment]> {
        match self {
            TeamDetail::Assessments(assessments) => Some(assessments),
            _ => None,
        }
    }

    pub fn bas_simulations(&self) -> Option<&[BasSimulation]> {
        match self {
            TeamDetail::BasSimulations(simulations) => Some(simulations),
            _ => None,
        }
    }
}

/// Aggregate per-team report as produced by the data-access layer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ReportDataWire")]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub report_month: String,
    pub team: Team,
    pub stats: TeamStats,
    pub kpis: Vec<Kpi>,
    pub vulnerability_summary: BTreeMap<Severity, SeverityCounts>,
    pub monthly_findings: Vec<MonthlyFinding>,
    pub trend_metrics: Vec<TrendMetric>,
    pub detail: TeamDetail,
}

/// JSON shape of `/api/report/:team`; the three team-specific blocks are
/// independently nullable on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportDataWire {
    generated_at: DateTime<Utc>,
    report_month: String,
    team: Team,
    #[serde(default)]
    stats: Option<TeamStats>,
    #[serde(default)]
    kpis: Vec<Kpi>,
    #[serde(default)]
    vulnerability_summary: BTreeMap<Severity, SeverityCounts>,
    #[serde(default)]
    monthly_findings: Vec<MonthlyFinding>,
    #[serde(default)]
    trend_metrics: Vec<TrendMetric>,
    #[serde(default)]
    assessments: Option<Vec<Assessment>>,
    #[serde(default)]
    bas_simulations: Option<Vec<BasSimulation>>,
    #[serde(default)]
    monthly_comparison: Option<Vec<MonthlyComparison>>,
}

impl TryFrom<ReportDataWire> for ReportData {
    type Error = ReportError;

    fn try_from(wire: ReportDataWire) -> Result<Self, Self::Error> {
        let detail = match (wire.monthly_comparison, wire.assessments, wire.bas_simulations) {
            (Some(months), None, None) => TeamDetail::MonthlyComparison(months),
            (None, Some(assessments), None) => TeamDetail::Assessments(assessments),
            (None, None, Some(simulations)) => TeamDetail::BasSimulations(simulations),
            _ => {
                return Err(ReportError::InvalidReport(format!(
                    "team '{}' must carry exactly one of monthlyComparison, assessments, basSimulations",
                    wire.team
                )))
            }
        };

        if detail.kind() != wire.team.detail_kind() {
            return Err(ReportError::InvalidReport(format!(
                "team '{}' expects {:?} data but received {:?}",
                wire.team,
                wire.team.detail_kind(),
                detail.kind()
            )));
        }

        let kpis = wire
            .kpis
            .into_iter()
            .map(|mut kpi| {
                kpi.progress_to_target = crate::metrics::progress_to_target(kpi.value, kpi.target);
                kpi
            })
            .collect();

        Ok(ReportData {
            generated_at: wire.generated_at,
            report_month: wire.report_month,
            team: wire.team,
            stats: wire.stats.unwrap_or_default(),
            kpis,
            vulnerability_summary: wire.vulnerability_summary,
            monthly_findings: wire.monthly_findings,
            trend_metrics: wire.trend_metrics,
            detail,
        })
    }
}
