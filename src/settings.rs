use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of `/api/dashboard-settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSetting {
    pub setting_key: String,
    pub setting_value: String,
}

/// Report sections an admin can hide or rename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    ExecutiveSummary,
    Kpis,
    Severity,
    Coverage,
    MonthlyFindings,
    TrendMetrics,
    MonthlyComparison,
    Assessments,
    BasSimulations,
}

impl SectionKey {
    pub const ALL: [SectionKey; 9] = [
        SectionKey::ExecutiveSummary,
        SectionKey::Kpis,
        SectionKey::Severity,
        SectionKey::Coverage,
        SectionKey::MonthlyFindings,
        SectionKey::TrendMetrics,
        SectionKey::MonthlyComparison,
        SectionKey::Assessments,
        SectionKey::BasSimulations,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SectionKey::ExecutiveSummary => "executive_summary",
            SectionKey::Kpis => "kpis",
            SectionKey::Severity => "severity",
            SectionKey::Coverage => "coverage",
            SectionKey::MonthlyFindings => "monthly_findings",
            SectionKey::TrendMetrics => "trend_metrics",
            SectionKey::MonthlyComparison => "monthly_comparison",
            SectionKey::Assessments => "assessments",
            SectionKey::BasSimulations => "bas_simulations",
        }
    }

    pub fn default_title(&self) -> &'static str {
        match self {
            SectionKey::ExecutiveSummary => "Executive Summary",
            SectionKey::Kpis => "Key Performance Indicators",
            SectionKey::Severity => "Vulnerability Summary by Severity",
            SectionKey::Coverage => "Asset Coverage & Compliance",
            SectionKey::MonthlyFindings => "Monthly Findings Trend (Found vs Resolved)",
            SectionKey::TrendMetrics => "Metrics Over Time",
            SectionKey::MonthlyComparison => "3-Month Vulnerability Trend",
            SectionKey::Assessments => "Assessment Comparison (Current vs Previous Cycle)",
            SectionKey::BasSimulations => "BAS Simulation Performance",
        }
    }
}

/// Visibility and heading overrides for one team's report.
///
/// Empty settings render every section with its default heading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionSettings {
    values: HashMap<String, String>,
}

impl SectionSettings {
    pub fn from_settings(settings: &[DashboardSetting]) -> Self {
        let values = settings
            .iter()
            .filter(|s| s.setting_key.starts_with("section_"))
            .map(|s| (s.setting_key.clone(), s.setting_value.clone()))
            .collect();
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Visible when no `_visible` setting exists; otherwise only a `"true"`
    /// value shows the section.
    pub fn is_visible(&self, section: SectionKey) -> bool {
        self.values
            .get(&format!("section_{}_visible", section.key()))
            .map(|value| value.trim() == "true")
            .unwrap_or(true)
    }

    pub fn title(&self, section: SectionKey) -> &str {
        self.values
            .get(&format!("section_{}_title", section.key()))
            .map(|title| title.trim())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| section.default_title())
    }
}
