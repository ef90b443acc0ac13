//! Derived numbers shown in the report. All rates are whole percentages and
//! every ratio with a zero denominator yields 0.

use std::collections::BTreeMap;

use crate::models::{
    Assessment, BasSimulation, MonthlyComparison, Severity, SeverityCounts, TrendMetric,
};

/// Number of most recent dates kept for the metrics-over-time section.
pub const TREND_WINDOW: usize = 8;

fn percentage(part: f64, whole: f64) -> u32 {
    if whole > 0.0 {
        (part / whole * 100.0).round() as u32
    } else {
        0
    }
}

/// `round(closed / (open + closed) * 100)`.
pub fn remediation_rate(open: u64, closed: u64) -> u32 {
    percentage(closed as f64, (open + closed) as f64)
}

/// `round(resolved / total * 100)`.
pub fn resolution_rate(resolved: u64, total: u64) -> u32 {
    percentage(resolved as f64, total as f64)
}

/// `round(value / target * 100)`; absent without a non-zero target.
/// Values above 100 are kept.
pub fn progress_to_target(value: f64, target: Option<f64>) -> Option<i64> {
    match target {
        Some(target) if target != 0.0 => Some((value / target * 100.0).round() as i64),
        _ => None,
    }
}

pub fn kpi_change(value: f64, previous: Option<f64>) -> Option<f64> {
    previous.map(|previous| value - previous)
}

/// One decimal with an explicit `+` for positive changes.
pub fn format_change(change: f64) -> String {
    let formatted = format!("{:.1}", change);
    if change > 0.0 {
        format!("+{}", formatted)
    } else if formatted == "-0.0" {
        "0.0".to_string()
    } else {
        formatted
    }
}

pub fn format_signed(change: i64) -> String {
    if change > 0 {
        format!("+{}", change)
    } else {
        change.to_string()
    }
}

/// Integer with thousands separators, e.g. `1,823`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Numbers as printed in the KPI table: integral values without decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Shorten `label` to `keep` characters plus `.` when it exceeds `max_len`.
pub fn truncate_label(label: &str, max_len: usize, keep: usize) -> String {
    if label.chars().count() > max_len {
        let mut short: String = label.chars().take(keep).collect();
        short.push('.');
        short
    } else {
        label.to_string()
    }
}

/// Severities with at least one finding, in display order.
pub fn severity_rows(summary: &BTreeMap<Severity, SeverityCounts>) -> Vec<(Severity, SeverityCounts)> {
    Severity::ALL
        .iter()
        .filter_map(|severity| {
            summary
                .get(severity)
                .filter(|counts| counts.total > 0)
                .map(|counts| (*severity, *counts))
        })
        .collect()
}

pub fn months_with_data(months: &[MonthlyComparison]) -> Vec<&MonthlyComparison> {
    months.iter().filter(|m| m.total_vulnerabilities > 0).collect()
}

/// Trend metrics pivoted into a date x series grid.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendTable {
    /// Most recent dates, ascending.
    pub dates: Vec<String>,
    /// Series names in first-appearance order.
    pub series: Vec<String>,
    /// `values[series][date]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl TrendTable {
    pub fn from_metrics(metrics: &[TrendMetric]) -> Self {
        let mut series: Vec<String> = Vec::new();
        for metric in metrics {
            if !series.contains(&metric.metric_name) {
                series.push(metric.metric_name.clone());
            }
        }

        let mut dates: Vec<String> = metrics.iter().map(|m| m.date.clone()).collect();
        dates.sort();
        dates.dedup();
        let skip = dates.len().saturating_sub(TREND_WINDOW);
        let dates = dates.split_off(skip);

        let values = series
            .iter()
            .map(|name| {
                dates
                    .iter()
                    .map(|date| {
                        metrics
                            .iter()
                            .find(|m| &m.date == date && &m.metric_name == name)
                            .map(|m| m.value)
                    })
                    .collect()
            })
            .collect();

        Self { dates, series, values }
    }

    pub fn value(&self, series: usize, date: usize) -> Option<f64> {
        self.values.get(series).and_then(|row| row.get(date).copied().flatten())
    }

    /// Joint axis range over every visible value: `[min(values, 0), max(values, 1)]`.
    pub fn value_range(&self) -> (f64, f64) {
        let known = self.values.iter().flatten().flatten().copied();
        known.fold((0.0_f64, 1.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }
}

pub fn assessment_label(id: &str) -> &str {
    match id {
        "ad" => "Active Directory",
        "cloud" => "Cloud Infrastructure",
        "external_network" => "External Network",
        "internal_network" => "Internal Network",
        "file_sharing" => "File Sharing",
        "osint" => "OSINT",
        "wifi" => "WiFi",
        "c2c" => "C2C",
        "phishing" => "Phishing",
        other => other,
    }
}

pub fn simulation_label(id: &str) -> &str {
    match id {
        "network_infiltration" => "Network Infiltration",
        "endpoint_security" => "Endpoint Security",
        "waf_f5" => "WAF F5",
        "waf_threatx" => "WAF ThreatX",
        "email_gateway" => "Email Gateway",
        "ad_assessment" => "AD Assessment",
        "cve_critical" => "CVE Critical",
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRow {
    pub label: String,
    pub previous_completed: u64,
    pub current_completed: u64,
    pub previous_vulns: u64,
    pub current_vulns: u64,
}

impl AssessmentRow {
    pub fn from_assessment(assessment: &Assessment) -> Self {
        Self {
            label: assessment_label(&assessment.assessment_type).to_string(),
            previous_completed: assessment.previous_completed,
            current_completed: assessment.current_completed,
            previous_vulns: assessment.previous_vulnerabilities(),
            current_vulns: assessment.current_vulnerabilities(),
        }
    }

    pub fn change(&self) -> i64 {
        self.current_vulns as i64 - self.previous_vulns as i64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRow {
    pub label: String,
    pub prevention_rate: f64,
    pub detection_rate: f64,
    pub total_simulations: u64,
}

/// `YYYY-MM` key; non-numeric months sort first.
fn month_key(simulation: &BasSimulation) -> String {
    let month = simulation.month.trim().parse::<u32>().unwrap_or(0);
    format!("{:04}-{:02}", simulation.year, month)
}

/// One row per simulation type (first-appearance order) taken from the
/// latest month present in the data.
pub fn latest_simulation_rows(simulations: &[BasSimulation]) -> Vec<SimulationRow> {
    let latest = simulations.iter().map(month_key).max();

    let mut types: Vec<&str> = Vec::new();
    for simulation in simulations {
        if !types.contains(&simulation.simulation_type.as_str()) {
            types.push(&simulation.simulation_type);
        }
    }

    types
        .into_iter()
        .map(|kind| {
            let current = simulations
                .iter()
                .find(|s| s.simulation_type == kind && Some(month_key(s)) == latest);
            SimulationRow {
                label: simulation_label(kind).to_string(),
                prevention_rate: current.map(|s| s.prevention_rate).unwrap_or(0.0),
                detection_rate: current.map(|s| s.detection_rate).unwrap_or(0.0),
                total_simulations: current.map(|s| s.total_simulations).unwrap_or(0),
            }
        })
        .collect()
}
