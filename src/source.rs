use async_trait::async_trait;
use reqwest::Client;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::error::ReportError;
use crate::models::{ReportData, Team};
use crate::settings::DashboardSetting;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Where report data comes from. One attempt per call; failures surface
/// immediately.
#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch_report(&self, team: Team) -> Result<ReportData, ReportError>;

    /// Section overrides for `team`; none by default.
    async fn fetch_settings(&self, _team: Team) -> Result<Vec<DashboardSetting>, ReportError> {
        Ok(Vec::new())
    }

    /// Human readable origin for logging
    fn describe(&self) -> String;
}

/// Reads from the dashboard's REST API.
pub struct HttpReportSource {
    client: Client,
    base_url: String,
}

impl HttpReportSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn report_url(&self, team: Team) -> String {
        format!("{}/api/report/{}", self.base_url, team.id())
    }

    pub fn settings_url(&self) -> String {
        format!("{}/api/dashboard-settings", self.base_url)
    }
}

#[async_trait]
impl ReportSource for HttpReportSource {
    async fn fetch_report(&self, team: Team) -> Result<ReportData, ReportError> {
        let url = self.report_url(team);
        debug!("GET {}", url);

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ReportError::Fetch {
                team,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_settings(&self, team: Team) -> Result<Vec<DashboardSetting>, ReportError> {
        let url = self.settings_url();
        debug!("GET {}?team={}", url, team);

        let resp = self
            .client
            .get(&url)
            .query(&[("team", team.id())])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ReportError::Fetch {
                team,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Reads `<dir>/<team>.json` and the optional `<dir>/<team>.settings.json`.
pub struct FileReportSource {
    dir: PathBuf,
}

impl FileReportSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn report_path(&self, team: Team) -> PathBuf {
        self.dir.join(format!("{}.json", team.id()))
    }

    pub fn settings_path(&self, team: Team) -> PathBuf {
        self.dir.join(format!("{}.settings.json", team.id()))
    }
}

#[async_trait]
impl ReportSource for FileReportSource {
    async fn fetch_report(&self, team: Team) -> Result<ReportData, ReportError> {
        let path = self.report_path(team);
        debug!("Reading {}", path.display());
        let body = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_settings(&self, team: Team) -> Result<Vec<DashboardSetting>, ReportError> {
        let path = self.settings_path(team);
        match tokio::fs::read(&path).await {
            Ok(body) => Ok(serde_json::from_slice(&body)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}
