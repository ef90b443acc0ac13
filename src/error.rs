use thiserror::Error;

use crate::models::Team;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to fetch {team} report: HTTP status {status}")]
    Fetch { team: Team, status: u16 },

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid report data: {0}")]
    InvalidReport(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Filename pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export already in progress: {0}")]
    ExportInProgress(&'static str),
}

impl From<printpdf::Error> for ReportError {
    fn from(err: printpdf::Error) -> Self {
        ReportError::Pdf(err.to_string())
    }
}
