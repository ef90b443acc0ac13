pub mod canvas;
pub mod charts;
pub mod colors;
pub mod drawing;
pub mod error;
pub mod export;
pub mod font_metrics;
pub mod layout;
pub mod metrics;
pub mod models;
pub mod pdf_canvas;
pub mod pdf_generator;
pub mod report_data;
pub mod sections;
pub mod settings;
pub mod source;

pub use error::ReportError;
pub use export::{ExportOptions, ExportSummary, Exporter};
pub use models::{ReportData, Team};
pub use pdf_generator::{PdfGenerator, RenderOptions};
