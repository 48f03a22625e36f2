pub mod config;
pub use config::{Config, DisplayConfig, ExportConfig, ReportConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CourseReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("negative view count {0}: counts must be >= 0")]
    NegativeCount(i64),
    #[error("malformed bucket set: {0}")]
    MalformedBuckets(String),
    #[error("{observed} users with views but only {students} qualifying students")]
    MoreViewersThanStudents { observed: u64, students: u64 },
    #[error("activity completion is not enabled for course {0}")]
    CompletionDisabled(i64),
    #[error("module {module_id} refers to unknown section {section_id}")]
    UnknownSection { module_id: i64, section_id: i64 },
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CourseReportError>;
