//! Health report aggregation, scoring and archiving.
//!
//! A report is produced in one linear pass:
//! [`collector::Collector`] gathers per-domain records from pluggable
//! [`source::RecordSource`]s, [`scorer`] derives composite scores,
//! [`archiver::Archiver`] persists the snapshot into a [`store::KeyValueStore`],
//! and [`export`] renders the text layout.

use std::time::Duration;

use thiserror::Error;

pub mod archiver;
pub mod collector;
pub mod config;
pub mod export;
pub mod http_source;
pub mod model;
pub mod observability;
pub mod pipeline;
pub mod retry;
pub mod scorer;
pub mod source;
pub mod store;
pub mod synthetic;
pub mod utils;

pub use model::{
    DerivedScores, Domain, DomainSnapshot, DomainSnapshots, HealthReport, Identity, Provenance,
    ReportIndexEntry,
};
pub use scorer::WellnessBand;

/// Failure of a single domain source. Absorbed by the collector.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed data: {0}")]
    Malformed(String),
    #[error("io error: {0}")]
    Io(String),
}

impl SourceError {
    /// Whether another attempt could succeed: transport failures, server
    /// errors and rate limiting.
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(_) => true,
            SourceError::Status { status, .. } => *status >= 500 || *status == 429,
            SourceError::Malformed(_) | SourceError::Io(_) => false,
        }
    }
}

/// Errors that cross into caller-visible state.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report not found: {0}")]
    NotFound(String),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("report generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("render failure: {0}")]
    Render(String),

    #[error("export failure: {0}")]
    Export(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ReportError::NotFound(_) => "report not found",
            ReportError::Persistence(_) => "report could not be saved",
            ReportError::Timeout(_) => "report generation took too long",
            ReportError::Export(_) => "report could not be exported",
            ReportError::Config(_) => "configuration is invalid",
            ReportError::Serialization(_) | ReportError::Render(_) => {
                "report could not be processed"
            }
        }
    }
}

/// Result type alias for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// JSON schema of the persisted [`HealthReport`] body.
pub fn report_json_schema() -> ReportResult<serde_json::Value> {
    let schema = schemars::schema_for!(HealthReport);
    Ok(serde_json::to_value(&schema)?)
}
