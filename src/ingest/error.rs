//! Per-file ingestion errors
//!
//! Every variant here is recoverable: the offending file is excluded from
//! its batch and the run continues.

use std::path::PathBuf;

use thiserror::Error;

/// Why a path could not be decoded into a hierarchy address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassificationReason {
    #[error("no category marker (aggregated, map, top) followed by a scope marker (transaction, user)")]
    MissingMarkers,

    #[error("expected country/<country>/[state/<state>/]<year>/<quarter>.json after the scope marker")]
    Truncated,

    #[error("unexpected segment {0:?} after the scope marker")]
    UnexpectedSegment(String),

    #[error("country segment is missing or is a reserved marker: {0:?}")]
    InvalidCountry(String),

    #[error("state segment is empty")]
    EmptyState,

    #[error("year segment is not an integer: {0:?}")]
    InvalidYear(String),

    #[error("quarter file name must be 1.json to 4.json, found {0:?}")]
    InvalidQuarter(String),
}

/// A dataset path whose shape is not recognised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognised dataset path {path}: {reason}")]
pub struct ClassificationError {
    pub path: String,
    pub reason: ClassificationReason,
}

impl ClassificationError {
    pub(crate) fn new(path: impl Into<String>, reason: ClassificationReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

/// Errors raised while turning one dataset file into flat records
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    /// Payload parsed but lacks (or mistypes) a field the shape needs
    #[error("Schema mismatch for {address}: missing or invalid field `{field}`")]
    SchemaMismatch { address: String, field: String },

    /// Payload is not valid JSON
    #[error("Malformed payload in {path}: {reason}")]
    PayloadFormat { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file pattern: {0}")]
    InvalidPattern(String),
}

impl IngestError {
    /// Short machine-friendly label used in run summaries
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Classification(_) => "classification",
            IngestError::SchemaMismatch { .. } => "schema-mismatch",
            IngestError::PayloadFormat { .. } => "payload-format",
            IngestError::Io { .. } => "io",
            IngestError::InvalidPattern(_) => "invalid-pattern",
        }
    }
}
