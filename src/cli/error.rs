//! CLI-specific error types

use std::path::PathBuf;
use thiserror::Error;

use crate::database::DatabaseError;
use crate::ingest::RunFailure;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Dataset root not found: {0}")]
    DatasetNotFound(PathBuf),

    #[error("Configuration already exists: {0}")]
    ConfigExists(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),

    #[error(transparent)]
    RunFailed(#[from] RunFailure),
}
