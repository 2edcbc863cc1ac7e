// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

use expiry_core::{DateError, PolicyError};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid EXPIRY_* configuration: {0}")]
    Config(#[from] envy::Error),
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid threshold policy: {0}")]
    Policy(#[from] PolicyError),
    #[error("Unsupported records file (expected .json or .csv): {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error("JSON records file must hold an array of objects")]
    NotAnObjectArray,
    #[error("No threshold policy configured for field '{0}'")]
    NoPolicyForField(String),
    #[error("No record has a field named '{0}'")]
    UnknownField(String),
    #[error("Invalid --as-of date: {0}")]
    InvalidAsOf(#[source] DateError),
    #[error("Unknown tier '{0}' (use 'all' or one of the policy's tier names)")]
    InvalidTier(String),
}
