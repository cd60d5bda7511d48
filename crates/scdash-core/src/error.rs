//! Error types for scdash-core
//!
//! Loading failures are fatal at startup. Everything that can go wrong
//! per request (bad parameters, unsupported export) is recoverable and is
//! turned into a message by the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading the metrics table
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV in {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { path: PathBuf, column: String },

    #[error("Invalid record on line {line} in {path}: {message}")]
    InvalidRecord {
        path: PathBuf,
        line: u64,
        message: String,
    },
}

impl LoadError {
    /// Actionable hint shown next to the error by the CLI
    pub fn suggestion(&self) -> Option<String> {
        match self {
            LoadError::FileNotFound { path } => Some(format!(
                "Check the path or pass --data: ls {}",
                path.display()
            )),
            LoadError::FileRead { path, .. } => Some(format!(
                "Check permissions: chmod +r {}",
                path.display()
            )),
            LoadError::MissingColumn { .. } => Some(
                "Expected header: date,type,page,clicks,impressions,ctr,position".to_string(),
            ),
            LoadError::InvalidRecord { path, line, .. } => Some(format!(
                "Inspect line: sed -n '{}p' {}",
                line,
                path.display()
            )),
            LoadError::Csv { .. } => None,
        }
    }
}

/// Failure while exporting a payload
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export format '{format}' is not supported")]
    Unsupported { format: String },

    #[error("Failed to serialize export payload")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write CSV export")]
    Csv(#[from] csv::Error),

    #[error("Failed to finish CSV export: {0}")]
    CsvFlush(String),

    #[error("Failed to write export")]
    Io(#[from] std::io::Error),

    #[error("Failed to build XLSX workbook")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Core error type for scdash operations
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Invalid value '{value}' for {name}: {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CoreError {
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CoreError::InvalidParameter {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by user input rather than the environment
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidParameter { .. }
                | CoreError::Export(ExportError::Unsupported { .. })
        )
    }
}
