//! Export source abstraction for reading trades, transfers and funding payments.

use crate::domain::{RawFunding, RawTrade, RawTransfer};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod csv_export;
pub mod mock;

pub use csv_export::CsvExportSource;
pub use mock::MockExportSource;

/// Source of one exchange session's exports.
///
/// Implementations coerce unparsable cells to `None` instead of failing; only
/// structural problems (unreadable or missing required files) are errors.
#[async_trait]
pub trait ExportSource: Send + Sync + fmt::Debug {
    /// Trade rows in export order (typically newest first).
    async fn fetch_trades(&self) -> Result<Vec<RawTrade>, SourceError>;

    /// Transfer rows in export order. Empty when the session has none.
    async fn fetch_transfers(&self) -> Result<Vec<RawTransfer>, SourceError>;

    /// Funding payments in export order. Empty when the session has none.
    async fn fetch_funding(&self) -> Result<Vec<RawFunding>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("required export not found: {0}")]
    MissingExport(String),
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("export reader task failed: {0}")]
    Task(String),
}
