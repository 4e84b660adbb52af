//! Output sink: writes every table of a run as CSV, plus the JSON run report.
//!
//! This module provides:
//! - Row shapes and header lists per table
//! - File naming under the output directory
//! - Per-pair intermediate tables in their own sub-directories

pub mod rows;

use crate::domain::{Currency, DepositSwap, FundingEntry, LoanSummary, Pair, Trade, Transfer};
use crate::engine::{BlockElement, Ledgers};
use crate::report::RunReport;
use rows::{
    DepositSwapRow, FundingRow, LoanEventRow, LoanSummaryRow, SegmentedRow, TableRow, TradeRow,
    TransferRow,
};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const TRADE_DATA_DIR: &str = "Trade_Data";
pub const BUY_SIDE_DIR: &str = "Buy_Side_Data";
pub const SELL_SIDE_DIR: &str = "Sell_Side_Data";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error writing {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to encode run report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("output writer task failed: {0}")]
    Task(String),
}

/// Intermediate tables of one pair, already filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairTables {
    pub pair: Pair,
    pub elements: Vec<BlockElement>,
    pub buy_side: Vec<LoanSummary>,
    pub sell_side: Vec<LoanSummary>,
}

/// Everything a run writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTables {
    pub trades: Vec<Trade>,
    pub transfers: Vec<Transfer>,
    pub deposit_swaps: Vec<DepositSwap>,
    pub funding: Vec<FundingEntry>,
    pub ledgers: Ledgers,
    /// Empty unless per-pair tables were requested.
    pub pair_tables: Vec<PairTables>,
    pub report: RunReport,
}

#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
    label: String,
    quote: Currency,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>, label: impl Into<String>, quote: Currency) -> Self {
        Self {
            dir: dir.into(),
            label: label.into(),
            quote,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{}", self.label, suffix))
    }

    pub fn trades_path(&self) -> PathBuf {
        self.file("Trades.csv")
    }

    pub fn transfers_path(&self) -> PathBuf {
        self.file("Transfers.csv")
    }

    pub fn deposit_swaps_path(&self) -> PathBuf {
        self.file("Deposit_Swaps.csv")
    }

    pub fn funding_path(&self) -> PathBuf {
        self.file("Funding.csv")
    }

    pub fn quote_loans_path(&self) -> PathBuf {
        self.file(&format!("{}_Loans.csv", self.quote))
    }

    pub fn asset_loans_path(&self) -> PathBuf {
        self.file("Crypto_Loans.csv")
    }

    pub fn report_path(&self) -> PathBuf {
        self.file("Run_Report.json")
    }

    pub fn pair_table_path(&self, sub_dir: &str, pair: &Pair) -> PathBuf {
        let name: String = pair
            .as_str()
            .chars()
            .map(|c| if c == '/' || c == '\\' { '-' } else { c })
            .collect();
        self.dir.join(sub_dir).join(format!("{name}.csv"))
    }

    /// Write all tables and return the paths written, in write order.
    ///
    /// Loan ledgers are always written, header-only when empty. Every other table is
    /// skipped when it has no rows.
    pub fn write_all(&self, tables: &ExportTables) -> Result<Vec<PathBuf>, SinkError> {
        create_dir(&self.dir)?;
        let mut written = Vec::new();

        write_optional::<TradeRow, _>(self.trades_path(), &tables.trades, &mut written)?;
        write_optional::<TransferRow, _>(self.transfers_path(), &tables.transfers, &mut written)?;
        write_optional::<DepositSwapRow, _>(
            self.deposit_swaps_path(),
            &tables.deposit_swaps,
            &mut written,
        )?;
        write_optional::<FundingRow, _>(self.funding_path(), &tables.funding, &mut written)?;

        for pair in &tables.pair_tables {
            write_optional::<SegmentedRow, _>(
                self.pair_table_path(TRADE_DATA_DIR, &pair.pair),
                &pair.elements,
                &mut written,
            )?;
            write_optional::<LoanSummaryRow, _>(
                self.pair_table_path(BUY_SIDE_DIR, &pair.pair),
                &pair.buy_side,
                &mut written,
            )?;
            write_optional::<LoanSummaryRow, _>(
                self.pair_table_path(SELL_SIDE_DIR, &pair.pair),
                &pair.sell_side,
                &mut written,
            )?;
        }

        for (path, events) in [
            (self.quote_loans_path(), &tables.ledgers.quote_loans),
            (self.asset_loans_path(), &tables.ledgers.asset_loans),
        ] {
            write_table::<LoanEventRow, _>(&path, events)?;
            written.push(path);
        }

        self.write_report(&tables.report)?;
        written.push(self.report_path());

        info!(dir = %self.dir.display(), files = written.len(), "Outputs written");
        Ok(written)
    }

    pub fn write_report(&self, report: &RunReport) -> Result<(), SinkError> {
        let path = self.report_path();
        let json = report.to_json()?;
        fs::write(&path, json).map_err(|source| io_error(&path, source))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn create_dir(dir: &Path) -> Result<(), SinkError> {
    fs::create_dir_all(dir).map_err(|source| io_error(dir, source))
}

fn write_optional<'a, R, T>(
    path: PathBuf,
    items: &'a [T],
    written: &mut Vec<PathBuf>,
) -> Result<(), SinkError>
where
    R: TableRow + From<&'a T>,
{
    if items.is_empty() {
        info!(path = %path.display(), "No rows for table, not written");
        return Ok(());
    }
    write_table::<R, T>(&path, items)?;
    written.push(path);
    Ok(())
}

/// Write a header line followed by one row per item.
pub fn write_table<'a, R, T>(path: &Path, items: &'a [T]) -> Result<(), SinkError>
where
    R: TableRow + From<&'a T>,
{
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    let csv_error = |source: csv::Error| SinkError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;
    writer.write_record(R::HEADERS).map_err(csv_error)?;
    for item in items {
        writer.serialize(R::from(item)).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| io_error(path, source))?;

    debug!(path = %path.display(), rows = items.len(), "Wrote table");
    Ok(())
}
