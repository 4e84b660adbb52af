//! Reading the exchange's CSV account exports from a directory.

use super::{ExportSource, SourceError};
use crate::domain::{Currency, Decimal, Pair, RawFunding, RawTrade, RawTransfer, Timestamp};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const TRADES_FILE: &str = "Trades.csv";
pub const TRANSFERS_FILE: &str = "Transfers.csv";
pub const FUNDING_FILE: &str = "Funding.csv";

/// Export source backed by `Trades.csv`, `Transfers.csv` and `Funding.csv` in one directory.
///
/// Only `Trades.csv` is required.
#[derive(Debug, Clone)]
pub struct CsvExportSource {
    dir: PathBuf,
    quote: Currency,
}

#[derive(Debug, serde::Deserialize)]
struct TradeRow {
    #[serde(rename = "createdAt")]
    created_at: String,
    market: String,
    side: String,
    size: String,
    price: String,
    #[serde(default)]
    fee: String,
}

#[derive(Debug, serde::Deserialize)]
struct TransferRow {
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(rename = "type", default)]
    transfer_type: String,
    #[serde(rename = "debitAsset")]
    debit_asset: String,
    #[serde(rename = "debitAmount")]
    debit_amount: String,
    #[serde(rename = "creditAsset", default)]
    credit_asset: String,
    #[serde(rename = "creditAmount", default)]
    credit_amount: String,
    #[serde(rename = "transactionHash", default)]
    transaction_hash: String,
}

#[derive(Debug, serde::Deserialize)]
struct FundingRow {
    #[serde(rename = "effectiveAt")]
    effective_at: String,
    payment: String,
}

fn non_empty(s: String) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

impl CsvExportSource {
    pub fn new(dir: impl Into<PathBuf>, quote: Currency) -> Self {
        Self {
            dir: dir.into(),
            quote,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Parse a trades export. Missing fees are read as zero.
    pub fn parse_trades<R: Read>(
        reader: R,
        quote: &Currency,
        label: &str,
    ) -> Result<Vec<RawTrade>, SourceError> {
        let rows: Vec<TradeRow> = deserialize_rows(reader, label)?;
        Ok(rows
            .into_iter()
            .map(|row| RawTrade {
                pair: Pair::from_market(&row.market, quote),
                side: row.side.trim().to_string(),
                amount: Decimal::coerce(&row.size),
                price: Decimal::coerce(&row.price),
                fee_amount: if row.fee.trim().is_empty() {
                    Some(Decimal::zero())
                } else {
                    Decimal::coerce(&row.fee)
                },
                fee_currency: quote.clone(),
                timestamp: Timestamp::parse(&row.created_at),
            })
            .collect())
    }

    pub fn parse_transfers<R: Read>(reader: R, label: &str) -> Result<Vec<RawTransfer>, SourceError> {
        let rows: Vec<TransferRow> = deserialize_rows(reader, label)?;
        Ok(rows
            .into_iter()
            .map(|row| RawTransfer {
                created_at: Timestamp::parse(&row.created_at),
                transfer_type: row.transfer_type.trim().to_string(),
                debit_asset: Currency::new(row.debit_asset.trim()),
                debit_amount: Decimal::coerce(&row.debit_amount),
                credit_asset: non_empty(row.credit_asset).map(Currency::new),
                credit_amount: Decimal::coerce(&row.credit_amount),
                tx_hash: non_empty(row.transaction_hash),
            })
            .collect())
    }

    pub fn parse_funding<R: Read>(reader: R, label: &str) -> Result<Vec<RawFunding>, SourceError> {
        let rows: Vec<FundingRow> = deserialize_rows(reader, label)?;
        Ok(rows
            .into_iter()
            .map(|row| RawFunding {
                effective_at: Timestamp::parse(&row.effective_at),
                payment: Decimal::coerce(&row.payment),
            })
            .collect())
    }

    async fn read_file<T, F>(&self, name: &str, required: bool, parse: F) -> Result<Vec<T>, SourceError>
    where
        T: Send + 'static,
        F: FnOnce(std::fs::File, &str) -> Result<Vec<T>, SourceError> + Send + 'static,
    {
        let path = self.dir.join(name);
        tokio::task::spawn_blocking(move || {
            let label = path.display().to_string();
            if !path.exists() {
                if required {
                    return Err(SourceError::MissingExport(label));
                }
                info!(path = %label, "Optional export not present, treating as empty");
                return Ok(Vec::new());
            }
            let file = std::fs::File::open(&path).map_err(|source| SourceError::Io {
                path: label.clone(),
                source,
            })?;
            let rows = parse(file, &label)?;
            debug!(path = %label, rows = rows.len(), "Read export");
            Ok(rows)
        })
        .await
        .map_err(|e| SourceError::Task(e.to_string()))?
    }
}

fn deserialize_rows<T: DeserializeOwned, R: Read>(reader: R, label: &str) -> Result<Vec<T>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    reader
        .deserialize::<T>()
        .map(|record| {
            record.map_err(|source| SourceError::Csv {
                path: label.to_string(),
                source,
            })
        })
        .collect()
}

#[async_trait]
impl ExportSource for CsvExportSource {
    async fn fetch_trades(&self) -> Result<Vec<RawTrade>, SourceError> {
        let quote = self.quote.clone();
        self.read_file(TRADES_FILE, true, move |file, label| {
            Self::parse_trades(file, &quote, label)
        })
        .await
    }

    async fn fetch_transfers(&self) -> Result<Vec<RawTransfer>, SourceError> {
        self.read_file(TRANSFERS_FILE, false, Self::parse_transfers)
            .await
    }

    async fn fetch_funding(&self) -> Result<Vec<RawFunding>, SourceError> {
        self.read_file(FUNDING_FILE, false, Self::parse_funding)
            .await
    }
}
