use crate::compile::{compile_deposit_swaps, compile_funding, compile_transfers};
use crate::config::Config;
use crate::datasource::ExportSource;
use crate::domain::LoanKind;
use crate::engine::{normalize_trades, Ledgers, LoanPipeline, PipelineOutput};
use crate::error::AppError;
use crate::filter::DateRange;
use crate::output::{ExportTables, OutputWriter, PairTables, SinkError};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Engine output; its report also carries transfer and funding issues.
    pub output: PipelineOutput,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
}

/// Drives one batch run: read exports, detect loans, reshape activity, write tables.
#[derive(Clone)]
pub struct Orchestrator {
    source: Arc<dyn ExportSource>,
    config: Config,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn ExportSource>, config: Config) -> Self {
        Self { source, config }
    }

    pub async fn run(&self) -> Result<RunOutcome, AppError> {
        let quote = &self.config.quote_currency;

        let (raw_trades, raw_transfers, raw_funding) = tokio::try_join!(
            self.source.fetch_trades(),
            self.source.fetch_transfers(),
            self.source.fetch_funding(),
        )?;
        info!(
            trades = raw_trades.len(),
            transfers = raw_transfers.len(),
            funding = raw_funding.len(),
            "Exports loaded"
        );

        let normalized = normalize_trades(raw_trades);
        let mut trade_table = normalized.table.clone();
        let mut output = LoanPipeline::new(quote.clone()).run(normalized).await?;
        trade_table.retain(|t| {
            !output
                .report
                .skipped_pairs
                .iter()
                .any(|skipped| skipped.pair() == &t.pair)
        });

        let (transfers, transfer_issues) = compile_transfers(&raw_transfers);
        let deposit_swaps = compile_deposit_swaps(&raw_transfers, quote);
        let (funding, funding_issues) = compile_funding(&raw_funding, quote);
        output.report.issues.extend(transfer_issues);
        output.report.issues.extend(funding_issues);

        let tables = match self.config.date_range {
            Some(range) => {
                info!(range = %range, "Applying date filter");
                ExportTables {
                    trades: range.retain(&trade_table),
                    transfers: range.retain(&transfers),
                    deposit_swaps: range.retain(&deposit_swaps),
                    funding: range.retain(&funding),
                    ledgers: Ledgers {
                        quote_loans: range.retain(&output.ledgers.quote_loans),
                        asset_loans: range.retain(&output.ledgers.asset_loans),
                    },
                    pair_tables: self.pair_tables(&output, Some(&range)),
                    report: output.report.clone(),
                }
            }
            None => ExportTables {
                trades: trade_table,
                transfers,
                deposit_swaps,
                funding,
                ledgers: output.ledgers.clone(),
                pair_tables: self.pair_tables(&output, None),
                report: output.report.clone(),
            },
        };

        let writer = OutputWriter::new(
            self.config.output_dir.clone(),
            self.config.exchange_label.clone(),
            quote.clone(),
        );
        let written = tokio::task::spawn_blocking(move || writer.write_all(&tables))
            .await
            .map_err(|e| SinkError::Task(e.to_string()))??;

        output.report.log_summary();
        Ok(RunOutcome { output, written })
    }

    fn pair_tables(&self, output: &PipelineOutput, range: Option<&DateRange>) -> Vec<PairTables> {
        if !self.config.export_pair_tables {
            return Vec::new();
        }
        output
            .pairs
            .iter()
            .map(|result| {
                let buy_side: Vec<_> = result.summaries_for(LoanKind::Quote).cloned().collect();
                let sell_side: Vec<_> = result.summaries_for(LoanKind::Asset).cloned().collect();
                match range {
                    Some(range) => PairTables {
                        pair: result.pair.clone(),
                        elements: range.retain_segmented(&result.segmentation.elements),
                        buy_side: range.retain(&buy_side),
                        sell_side: range.retain(&sell_side),
                    },
                    None => PairTables {
                        pair: result.pair.clone(),
                        elements: result.segmentation.elements.clone(),
                        buy_side,
                        sell_side,
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::MockExportSource;
    use crate::domain::{Currency, Decimal, Pair, RawTrade, Timestamp};
    use crate::engine::EngineError;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn config(out: &std::path::Path, extra: &[(&str, &str)]) -> Config {
        let mut env: HashMap<String, String> = HashMap::new();
        env.insert("INPUT_DIR".to_string(), "unused".to_string());
        env.insert("OUTPUT_DIR".to_string(), out.display().to_string());
        for (k, v) in extra {
            env.insert(k.to_string(), v.to_string());
        }
        Config::from_env_map(env).unwrap()
    }

    fn raw(side: &str, amount: &str, at: &str) -> RawTrade {
        RawTrade::new(
            Pair::new("ETH-USDC"),
            side,
            Decimal::from_str_canonical(amount).unwrap(),
            Decimal::from_str_canonical("100").unwrap(),
            Decimal::from_str_canonical("0.1").unwrap(),
            Currency::new("USDC"),
            Timestamp::parse(at).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_run_writes_ledgers_and_report() {
        let tmp = TempDir::new().unwrap();
        let source = MockExportSource::new().with_trades(vec![
            raw("SELL", "1", "2023-01-01 11:00:00"),
            raw("BUY", "1", "2023-01-01 10:00:00"),
        ]);
        let orchestrator = Orchestrator::new(Arc::new(source), config(tmp.path(), &[]));

        let outcome = orchestrator.run().await.unwrap();
        assert_eq!(outcome.output.ledgers.quote_loans.len(), 2);
        assert!(outcome.output.ledgers.asset_loans.is_empty());
        assert!(tmp.path().join("dYdX_Trades.csv").exists());
        assert!(tmp.path().join("dYdX_USDC_Loans.csv").exists());
        assert!(tmp.path().join("dYdX_Crypto_Loans.csv").exists());
        assert!(tmp.path().join("dYdX_Run_Report.json").exists());
        assert!(!tmp.path().join("Trade_Data").exists());
    }

    #[tokio::test]
    async fn test_no_trades_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let orchestrator =
            Orchestrator::new(Arc::new(MockExportSource::new()), config(tmp.path(), &[]));
        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, AppError::Engine(EngineError::NoTrades { .. })));
    }

    #[tokio::test]
    async fn test_overflowing_pair_does_not_abort_run() {
        let tmp = TempDir::new().unwrap();
        let huge = RawTrade::new(
            Pair::new("SOL-USDC"),
            "BUY",
            Decimal::from_str_canonical("1").unwrap(),
            Decimal::from_str_canonical("79228162514264337593543950335").unwrap(),
            Decimal::zero(),
            Currency::new("USDC"),
            Timestamp::parse("2023-01-01 09:00:00").unwrap(),
        );
        let mut next = huge.clone();
        next.price = Some(Decimal::from_str_canonical("1").unwrap());
        next.timestamp = Timestamp::parse("2023-01-01 09:30:00");
        let source = MockExportSource::new().with_trades(vec![
            raw("SELL", "1", "2023-01-01 11:00:00"),
            next,
            huge,
            raw("BUY", "1", "2023-01-01 10:00:00"),
        ]);
        let outcome = Orchestrator::new(Arc::new(source), config(tmp.path(), &[]))
            .run()
            .await
            .unwrap();

        assert_eq!(outcome.output.report.skipped_pairs.len(), 1);
        assert_eq!(outcome.output.ledgers.quote_loans.len(), 2);
        let trades = std::fs::read_to_string(tmp.path().join("dYdX_Trades.csv")).unwrap();
        assert!(!trades.contains("SOL-USDC"));
    }

    #[tokio::test]
    async fn test_date_filter_applies_to_ledgers() {
        let tmp = TempDir::new().unwrap();
        let source = MockExportSource::new().with_trades(vec![
            raw("SELL", "1", "2023-01-05 11:00:00"),
            raw("BUY", "1", "2023-01-01 10:00:00"),
        ]);
        let cfg = config(
            tmp.path(),
            &[
                ("DATE_FROM", "2023-01-05"),
                ("DATE_TO", "2023-01-31"),
                ("EXPORT_PAIR_TABLES", "true"),
            ],
        );
        let outcome = Orchestrator::new(Arc::new(source), cfg).run().await.unwrap();

        // Unfiltered engine output still holds both events.
        assert_eq!(outcome.output.ledgers.quote_loans.len(), 2);
        let ledger = std::fs::read_to_string(tmp.path().join("dYdX_USDC_Loans.csv")).unwrap();
        assert_eq!(ledger.lines().count(), 2);
        assert!(ledger.contains("Margin Repayment"));
        assert!(!ledger.contains("Margin Loan"));
    }
}
