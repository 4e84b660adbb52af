//! End-to-end runs from CSV exports on disk to output tables.

use marginledger::{Config, CsvExportSource, ExportSource, Orchestrator};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const TRADES: &str = "\
createdAt,market,side,size,price,fee,type,liquidity
2023-01-04T12:00:00.000Z,BTC-USD,BUY,0.1,21000,1.05,LIMIT,MAKER
2023-01-03T09:30:00.000Z,ETH-USD,SELL,2,1300,0.65,LIMIT,TAKER
2023-01-02T15:00:00.000Z,ETH-USD,BUY,1,1250,0.31,MARKET,TAKER
2023-01-02T10:00:00.000Z,ETH-USD,BUY,1,1200,0.3,MARKET,TAKER
2023-01-01T08:00:00.000Z,BTC-USD,SELL,0.1,20000,1,LIMIT,MAKER
";

const TRANSFERS: &str = "\
createdAt,type,debitAsset,debitAmount,creditAsset,creditAmount,transactionHash
2023-01-05T00:00:00.000Z,FAST_WITHDRAWAL,USDC,500,,,0xbbb
2022-12-31T00:00:00.000Z,DEPOSIT,ETH,1,USDC,1190,0xaaa
";

const FUNDING: &str = "\
market,payment,rate,positionSize,price,effectiveAt
ETH-USD,-0.25,0.0001,1,1250,2023-01-02T16:00:00.000Z
ETH-USD,0.05,0.0001,1,1250,2023-01-02T20:00:00.000Z
BTC-USD,0.1,0.0001,0.1,20000,2023-01-01T12:00:00.000Z
";

struct Fixture {
    input: TempDir,
    output: TempDir,
}

fn fixture(with_activity: bool) -> Fixture {
    let input = TempDir::new().unwrap();
    fs::write(input.path().join("Trades.csv"), TRADES).unwrap();
    if with_activity {
        fs::write(input.path().join("Transfers.csv"), TRANSFERS).unwrap();
        fs::write(input.path().join("Funding.csv"), FUNDING).unwrap();
    }
    Fixture {
        input,
        output: TempDir::new().unwrap(),
    }
}

fn config(f: &Fixture, extra: &[(&str, &str)]) -> Config {
    let mut env = HashMap::new();
    env.insert("INPUT_DIR".to_string(), f.input.path().display().to_string());
    env.insert("OUTPUT_DIR".to_string(), f.output.path().display().to_string());
    for (k, v) in extra {
        env.insert(k.to_string(), v.to_string());
    }
    Config::from_env_map(env).unwrap()
}

fn orchestrator(config: Config) -> Orchestrator {
    let source: Arc<dyn ExportSource> = Arc::new(CsvExportSource::new(
        config.input_dir.clone(),
        config.quote_currency.clone(),
    ));
    Orchestrator::new(source, config)
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_export_run() {
    let f = fixture(true);
    let outcome = orchestrator(config(&f, &[])).run().await.unwrap();
    let out = f.output.path();

    let quote_ledger = read_lines(&out.join("dYdX_USDC_Loans.csv"));
    assert_eq!(
        quote_ledger,
        vec![
            "Date,Received Amount,Received Currency,Sent Amount,Sent Currency,Label",
            "2023-01-02 09:59:00,2450,USDC,,,Margin Loan",
            "2023-01-03 09:31:00,,,2450,USDC,Margin Repayment",
        ]
    );

    let asset_ledger = read_lines(&out.join("dYdX_Crypto_Loans.csv"));
    assert_eq!(
        asset_ledger[1..],
        [
            "2023-01-01 07:59:00,0.1,BTC,,,Margin Loan".to_string(),
            "2023-01-04 12:01:00,,,0.1,BTC,Margin Repayment".to_string(),
        ]
    );

    let trades = read_lines(&out.join("dYdX_Trades.csv"));
    assert_eq!(trades.len(), 6);
    assert_eq!(
        trades[2],
        "2023-01-03 09:30:00,ETH-USDC,Sell,-2,1300,-2600,-0.65,USDC"
    );

    let transfers = read_lines(&out.join("dYdX_Transfers.csv"));
    assert_eq!(transfers[1], "2022-12-31 00:00:00,1,ETH,0xaaa");
    assert_eq!(transfers[2], "2023-01-05 00:00:00,-500,USDC,0xbbb");

    let swaps = read_lines(&out.join("dYdX_Deposit_Swaps.csv"));
    assert_eq!(swaps.len(), 2);
    assert_eq!(
        swaps[1],
        "2022-12-31 00:00:00,1,ETH,1190,USDC,0xaaa,,USDC,Swap,Auto Deposit"
    );

    let funding = read_lines(&out.join("dYdX_Funding.csv"));
    assert_eq!(
        funding[1..],
        [
            "2023-01-01 00:00:00,0.1,Interest Earned,USDC,Funding".to_string(),
            "2023-01-02 00:00:00,-0.2,Margin Fee,USDC,Funding".to_string(),
        ]
    );

    assert!(outcome.output.report.is_clean());
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("dYdX_Run_Report.json")).unwrap())
            .unwrap();
    assert_eq!(report["pairs_processed"][0], "BTC-USDC");
    assert_eq!(report["quote_loan_events"], 2);
}

#[tokio::test]
async fn test_missing_optional_exports() {
    let f = fixture(false);
    orchestrator(config(&f, &[])).run().await.unwrap();

    let out = f.output.path();
    assert!(out.join("dYdX_Trades.csv").exists());
    assert!(!out.join("dYdX_Transfers.csv").exists());
    assert!(!out.join("dYdX_Funding.csv").exists());
}

#[tokio::test]
async fn test_pair_tables() {
    let f = fixture(false);
    orchestrator(config(&f, &[("EXPORT_PAIR_TABLES", "true")]))
        .run()
        .await
        .unwrap();
    let out = f.output.path();

    let eth = read_lines(&out.join("Trade_Data").join("ETH-USDC.csv"));
    assert_eq!(
        eth[0],
        "Koinly Date,Pair,Side,Amount,Price,Total,Fee Amount,Fee Currency,Running Sum,Block"
    );
    // three trades plus the closing marker
    assert_eq!(eth.len(), 5);
    assert_eq!(eth[4], ",,,,,,,,,1");

    let buy_side = read_lines(&out.join("Buy_Side_Data").join("ETH-USDC.csv"));
    assert_eq!(
        buy_side[1],
        "0,2023-01-02 10:00:00,2023-01-03 09:30:00,USDC,2450,Closed"
    );
    assert!(!out.join("Sell_Side_Data").join("ETH-USDC.csv").exists());
    assert!(out.join("Sell_Side_Data").join("BTC-USDC.csv").exists());
}

#[tokio::test]
async fn test_missing_trades_export_fails() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let f = Fixture { input, output };
    let err = orchestrator(config(&f, &[])).run().await.unwrap_err();
    assert!(err.to_string().contains("Trades.csv"));
}

#[tokio::test]
async fn test_outputs_are_byte_identical_across_runs() {
    let f = fixture(true);
    orchestrator(config(&f, &[])).run().await.unwrap();
    let first = fs::read(f.output.path().join("dYdX_USDC_Loans.csv")).unwrap();
    let first_report = fs::read(f.output.path().join("dYdX_Run_Report.json")).unwrap();

    orchestrator(config(&f, &[])).run().await.unwrap();
    let second = fs::read(f.output.path().join("dYdX_USDC_Loans.csv")).unwrap();
    let second_report = fs::read(f.output.path().join("dYdX_Run_Report.json")).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_report, second_report);
}
