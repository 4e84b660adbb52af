//! Mock export source for testing without files on disk.

use super::{ExportSource, SourceError};
use crate::domain::{RawFunding, RawTrade, RawTransfer};
use async_trait::async_trait;

/// Mock export source that returns predefined rows in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MockExportSource {
    trades: Vec<RawTrade>,
    transfers: Vec<RawTransfer>,
    funding: Vec<RawFunding>,
}

impl MockExportSource {
    /// Create a new mock export source with no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trade row.
    pub fn with_trade(mut self, trade: RawTrade) -> Self {
        self.trades.push(trade);
        self
    }

    /// Add multiple trade rows, keeping their order.
    pub fn with_trades(mut self, trades: Vec<RawTrade>) -> Self {
        self.trades.extend(trades);
        self
    }

    pub fn with_transfers(mut self, transfers: Vec<RawTransfer>) -> Self {
        self.transfers.extend(transfers);
        self
    }

    pub fn with_funding(mut self, funding: Vec<RawFunding>) -> Self {
        self.funding.extend(funding);
        self
    }
}

#[async_trait]
impl ExportSource for MockExportSource {
    async fn fetch_trades(&self) -> Result<Vec<RawTrade>, SourceError> {
        Ok(self.trades.clone())
    }

    async fn fetch_transfers(&self) -> Result<Vec<RawTransfer>, SourceError> {
        Ok(self.transfers.clone())
    }

    async fn fetch_funding(&self) -> Result<Vec<RawFunding>, SourceError> {
        Ok(self.funding.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Currency, Decimal, Pair, Timestamp};

    fn make_test_trade(side: &str) -> RawTrade {
        RawTrade::new(
            Pair::new("BTC-USDC"),
            side,
            Decimal::from_str_canonical("1").unwrap(),
            Decimal::from_str_canonical("20000").unwrap(),
            Decimal::from_str_canonical("2").unwrap(),
            Currency::new("USDC"),
            Timestamp::parse("2023-01-01 00:00:00").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_mock_source_keeps_trade_order() {
        let mock = MockExportSource::new()
            .with_trade(make_test_trade("SELL"))
            .with_trades(vec![make_test_trade("BUY")]);
        let trades = mock.fetch_trades().await.unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].side, "SELL");
        assert_eq!(trades[1].side, "BUY");
    }

    #[tokio::test]
    async fn test_mock_source_empty_activity() {
        let mock = MockExportSource::new();
        assert!(mock.fetch_trades().await.unwrap().is_empty());
        assert!(mock.fetch_transfers().await.unwrap().is_empty());
        assert!(mock.fetch_funding().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_source_funding() {
        let row = RawFunding {
            effective_at: Timestamp::parse("2023-01-01T08:00:00Z"),
            payment: Decimal::coerce("-0.5"),
        };
        let mock = MockExportSource::new().with_funding(vec![row.clone()]);
        assert_eq!(mock.fetch_funding().await.unwrap(), vec![row]);
    }
}
