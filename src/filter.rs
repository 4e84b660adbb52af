//! Calendar-date window applied to output tables.

use crate::domain::{
    DepositSwap, FundingEntry, LoanEvent, LoanSummary, Timestamp, Trade, Transfer,
};
use crate::engine::BlockElement;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

/// Rows that can be placed on the calendar. `None` means "always keep".
pub trait Dated {
    fn date(&self) -> Option<Timestamp>;
}

impl DateRange {
    /// Returns `None` when `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, at: &Timestamp) -> bool {
        let day = at.date();
        self.from <= day && day <= self.to
    }

    fn keeps<T: Dated>(&self, row: &T) -> bool {
        row.date().map_or(true, |at| self.contains(&at))
    }

    /// Keep undated rows and rows inside the window, preserving order.
    pub fn retain<T: Dated + Clone>(&self, rows: &[T]) -> Vec<T> {
        rows.iter().filter(|r| self.keeps(*r)).cloned().collect()
    }

    /// Date-filter a segmented table, then trim it to its recurring blocks.
    ///
    /// Only rows whose block lies between the smallest and largest block id that still
    /// occurs more than once survive, and a leading marker is dropped. A table with no
    /// recurring block comes back empty.
    pub fn retain_segmented(&self, elements: &[BlockElement]) -> Vec<BlockElement> {
        let dated: Vec<&BlockElement> = elements.iter().filter(|e| self.keeps(*e)).collect();

        let mut counts: HashMap<u32, usize> = HashMap::new();
        for element in &dated {
            *counts.entry(element.block_id()).or_default() += 1;
        }
        let recurring: Vec<u32> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(block, _)| block)
            .collect();
        let (Some(&lo), Some(&hi)) = (recurring.iter().min(), recurring.iter().max()) else {
            return Vec::new();
        };

        let mut kept: Vec<BlockElement> = dated
            .into_iter()
            .filter(|e| (lo..=hi).contains(&e.block_id()))
            .cloned()
            .collect();
        if matches!(kept.first(), Some(BlockElement::Marker { .. })) {
            kept.remove(0);
        }
        kept
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

impl Dated for Trade {
    fn date(&self) -> Option<Timestamp> {
        Some(self.timestamp)
    }
}

impl Dated for Transfer {
    fn date(&self) -> Option<Timestamp> {
        Some(self.date)
    }
}

impl Dated for DepositSwap {
    fn date(&self) -> Option<Timestamp> {
        Some(self.date)
    }
}

impl Dated for FundingEntry {
    fn date(&self) -> Option<Timestamp> {
        Some(self.date)
    }
}

impl Dated for LoanEvent {
    fn date(&self) -> Option<Timestamp> {
        Some(self.date)
    }
}

impl Dated for LoanSummary {
    fn date(&self) -> Option<Timestamp> {
        Some(self.start_time)
    }
}

impl Dated for BlockElement {
    fn date(&self) -> Option<Timestamp> {
        self.as_trade().map(|t| t.trade.timestamp)
    }
}
