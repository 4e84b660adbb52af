//! Reshaping of the non-trade exports into ledger tables.
//!
//! This module provides:
//! - Signed transfer rows (withdrawals negative)
//! - Auto-swapped deposits as swap rows
//! - Daily net funding with fee/income labels

pub mod funding;
pub mod transfers;

pub use funding::compile_funding;
pub use transfers::{compile_deposit_swaps, compile_transfers};
