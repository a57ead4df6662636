pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::core::balances::{GroupBalances, compute_group_balances};
pub use crate::core::errors::LedgerError;
pub use crate::core::services::{BalanceReport, BalanceService, SettlementView, UserBalance, UserBalanceSummary};
pub use crate::core::settlement::{SettlementPolicy, calculate_settlements, calculate_settlements_with};
pub use crate::infrastructure::storage::in_memory::{InMemoryLedger, NewExpense};
pub use crate::infrastructure::storage::snapshot::LedgerSnapshot;
pub use crate::infrastructure::storage::{GroupLedger, LedgerStore};

#[cfg(test)]
mod tests;
