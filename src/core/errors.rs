use crate::core::models::ids::{AccountId, ExpenseId, GroupId, SplitId};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LedgerError {
    #[error("Group {0} not found")]
    GroupNotFound(GroupId),
    #[error("Account {0} not found")]
    AccountNotFound(AccountId),
    #[error("Expense {0} not found")]
    ExpenseNotFound(ExpenseId),
    #[error("Split {0} not found")]
    SplitNotFound(SplitId),
    /// Splits recorded against an expense do not add up to its amount.
    #[error("Splits of expense {expense_id} sum to {actual}, expected {expected}")]
    InvariantViolation {
        expense_id: ExpenseId,
        expected: Decimal,
        actual: Decimal,
    },
    #[error("Amount exceeds the supported decimal range")]
    AmountOverflow,
    #[error("Account {0} is not a group member")]
    NotGroupMember(AccountId),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl LedgerError {
    /// True for every "referenced id does not exist" failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LedgerError::GroupNotFound(_)
                | LedgerError::AccountNotFound(_)
                | LedgerError::ExpenseNotFound(_)
                | LedgerError::SplitNotFound(_)
        )
    }
}
