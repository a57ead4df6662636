use super::ids::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One proposed transfer from a debtor to a creditor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Decimal,
}

/// An account's paid-minus-owed position within one group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetBalance {
    pub account_id: AccountId,
    pub total_paid: Decimal,
    /// Unsettled splits only.
    pub total_owed: Decimal,
    pub net: Decimal,
}

impl NetBalance {
    pub fn is_creditor(&self) -> bool {
        self.net > Decimal::ZERO
    }

    pub fn is_debtor(&self) -> bool {
        self.net < Decimal::ZERO
    }
}
