use super::ids::{AccountId, ExpenseId, GroupId, SplitId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Money one account actually paid out on behalf of a group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub payer: AccountId,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// The portion of one expense attributed to one debtor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub id: SplitId,
    pub expense_id: ExpenseId,
    pub debtor: AccountId,
    pub owed: Decimal,
    #[serde(default)]
    pub settled: bool,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
}

impl Split {
    pub fn new(expense_id: ExpenseId, debtor: AccountId, owed: Decimal) -> Self {
        Split {
            id: SplitId::generate(),
            expense_id,
            debtor,
            owed,
            settled: false,
            settled_at: None,
        }
    }

    /// Marks the split settled at `at`. Returns `false` and keeps the
    /// original timestamp when it was already settled.
    pub fn mark_settled(&mut self, at: DateTime<Utc>) -> bool {
        if self.settled {
            return false;
        }
        self.settled = true;
        self.settled_at = Some(at);
        true
    }

    /// Returns `false` when the split was not settled.
    pub fn mark_unsettled(&mut self) -> bool {
        if !self.settled {
            return false;
        }
        self.settled = false;
        self.settled_at = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn split() -> Split {
        Split::new(ExpenseId::from("e1"), AccountId::from("bob"), Decimal::new(3000, 2))
    }

    #[test]
    fn settling_twice_keeps_first_timestamp() {
        let mut split = split();
        let first = Utc::now();
        assert!(split.mark_settled(first));
        assert!(!split.mark_settled(first + Duration::minutes(5)));
        assert!(split.settled);
        assert_eq!(split.settled_at, Some(first));
    }

    #[test]
    fn unsettle_then_settle_restamps() {
        let mut split = split();
        let first = Utc::now();
        split.mark_settled(first);
        assert!(split.mark_unsettled());
        assert!(!split.settled);
        assert_eq!(split.settled_at, None);

        let later = first + Duration::hours(1);
        assert!(split.mark_settled(later));
        assert_eq!(split.settled_at, Some(later));
    }

    #[test]
    fn unsettle_on_open_split_is_noop() {
        let mut split = split();
        assert!(!split.mark_unsettled());
        assert_eq!(split.settled_at, None);
    }
}
