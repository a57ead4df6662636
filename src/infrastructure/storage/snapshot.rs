use crate::core::errors::LedgerError;
use crate::core::models::{Account, AccountId, Expense, ExpenseId, Group, GroupId, Split, SplitId};
use crate::infrastructure::storage::in_memory::InMemoryLedger;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A whole ledger as exported by the persistence layer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub accounts: Vec<Account>,
    pub groups: Vec<Group>,
    #[serde(default)]
    pub expenses: Vec<SnapshotExpense>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotExpense {
    #[serde(default)]
    pub id: Option<ExpenseId>,
    pub group_id: GroupId,
    pub payer: AccountId,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub splits: Vec<SnapshotSplit>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotSplit {
    #[serde(default)]
    pub id: Option<SplitId>,
    pub debtor: AccountId,
    pub owed: Decimal,
    #[serde(default)]
    pub settled: bool,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
}

impl LedgerSnapshot {
    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(json)
            .map_err(|e| LedgerError::StorageError(format!("Failed to parse ledger snapshot: {}", e)))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::StorageError(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Loads every record into a fresh in-memory ledger, running the same
    /// checks as live expense recording.
    pub async fn into_ledger(self) -> Result<InMemoryLedger, LedgerError> {
        let ledger = InMemoryLedger::new();
        let loaded_at = Utc::now();

        for account in self.accounts {
            ledger.add_account(account).await?;
        }
        for group in self.groups {
            ledger.add_group(group).await?;
        }

        let expense_count = self.expenses.len();
        for record in self.expenses {
            let expense = Expense {
                id: record.id.unwrap_or_else(ExpenseId::generate),
                group_id: record.group_id,
                payer: record.payer,
                amount: record.amount,
                description: record.description,
                created_at: record.created_at.unwrap_or(loaded_at),
            };
            let splits = record
                .splits
                .into_iter()
                .map(|s| Split {
                    id: s.id.unwrap_or_else(SplitId::generate),
                    expense_id: expense.id.clone(),
                    debtor: s.debtor,
                    owed: s.owed,
                    settled: s.settled,
                    settled_at: if s.settled { s.settled_at.or(Some(loaded_at)) } else { None },
                })
                .collect();
            ledger.insert_expense(expense, splits).await?;
        }

        info!("Loaded ledger snapshot with {} expenses", expense_count);
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::LedgerStore;

    const SNAPSHOT: &str = r#"{
        "accounts": [
            {"id": "alice", "name": "Alice"},
            {"id": "bob", "name": "Bob"}
        ],
        "groups": [
            {"id": "flat", "name": "Flat", "members": ["alice", "bob"]}
        ],
        "expenses": [
            {
                "id": "rent",
                "group_id": "flat",
                "payer": "alice",
                "amount": "800.00",
                "splits": [
                    {"debtor": "alice", "owed": "400.00"},
                    {"id": "rent-bob", "debtor": "bob", "owed": "400.00", "settled": true}
                ]
            }
        ]
    }"#;

    #[tokio::test]
    async fn loads_snapshot_into_ledger() {
        let ledger = LedgerSnapshot::from_json(SNAPSHOT).unwrap().into_ledger().await.unwrap();

        let splits = ledger.get_group_splits(&GroupId::from("flat")).await.unwrap();
        assert_eq!(splits.len(), 2);
        let bob = splits.iter().find(|s| s.id == SplitId::from("rent-bob")).unwrap();
        assert!(bob.settled);
        assert!(bob.settled_at.is_some());
        assert!(splits.iter().all(|s| s.expense_id == ExpenseId::from("rent")));
    }

    #[tokio::test]
    async fn rejects_snapshot_with_unbalanced_expense() {
        let broken = SNAPSHOT.replace("\"800.00\"", "\"900.00\"");
        let result = LedgerSnapshot::from_json(&broken).unwrap().into_ledger().await;
        assert!(matches!(result, Err(LedgerError::InvariantViolation { .. })));
    }

    #[test]
    fn malformed_json_is_a_storage_error() {
        assert!(matches!(
            LedgerSnapshot::from_json("{not json"),
            Err(LedgerError::StorageError(_))
        ));
    }
}
