use crate::core::errors::LedgerError;
use crate::core::models::{Account, AccountId, Expense, Group, GroupId, Split};
use async_trait::async_trait;

/// Everything recorded against one group, read as a single snapshot.
#[derive(Clone, Debug)]
pub struct GroupLedger {
    pub group: Group,
    pub expenses: Vec<Expense>,
    pub splits: Vec<Split>,
}

/// Read side of the ledger collaborator that feeds the balance engine.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>, LedgerError>;
    async fn get_group(&self, group_id: &GroupId) -> Result<Option<Group>, LedgerError>;
    async fn get_group_expenses(&self, group_id: &GroupId) -> Result<Vec<Expense>, LedgerError>;
    /// Splits of every expense in the group, settled or not.
    async fn get_group_splits(&self, group_id: &GroupId) -> Result<Vec<Split>, LedgerError>;
    async fn get_user_groups(&self, account_id: &AccountId) -> Result<Vec<Group>, LedgerError>;
    /// Every unsettled split owed by the account, across all groups.
    async fn get_unsettled_splits(&self, account_id: &AccountId) -> Result<Vec<Split>, LedgerError>;

    /// Implementations backed by a shared store should override this to read
    /// all three collections consistently.
    async fn get_group_ledger(&self, group_id: &GroupId) -> Result<Option<GroupLedger>, LedgerError> {
        let Some(group) = self.get_group(group_id).await? else {
            return Ok(None);
        };
        let expenses = self.get_group_expenses(group_id).await?;
        let splits = self.get_group_splits(group_id).await?;
        Ok(Some(GroupLedger {
            group,
            expenses,
            splits,
        }))
    }
}

pub mod in_memory;
pub mod snapshot;
