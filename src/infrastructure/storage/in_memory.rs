use crate::core::errors::LedgerError;
use crate::core::models::money::{MONEY_SCALE, checked_sum, validate_amount};
use crate::core::models::{Account, AccountId, Expense, ExpenseId, Group, GroupId, Split, SplitId};
use crate::infrastructure::storage::{GroupLedger, LedgerStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// An expense to record together with every split against it.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub group_id: GroupId,
    pub payer: AccountId,
    pub amount: Decimal,
    pub description: String,
    pub shares: Vec<(AccountId, Decimal)>,
}

impl NewExpense {
    /// Splits `amount` evenly across `debtors`. Leftover cents go to the
    /// first debtors in the list, one each.
    pub fn split_evenly(
        group_id: GroupId,
        payer: AccountId,
        amount: Decimal,
        description: impl Into<String>,
        debtors: &[AccountId],
    ) -> Result<Self, LedgerError> {
        validate_amount("amount", amount)?;
        if debtors.is_empty() {
            return Err(LedgerError::InvalidAmount(
                "an even split needs at least one debtor".to_string(),
            ));
        }

        let count = Decimal::from(debtors.len());
        let cent = Decimal::new(1, MONEY_SCALE);
        let base = (amount / count).round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::ToZero);
        let mut leftover = amount - base * count;

        let shares = debtors
            .iter()
            .map(|debtor| {
                let mut share = base;
                if leftover > Decimal::ZERO {
                    share += cent;
                    leftover -= cent;
                }
                (debtor.clone(), share)
            })
            .filter(|(_, share)| *share > Decimal::ZERO)
            .collect();

        Ok(NewExpense {
            group_id,
            payer,
            amount,
            description: description.into(),
            shares,
        })
    }
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<AccountId, Account>,
    groups: HashMap<GroupId, Group>,
    expenses: Vec<Expense>,
    splits: Vec<Split>,
}

impl LedgerState {
    fn group(&self, group_id: &GroupId) -> Result<&Group, LedgerError> {
        self.groups
            .get(group_id)
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.clone()))
    }

    fn require_member(&self, group: &Group, account_id: &AccountId) -> Result<(), LedgerError> {
        if !self.accounts.contains_key(account_id) {
            return Err(LedgerError::AccountNotFound(account_id.clone()));
        }
        if !group.is_member(account_id) {
            warn!("Account {} is not a member of group {}", account_id, group.id);
            return Err(LedgerError::NotGroupMember(account_id.clone()));
        }
        Ok(())
    }

    fn validate_expense(&self, expense: &Expense, splits: &[Split]) -> Result<(), LedgerError> {
        let group = self.group(&expense.group_id)?;
        if self.expenses.iter().any(|e| e.id == expense.id) {
            return Err(LedgerError::StorageError(format!("Expense {} already recorded", expense.id)));
        }
        self.require_member(group, &expense.payer)?;
        validate_amount("amount", expense.amount)?;

        for split in splits {
            if split.expense_id != expense.id {
                return Err(LedgerError::StorageError(format!(
                    "Split {} belongs to expense {}, not {}",
                    split.id, split.expense_id, expense.id
                )));
            }
            self.require_member(group, &split.debtor)?;
            validate_amount("owed", split.owed)?;
        }

        let actual = checked_sum(splits.iter().map(|s| s.owed))?;
        if actual != expense.amount {
            warn!(
                "Splits of expense {} sum to {}, expected {}",
                expense.id, actual, expense.amount
            );
            return Err(LedgerError::InvariantViolation {
                expense_id: expense.id.clone(),
                expected: expense.amount,
                actual,
            });
        }
        Ok(())
    }

    fn split_mut(&mut self, split_id: &SplitId) -> Result<&mut Split, LedgerError> {
        self.splits
            .iter_mut()
            .find(|s| &s.id == split_id)
            .ok_or_else(|| LedgerError::SplitNotFound(split_id.clone()))
    }

    fn group_expense_ids(&self, group_id: &GroupId) -> HashSet<&ExpenseId> {
        self.expenses
            .iter()
            .filter(|e| &e.group_id == group_id)
            .map(|e| &e.id)
            .collect()
    }

    fn group_splits(&self, group_id: &GroupId) -> Vec<Split> {
        let expense_ids = self.group_expense_ids(group_id);
        self.splits
            .iter()
            .filter(|s| expense_ids.contains(&s.expense_id))
            .cloned()
            .collect()
    }
}

/// Ledger kept in process memory. Every read of a group happens under one
/// lock, so callers always see a consistent snapshot.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        InMemoryLedger::default()
    }

    /// Inserts the account, replacing any previous record with the same id.
    pub async fn add_account(&self, account: Account) -> Result<Account, LedgerError> {
        let mut state = self.state.write().await;
        debug!("Storing account {}", account.id);
        state.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    pub async fn add_group(&self, group: Group) -> Result<Group, LedgerError> {
        let mut state = self.state.write().await;
        if let Some(missing) = group.members.iter().find(|m| !state.accounts.contains_key(*m)) {
            return Err(LedgerError::AccountNotFound(missing.clone()));
        }
        info!("Creating group '{}' with {} members", group.name, group.members.len());
        state.groups.insert(group.id.clone(), group.clone());
        Ok(group)
    }

    /// Adding an existing member is a no-op.
    pub async fn add_member(&self, group_id: &GroupId, account_id: &AccountId) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(account_id) {
            return Err(LedgerError::AccountNotFound(account_id.clone()));
        }
        let group = state
            .groups
            .get_mut(group_id)
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.clone()))?;
        if !group.is_member(account_id) {
            group.members.push(account_id.clone());
            debug!("Account {} joined group {}", account_id, group_id);
        }
        Ok(())
    }

    /// Expenses and splits already recorded for the account stay in place.
    pub async fn remove_member(&self, group_id: &GroupId, account_id: &AccountId) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        let group = state
            .groups
            .get_mut(group_id)
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.clone()))?;
        if !group.is_member(account_id) {
            return Err(LedgerError::NotGroupMember(account_id.clone()));
        }
        group.members.retain(|m| m != account_id);
        debug!("Account {} left group {}", account_id, group_id);
        Ok(())
    }

    /// Creates the expense and all of its splits, or nothing at all.
    pub async fn record_expense(&self, new_expense: NewExpense) -> Result<(Expense, Vec<Split>), LedgerError> {
        let expense = Expense {
            id: ExpenseId::generate(),
            group_id: new_expense.group_id,
            payer: new_expense.payer,
            amount: new_expense.amount,
            description: new_expense.description,
            created_at: Utc::now(),
        };
        let splits = new_expense
            .shares
            .into_iter()
            .map(|(debtor, owed)| Split::new(expense.id.clone(), debtor, owed))
            .collect::<Vec<_>>();

        self.insert_expense(expense.clone(), splits.clone()).await?;
        Ok((expense, splits))
    }

    /// Inserts a fully formed expense after the same checks as
    /// [`InMemoryLedger::record_expense`]. Split ids and settlement state are
    /// kept as given.
    pub async fn insert_expense(&self, expense: Expense, splits: Vec<Split>) -> Result<(), LedgerError> {
        let mut state = self.state.write().await;
        state.validate_expense(&expense, &splits)?;
        info!(
            "Recording expense {} in group {} paid by {} for {}",
            expense.id, expense.group_id, expense.payer, expense.amount
        );
        state.expenses.push(expense);
        state.splits.extend(splits);
        Ok(())
    }

    pub async fn get_expense(&self, expense_id: &ExpenseId) -> Result<Option<Expense>, LedgerError> {
        let state = self.state.read().await;
        Ok(state.expenses.iter().find(|e| &e.id == expense_id).cloned())
    }

    pub async fn get_expense_splits(&self, expense_id: &ExpenseId) -> Result<Vec<Split>, LedgerError> {
        let state = self.state.read().await;
        if !state.expenses.iter().any(|e| &e.id == expense_id) {
            return Err(LedgerError::ExpenseNotFound(expense_id.clone()));
        }
        Ok(state
            .splits
            .iter()
            .filter(|s| &s.expense_id == expense_id)
            .cloned()
            .collect())
    }

    /// Settling an already settled split keeps its original `settled_at`.
    pub async fn settle_split(&self, split_id: &SplitId, at: DateTime<Utc>) -> Result<Split, LedgerError> {
        let mut state = self.state.write().await;
        let split = state.split_mut(split_id)?;
        if split.mark_settled(at) {
            debug!("Split {} settled at {}", split_id, at);
        } else {
            debug!("Split {} was already settled", split_id);
        }
        Ok(split.clone())
    }

    pub async fn unsettle_split(&self, split_id: &SplitId) -> Result<Split, LedgerError> {
        let mut state = self.state.write().await;
        let split = state.split_mut(split_id)?;
        if split.mark_unsettled() {
            debug!("Split {} reopened", split_id);
        }
        Ok(split.clone())
    }

    /// Removes the expense together with every split recorded against it.
    pub async fn delete_expense(&self, expense_id: &ExpenseId) -> Result<Expense, LedgerError> {
        let mut state = self.state.write().await;
        let position = state
            .expenses
            .iter()
            .position(|e| &e.id == expense_id)
            .ok_or_else(|| LedgerError::ExpenseNotFound(expense_id.clone()))?;
        let expense = state.expenses.remove(position);
        let before = state.splits.len();
        state.splits.retain(|s| &s.expense_id != expense_id);
        info!(
            "Deleted expense {} and {} splits from group {}",
            expense_id,
            before - state.splits.len(),
            expense.group_id
        );
        Ok(expense)
    }

    /// Removes the group, its memberships, its expenses and their splits.
    pub async fn delete_group(&self, group_id: &GroupId) -> Result<Group, LedgerError> {
        let mut state = self.state.write().await;
        let group = state
            .groups
            .remove(group_id)
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.clone()))?;
        let expense_ids: HashSet<ExpenseId> = state.group_expense_ids(group_id).into_iter().cloned().collect();
        state.expenses.retain(|e| &e.group_id != group_id);
        state.splits.retain(|s| !expense_ids.contains(&s.expense_id));
        info!("Deleted group {} with {} expenses", group_id, expense_ids.len());
        Ok(group)
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>, LedgerError> {
        Ok(self.state.read().await.accounts.get(account_id).cloned())
    }

    async fn get_group(&self, group_id: &GroupId) -> Result<Option<Group>, LedgerError> {
        Ok(self.state.read().await.groups.get(group_id).cloned())
    }

    async fn get_group_expenses(&self, group_id: &GroupId) -> Result<Vec<Expense>, LedgerError> {
        let state = self.state.read().await;
        Ok(state
            .expenses
            .iter()
            .filter(|e| &e.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn get_group_splits(&self, group_id: &GroupId) -> Result<Vec<Split>, LedgerError> {
        Ok(self.state.read().await.group_splits(group_id))
    }

    async fn get_user_groups(&self, account_id: &AccountId) -> Result<Vec<Group>, LedgerError> {
        let state = self.state.read().await;
        let mut groups: Vec<Group> = state
            .groups
            .values()
            .filter(|g| g.is_member(account_id))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(groups)
    }

    async fn get_unsettled_splits(&self, account_id: &AccountId) -> Result<Vec<Split>, LedgerError> {
        let state = self.state.read().await;
        Ok(state
            .splits
            .iter()
            .filter(|s| &s.debtor == account_id && !s.settled)
            .cloned()
            .collect())
    }

    async fn get_group_ledger(&self, group_id: &GroupId) -> Result<Option<GroupLedger>, LedgerError> {
        let state = self.state.read().await;
        let Some(group) = state.groups.get(group_id).cloned() else {
            return Ok(None);
        };
        let expenses = state
            .expenses
            .iter()
            .filter(|e| &e.group_id == group_id)
            .cloned()
            .collect();
        let splits = state.group_splits(group_id);
        Ok(Some(GroupLedger {
            group,
            expenses,
            splits,
        }))
    }
}
