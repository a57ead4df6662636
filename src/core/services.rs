use crate::core::balances::{GroupBalances, compute_group_balances};
use crate::core::errors::LedgerError;
use crate::core::models::money::checked_sum;
use crate::core::models::{Account, AccountId, GroupId, Settlement, Split};
use crate::core::settlement::{SettlementPolicy, calculate_settlements_with};
use crate::infrastructure::storage::{GroupLedger, LedgerStore};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserBalance {
    pub user_id: AccountId,
    pub user_name: String,
    pub total_paid: Decimal,
    pub total_owed: Decimal,
    /// Positive when the user is owed money, negative when they owe.
    pub net_balance: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SettlementView {
    pub from_user_id: AccountId,
    pub from_user_name: String,
    pub to_user_id: AccountId,
    pub to_user_name: String,
    pub amount: Decimal,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BalanceReport {
    pub group_id: GroupId,
    pub group_name: String,
    pub user_balances: Vec<UserBalance>,
    pub settlements: Vec<SettlementView>,
    pub total_group_expenses: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// A user's per-group net balances and their sum.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserBalanceSummary {
    pub user_id: AccountId,
    pub group_balances: HashMap<GroupId, Decimal>,
    pub total_net_balance: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Group and user reporting on top of the balance calculator and the
/// settlement optimizer.
///
/// Every call names the caller explicitly through `requested_by`. The caller
/// has to exist; no authorization is applied beyond that.
pub struct BalanceService<S: LedgerStore> {
    storage: S,
    policy: SettlementPolicy,
}

impl<S: LedgerStore> BalanceService<S> {
    pub fn new(storage: S) -> Self {
        Self::with_policy(storage, SettlementPolicy::default())
    }

    pub fn with_policy(storage: S, policy: SettlementPolicy) -> Self {
        BalanceService { storage, policy }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn policy(&self) -> &SettlementPolicy {
        &self.policy
    }

    async fn require_account(&self, account_id: &AccountId) -> Result<Account, LedgerError> {
        self.storage
            .get_account(account_id)
            .await?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.clone()))
    }

    async fn load_group_ledger(&self, group_id: &GroupId) -> Result<GroupLedger, LedgerError> {
        self.storage
            .get_group_ledger(group_id)
            .await?
            .ok_or_else(|| LedgerError::GroupNotFound(group_id.clone()))
    }

    fn settle(&self, ledger: &GroupLedger) -> Result<(GroupBalances, Vec<Settlement>), LedgerError> {
        let balances = compute_group_balances(
            &ledger.group.id,
            &ledger.group.members,
            &ledger.expenses,
            &ledger.splits,
        )?;
        let settlements = calculate_settlements_with(&balances.members(), &balances.net_by_account(), &self.policy);
        Ok((balances, settlements))
    }

    /// Net balance of every member plus the transfers that square the group.
    pub async fn group_balance_report(
        &self,
        group_id: &GroupId,
        requested_by: &AccountId,
    ) -> Result<BalanceReport, LedgerError> {
        self.require_account(requested_by).await?;
        let ledger = self.load_group_ledger(group_id).await?;
        info!("Building balance report for group {} requested by {}", group_id, requested_by);

        if ledger.group.members.is_empty() {
            debug!("Group {} has no members, nothing to settle", group_id);
            return Ok(BalanceReport {
                group_id: ledger.group.id,
                group_name: ledger.group.name,
                user_balances: Vec::new(),
                settlements: Vec::new(),
                total_group_expenses: Decimal::ZERO,
                timestamp: Utc::now(),
            });
        }

        let (balances, settlements) = self.settle(&ledger)?;

        let accounts = try_join_all(balances.entries().iter().map(|e| self.require_account(&e.account_id))).await?;
        let names: HashMap<&AccountId, &str> = accounts.iter().map(|a| (&a.id, a.name.as_str())).collect();
        let name_of = |id: &AccountId| names.get(id).copied().unwrap_or_default().to_string();

        let user_balances = balances
            .entries()
            .iter()
            .map(|e| UserBalance {
                user_id: e.account_id.clone(),
                user_name: name_of(&e.account_id),
                total_paid: e.total_paid,
                total_owed: e.total_owed,
                net_balance: e.net,
            })
            .collect();

        let settlements: Vec<SettlementView> = settlements
            .into_iter()
            .map(|s| SettlementView {
                from_user_name: name_of(&s.from),
                to_user_name: name_of(&s.to),
                from_user_id: s.from,
                to_user_id: s.to,
                amount: s.amount,
            })
            .collect();

        let total_group_expenses = checked_sum(ledger.expenses.iter().map(|e| e.amount))?;
        debug!(
            "Group {} has {} settlements over {} in expenses",
            group_id,
            settlements.len(),
            total_group_expenses
        );

        Ok(BalanceReport {
            group_id: ledger.group.id,
            group_name: ledger.group.name,
            user_balances,
            settlements,
            total_group_expenses,
            timestamp: Utc::now(),
        })
    }

    /// The user's net balance in every group they currently belong to.
    pub async fn user_balance_summary(
        &self,
        user_id: &AccountId,
        requested_by: &AccountId,
    ) -> Result<HashMap<GroupId, Decimal>, LedgerError> {
        self.require_account(requested_by).await?;
        self.require_account(user_id).await?;

        let groups = self.storage.get_user_groups(user_id).await?;
        debug!("Summarising {} groups for user {}", groups.len(), user_id);
        let ledgers = try_join_all(groups.iter().map(|g| self.load_group_ledger(&g.id))).await?;

        let mut summary = HashMap::with_capacity(ledgers.len());
        for ledger in &ledgers {
            let balances = compute_group_balances(
                &ledger.group.id,
                &ledger.group.members,
                &ledger.expenses,
                &ledger.splits,
            )?;
            let net = balances.get(user_id).map(|b| b.net).unwrap_or(Decimal::ZERO);
            summary.insert(ledger.group.id.clone(), net);
        }
        Ok(summary)
    }

    /// [`BalanceService::user_balance_summary`] plus the total across groups.
    pub async fn user_summary_report(
        &self,
        user_id: &AccountId,
        requested_by: &AccountId,
    ) -> Result<UserBalanceSummary, LedgerError> {
        let group_balances = self.user_balance_summary(user_id, requested_by).await?;
        let total_net_balance = checked_sum(group_balances.values().copied())?;
        Ok(UserBalanceSummary {
            user_id: user_id.clone(),
            group_balances,
            total_net_balance,
            timestamp: Utc::now(),
        })
    }

    /// Sum of every unsettled split the user owes, in any group. Splits are
    /// counted even when the user has since left the group.
    pub async fn total_owed_by_user(&self, user_id: &AccountId, requested_by: &AccountId) -> Result<Decimal, LedgerError> {
        self.require_account(requested_by).await?;
        self.require_account(user_id).await?;
        let splits = self.storage.get_unsettled_splits(user_id).await?;
        checked_sum(splits.iter().map(|s| s.owed))
    }

    /// True when the group needs no transfers: net balances already cancel
    /// out (within the dust threshold). Individual splits may still be
    /// flagged unsettled.
    pub async fn is_group_fully_settled(
        &self,
        group_id: &GroupId,
        requested_by: &AccountId,
    ) -> Result<bool, LedgerError> {
        self.require_account(requested_by).await?;
        let ledger = self.load_group_ledger(group_id).await?;
        let (_, settlements) = self.settle(&ledger)?;
        debug!("Group {} needs {} settlements", group_id, settlements.len());
        Ok(settlements.is_empty())
    }

    /// Splits the user still owes within one group.
    pub async fn unsettled_splits(
        &self,
        group_id: &GroupId,
        user_id: &AccountId,
        requested_by: &AccountId,
    ) -> Result<Vec<Split>, LedgerError> {
        self.require_account(requested_by).await?;
        self.require_account(user_id).await?;
        let ledger = self.load_group_ledger(group_id).await?;
        Ok(ledger
            .splits
            .into_iter()
            .filter(|s| &s.debtor == user_id && !s.settled)
            .collect())
    }
}
