use crate::core::errors::LedgerError;
use crate::core::models::money::checked_sum;
use crate::core::models::{AccountId, Expense, ExpenseId, GroupId, NetBalance, Split};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Net positions of every current member of one group, in member order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GroupBalances {
    group_id: GroupId,
    entries: Vec<NetBalance>,
}

impl GroupBalances {
    pub fn empty(group_id: GroupId) -> Self {
        GroupBalances {
            group_id,
            entries: Vec::new(),
        }
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn entries(&self) -> &[NetBalance] {
        &self.entries
    }

    pub fn get(&self, account_id: &AccountId) -> Option<&NetBalance> {
        self.entries.iter().find(|e| &e.account_id == account_id)
    }

    pub fn members(&self) -> Vec<AccountId> {
        self.entries.iter().map(|e| e.account_id.clone()).collect()
    }

    pub fn net_by_account(&self) -> HashMap<AccountId, Decimal> {
        self.entries
            .iter()
            .map(|e| (e.account_id.clone(), e.net))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_net(&self) -> Result<Decimal, LedgerError> {
        checked_sum(self.entries.iter().map(|e| e.net))
    }
}

/// Reduces one group's ledger to a [`NetBalance`] per current member.
///
/// `total_paid` counts every expense the member paid for, whether or not the
/// splits against it have since been settled. Settling a split only lowers
/// the debtor's `total_owed`; the payer's side is left as recorded.
///
/// Expenses belonging to other groups, and splits of those expenses, are
/// ignored. Accounts that appear in the ledger but are no longer members get
/// no entry.
pub fn compute_group_balances(
    group_id: &GroupId,
    members: &[AccountId],
    expenses: &[Expense],
    splits: &[Split],
) -> Result<GroupBalances, LedgerError> {
    if members.is_empty() {
        return Ok(GroupBalances::empty(group_id.clone()));
    }

    let group_expenses: Vec<&Expense> = expenses.iter().filter(|e| &e.group_id == group_id).collect();
    let expense_ids: HashSet<&ExpenseId> = group_expenses.iter().map(|e| &e.id).collect();
    let group_splits: Vec<&Split> = splits
        .iter()
        .filter(|s| expense_ids.contains(&s.expense_id))
        .collect();

    verify_split_totals(&group_expenses, &group_splits)?;

    let mut paid: HashMap<&AccountId, Decimal> = HashMap::new();
    for expense in &group_expenses {
        let entry = paid.entry(&expense.payer).or_insert(Decimal::ZERO);
        *entry = entry.checked_add(expense.amount).ok_or(LedgerError::AmountOverflow)?;
    }

    let mut owed: HashMap<&AccountId, Decimal> = HashMap::new();
    for split in group_splits.iter().filter(|s| !s.settled) {
        let entry = owed.entry(&split.debtor).or_insert(Decimal::ZERO);
        *entry = entry.checked_add(split.owed).ok_or(LedgerError::AmountOverflow)?;
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(members.len());
    for member in members {
        if !seen.insert(member) {
            continue;
        }
        let total_paid = paid.get(member).copied().unwrap_or(Decimal::ZERO);
        let total_owed = owed.get(member).copied().unwrap_or(Decimal::ZERO);
        let net = total_paid
            .checked_sub(total_owed)
            .ok_or(LedgerError::AmountOverflow)?;
        entries.push(NetBalance {
            account_id: member.clone(),
            total_paid,
            total_owed,
            net,
        });
    }

    Ok(GroupBalances {
        group_id: group_id.clone(),
        entries,
    })
}

/// Every expense's splits, settled or not, must add up to its amount.
fn verify_split_totals(expenses: &[&Expense], splits: &[&Split]) -> Result<(), LedgerError> {
    let mut totals: HashMap<&ExpenseId, Decimal> = HashMap::new();
    for split in splits {
        let entry = totals.entry(&split.expense_id).or_insert(Decimal::ZERO);
        *entry = entry.checked_add(split.owed).ok_or(LedgerError::AmountOverflow)?;
    }

    for expense in expenses {
        let actual = totals.get(&expense.id).copied().unwrap_or(Decimal::ZERO);
        if actual != expense.amount {
            return Err(LedgerError::InvariantViolation {
                expense_id: expense.id.clone(),
                expected: expense.amount,
                actual,
            });
        }
    }
    Ok(())
}
