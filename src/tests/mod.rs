
use crate::core::models::{Account, AccountId, Group, GroupId};
use crate::core::services::BalanceService;
use crate::infrastructure::storage::in_memory::{InMemoryLedger, NewExpense};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn create_test_service() -> BalanceService<InMemoryLedger> {
    let _ = env_logger::builder().is_test(true).try_init();
    BalanceService::new(InMemoryLedger::new())
}

pub fn money(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn id(s: &str) -> AccountId {
    AccountId::from(s)
}

/// Registers Alice, Bob, Carol and Dave.
pub async fn seed_accounts(ledger: &InMemoryLedger) {
    for (account_id, name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol"), ("dave", "Dave")] {
        ledger.add_account(Account::new(account_id, name)).await.unwrap();
    }
}

pub async fn seed_group(ledger: &InMemoryLedger, group_id: &str, members: &[&str]) -> GroupId {
    let group = Group::new(group_id, group_id.to_uppercase(), members.iter().map(|m| id(m)).collect());
    ledger.add_group(group).await.unwrap().id
}

pub fn expense(group: &GroupId, payer: &str, amount: &str, shares: &[(&str, &str)]) -> NewExpense {
    NewExpense {
        group_id: group.clone(),
        payer: id(payer),
        amount: money(amount),
        description: format!("paid by {}", payer),
        shares: shares.iter().map(|(debtor, owed)| (id(debtor), money(owed))).collect(),
    }
}
