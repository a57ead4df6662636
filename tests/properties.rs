use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use splitledger::core::models::money::DUST_THRESHOLD;
use splitledger::core::models::{AccountId, Expense, ExpenseId, GroupId, Split};
use splitledger::{calculate_settlements, compute_group_balances};
use std::collections::HashMap;

type ExpenseSpec = (usize, Vec<(usize, u32, bool)>);

fn members(count: usize) -> Vec<AccountId> {
    (0..count).map(|i| AccountId::new(format!("member-{}", i))).collect()
}

/// Builds a ledger where every expense amount equals the sum of its splits.
/// Shares are whole units so no net balance ever falls under the dust
/// threshold.
fn build_ledger(group: &GroupId, members: &[AccountId], specs: &[ExpenseSpec]) -> (Vec<Expense>, Vec<Split>) {
    let mut expenses = Vec::new();
    let mut splits = Vec::new();
    for (n, (payer_idx, shares)) in specs.iter().enumerate() {
        let expense_id = ExpenseId::new(format!("expense-{}", n));
        let mut amount = Decimal::ZERO;
        for (debtor_idx, units, settled) in shares {
            let owed = Decimal::from(*units);
            amount += owed;
            let mut split = Split::new(expense_id.clone(), members[debtor_idx % members.len()].clone(), owed);
            if *settled {
                split.mark_settled(Utc::now());
            }
            splits.push(split);
        }
        expenses.push(Expense {
            id: expense_id,
            group_id: group.clone(),
            payer: members[payer_idx % members.len()].clone(),
            amount,
            description: String::new(),
            created_at: Utc::now(),
        });
    }
    (expenses, splits)
}

fn expense_specs(settle_some: bool) -> impl Strategy<Value = Vec<ExpenseSpec>> {
    let settled = if settle_some { any::<bool>().boxed() } else { Just(false).boxed() };
    prop::collection::vec(
        (0usize..6, prop::collection::vec((0usize..6, 1u32..=500, settled), 1..=4)),
        0..=20,
    )
}

proptest! {
    #[test]
    fn balances_sum_to_zero_when_nothing_is_settled(
        member_count in 1usize..=6,
        specs in expense_specs(false),
    ) {
        let group = GroupId::from("g");
        let members = members(member_count);
        let (expenses, splits) = build_ledger(&group, &members, &specs);

        let balances = compute_group_balances(&group, &members, &expenses, &splits).unwrap();
        prop_assert_eq!(balances.total_net().unwrap(), Decimal::ZERO);
    }

    #[test]
    fn balances_sum_to_paid_minus_unsettled(
        member_count in 1usize..=6,
        specs in expense_specs(true),
    ) {
        let group = GroupId::from("g");
        let members = members(member_count);
        let (expenses, splits) = build_ledger(&group, &members, &specs);

        let balances = compute_group_balances(&group, &members, &expenses, &splits).unwrap();
        let paid: Decimal = expenses.iter().map(|e| e.amount).sum();
        let unsettled: Decimal = splits.iter().filter(|s| !s.settled).map(|s| s.owed).sum();
        prop_assert_eq!(balances.total_net().unwrap(), paid - unsettled);
    }

    #[test]
    fn settlements_clear_every_balance(
        member_count in 1usize..=6,
        specs in expense_specs(false),
    ) {
        let group = GroupId::from("g");
        let members = members(member_count);
        let (expenses, splits) = build_ledger(&group, &members, &specs);
        let balances = compute_group_balances(&group, &members, &expenses, &splits).unwrap();
        let nets = balances.net_by_account();

        let settlements = calculate_settlements(&members, &nets);

        let mut remaining: HashMap<AccountId, Decimal> = nets.clone();
        for s in &settlements {
            prop_assert!(s.amount > DUST_THRESHOLD);
            prop_assert!(s.from != s.to);
            *remaining.get_mut(&s.from).unwrap() += s.amount;
            *remaining.get_mut(&s.to).unwrap() -= s.amount;
        }
        prop_assert!(remaining.values().all(|v| v.abs() <= DUST_THRESHOLD));

        let creditors = nets.values().filter(|v| **v > Decimal::ZERO).count();
        let debtors = nets.values().filter(|v| **v < Decimal::ZERO).count();
        if creditors > 0 && debtors > 0 {
            prop_assert!(settlements.len() <= creditors + debtors - 1);
        } else {
            prop_assert!(settlements.is_empty());
        }
        prop_assert!(settlements.len() <= member_count.saturating_sub(1));
    }

    #[test]
    fn settlements_are_deterministic(
        member_count in 1usize..=6,
        specs in expense_specs(true),
    ) {
        let group = GroupId::from("g");
        let members = members(member_count);
        let (expenses, splits) = build_ledger(&group, &members, &specs);
        let balances = compute_group_balances(&group, &members, &expenses, &splits).unwrap();

        let first = calculate_settlements(&members, &balances.net_by_account());
        let second = calculate_settlements(&members, &balances.net_by_account());
        prop_assert_eq!(first, second);
    }
}
