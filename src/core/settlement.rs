//! Turns net balances into a list of pairwise transfers.
//!
//! The pairing is greedy: the largest remaining debtor pays the largest
//! remaining creditor until one of them is square, then the walk moves on.
//! Every step squares at least one side, so it is deterministic and emits at
//! most `#creditors + #debtors - 1` transfers. It is not guaranteed to reach
//! the minimum possible number of transfers. That problem is
//! combinatorially harder and solving it would change which accounts get
//! paired.

use crate::core::models::money::{DUST_THRESHOLD, MONEY_SCALE, round_half_up};
use crate::core::models::{AccountId, Settlement};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

/// Knobs for settlement emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementPolicy {
    /// Transfers at or below this amount are suppressed.
    pub dust_threshold: Decimal,
    /// Decimal places emitted amounts are rounded to (half-up).
    pub scale: u32,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        SettlementPolicy {
            dust_threshold: DUST_THRESHOLD,
            scale: MONEY_SCALE,
        }
    }
}

struct Position<'a> {
    account: &'a AccountId,
    remaining: Decimal,
}

pub fn calculate_settlements(members: &[AccountId], net_balances: &HashMap<AccountId, Decimal>) -> Vec<Settlement> {
    calculate_settlements_with(members, net_balances, &SettlementPolicy::default())
}

/// Greedy largest-to-largest matching of debtors to creditors.
///
/// Members missing from `net_balances` count as zero. Equal amounts keep the
/// order in which members are listed. Settlements come out in the order the
/// cursors advance, largest remaining amounts first.
pub fn calculate_settlements_with(
    members: &[AccountId],
    net_balances: &HashMap<AccountId, Decimal>,
    policy: &SettlementPolicy,
) -> Vec<Settlement> {
    let mut creditors: Vec<Position<'_>> = Vec::new();
    let mut debtors: Vec<Position<'_>> = Vec::new();
    let mut seen = HashSet::new();

    for member in members {
        if !seen.insert(member) {
            continue;
        }
        let net = net_balances.get(member).copied().unwrap_or(Decimal::ZERO);
        if net > Decimal::ZERO {
            creditors.push(Position {
                account: member,
                remaining: net,
            });
        } else if net < Decimal::ZERO {
            debtors.push(Position {
                account: member,
                remaining: net.abs(),
            });
        }
    }

    // sort_by is stable, so ties stay in member order
    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut settlements = Vec::new();
    let mut c = 0;
    let mut d = 0;

    while c < creditors.len() && d < debtors.len() {
        let amount = creditors[c].remaining.min(debtors[d].remaining);

        // a coarse scale can round a non-dust step down to nothing
        let rounded = round_half_up(amount, policy.scale);
        if amount > policy.dust_threshold && rounded > Decimal::ZERO {
            settlements.push(Settlement {
                from: debtors[d].account.clone(),
                to: creditors[c].account.clone(),
                amount: rounded,
            });
        }

        creditors[c].remaining -= amount;
        debtors[d].remaining -= amount;

        if creditors[c].remaining.is_zero() {
            c += 1;
        }
        if debtors[d].remaining.is_zero() {
            d += 1;
        }
    }

    settlements
}
