use crate::core::errors::LedgerError;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places carried by every stored amount.
pub const MONEY_SCALE: u32 = 2;

/// Transfers of this size or smaller are never emitted.
pub const DUST_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

pub fn round_half_up(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

pub fn checked_sum<I>(amounts: I) -> Result<Decimal, LedgerError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).ok_or(LedgerError::AmountOverflow)
    })
}

/// Rejects zero, negative, and sub-cent amounts.
pub fn validate_amount(field: &str, amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(format!("{} must be positive, got {}", field, amount)));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(LedgerError::InvalidAmount(format!(
            "{} must have at most {} decimal places, got {}",
            field, MONEY_SCALE, amount
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn money(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn rounds_midpoint_up() {
        assert_eq!(round_half_up(money("10.005"), 2), money("10.01"));
        assert_eq!(round_half_up(money("10.004"), 2), money("10.00"));
        assert_eq!(round_half_up(money("33.333333"), 2), money("33.33"));
    }

    #[test]
    fn dust_threshold_is_one_cent() {
        assert_eq!(DUST_THRESHOLD, money("0.01"));
    }

    #[test]
    fn checked_sum_reports_overflow() {
        let result = checked_sum([Decimal::MAX, Decimal::ONE]);
        assert_eq!(result, Err(LedgerError::AmountOverflow));
        assert_eq!(checked_sum([money("1.10"), money("2.20")]), Ok(money("3.30")));
    }

    #[test]
    fn validate_amount_rejects_fractions_of_a_cent() {
        assert!(validate_amount("amount", money("12.50")).is_ok());
        assert!(validate_amount("amount", money("12.500")).is_ok());
        assert!(matches!(
            validate_amount("amount", money("12.505")),
            Err(LedgerError::InvalidAmount(_))
        ));
        assert!(matches!(
            validate_amount("amount", Decimal::ZERO),
            Err(LedgerError::InvalidAmount(_))
        ));
    }
}
