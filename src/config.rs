use crate::core::models::money::{DUST_THRESHOLD, MONEY_SCALE};
use crate::core::settlement::SettlementPolicy;
use dotenv::dotenv;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub dust_threshold: Decimal,
    pub settlement_scale: u32,
    pub snapshot_path: Option<String>,
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            dust_threshold: env::var("SETTLEMENT_DUST_THRESHOLD")
                .ok()
                .and_then(|v| Decimal::from_str(&v).ok())
                .filter(|d| *d >= Decimal::ZERO)
                .unwrap_or(DUST_THRESHOLD),
            settlement_scale: env::var("SETTLEMENT_SCALE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|s: &u32| *s <= 28)
                .unwrap_or(MONEY_SCALE),
            snapshot_path: env::var("LEDGER_SNAPSHOT").ok(),
        }
    }

    pub fn settlement_policy(&self) -> SettlementPolicy {
        SettlementPolicy {
            dust_threshold: self.dust_threshold,
            scale: self.settlement_scale,
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_mirrors_config_values() {
        let config = Config {
            log_level: "debug".to_string(),
            dust_threshold: Decimal::new(5, 2),
            settlement_scale: 0,
            snapshot_path: None,
        };
        let policy = config.settlement_policy();
        assert_eq!(policy.dust_threshold, Decimal::new(5, 2));
        assert_eq!(policy.scale, 0);
    }
}
