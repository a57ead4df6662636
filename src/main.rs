use splitledger::config::CONFIG;
use splitledger::core::models::{AccountId, GroupId};
use splitledger::{BalanceService, LedgerError, LedgerSnapshot};
use std::env;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(CONFIG.log_level.as_str()).init();

    let path = env::args()
        .nth(1)
        .or_else(|| CONFIG.snapshot_path.clone())
        .ok_or("usage: splitledger <snapshot.json> (or set LEDGER_SNAPSHOT)")?;

    let snapshot = LedgerSnapshot::from_file(&path)?;
    let fallback_caller = snapshot.accounts.first().map(|a| a.id.clone());
    let groups: Vec<(GroupId, Option<AccountId>)> = snapshot
        .groups
        .iter()
        .map(|g| (g.id.clone(), g.members.first().cloned().or_else(|| fallback_caller.clone())))
        .collect();

    let ledger = snapshot.into_ledger().await?;
    let service = BalanceService::with_policy(ledger, CONFIG.settlement_policy());
    info!("Loaded {} groups from {}", groups.len(), path);

    for (group_id, caller) in groups {
        let Some(caller) = caller else {
            warn!("Skipping group {}: snapshot has no accounts to report as", group_id);
            continue;
        };
        let report = service.group_balance_report(&group_id, &caller).await?;
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| LedgerError::StorageError(format!("Failed to serialize report: {}", e)))?;
        println!("{}", json);
    }

    Ok(())
}
