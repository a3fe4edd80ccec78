use dg_sync_clients::api::status::StatusAPI;
use dg_sync_core::config::{Config, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use dg_sync_status::{AggregatorHandle, StatusBackend, StatusSnapshot};
use log::{info, warn};
use serde::Serialize;
use std::env;
use std::io::{Error, ErrorKind};
use std::path::Path;
use std::sync::Arc;

/// Loads the config from `path`, then `DG_SYNC_CONFIG`, then the default location.
/// A missing or broken file falls back to the defaults.
pub fn load_config(path: Option<&str>) -> Config {
    let path = path.map(str::to_string).unwrap_or_else(|| {
        env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
    });
    match Config::try_from(Path::new(&path)) {
        Ok(config) => config,
        Err(e) => {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to load config from {path}, using defaults: {e}");
            }
            Config::default()
        }
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{:?}", e)))
}

pub async fn print_chain_status<C: StatusAPI>(client: &C) -> Result<(), Error> {
    let status = client.get_chain_status().await?;
    println!("{}", to_json(&status)?);
    Ok(())
}

pub async fn print_wallet_status<C: StatusAPI>(client: &C, wallet_id: &str) -> Result<(), Error> {
    match client.get_wallet_sync_status(wallet_id).await? {
        Some(status) => println!("{}", to_json(&status)?),
        None => println!("No sync status for wallet {wallet_id}"),
    }
    Ok(())
}

pub fn format_snapshot(snapshot: &StatusSnapshot) -> String {
    let chain = &snapshot.chain;
    let mut line = format!(
        "chain {}/{} ({} behind) peers={} connected={} syncing={}",
        chain.local_height,
        chain.network_height,
        snapshot.view.blocks_behind,
        chain.peer_count,
        chain.connected,
        chain.syncing,
    );
    match (&snapshot.active_wallet, &snapshot.wallet) {
        (Some(_), Some(wallet)) => line.push_str(&format!(
            " | wallet {} at {} ({} behind) {:.1}% balance={} txs={} utxos={}",
            wallet.wallet_id,
            wallet.last_synced_block,
            snapshot.view.wallet_blocks_behind.unwrap_or_default(),
            wallet.progress_clamped() * 100.0,
            wallet.balance,
            wallet.tx_count,
            wallet.utxo_count,
        )),
        (Some(wallet_id), None) => line.push_str(&format!(" | wallet {wallet_id} waiting")),
        _ => {}
    }
    if snapshot.chain_failures > 0 || snapshot.wallet_failures > 0 {
        line.push_str(&format!(
            " | failures chain={} wallet={}",
            snapshot.chain_failures, snapshot.wallet_failures
        ));
    }
    line
}

/// Runs the aggregator and prints every published snapshot until Ctrl-C.
pub async fn watch<B: StatusBackend>(
    backend: Arc<B>,
    wallet_id: Option<String>,
    json: bool,
) -> Result<(), Error> {
    let handle = AggregatorHandle::spawn(backend);
    if let Some(wallet_id) = &wallet_id {
        handle.open_wallet(wallet_id)?;
    }
    let mut snapshots = handle.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl-C, stopping watch");
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                if json {
                    println!("{}", serde_json::to_string(&snapshot)
                        .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{:?}", e)))?);
                } else {
                    println!("{}", format_snapshot(&snapshot));
                }
            }
        }
    }
    handle.shutdown().await
}
