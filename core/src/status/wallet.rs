use serde::{Deserialize, Serialize};

/// Sync progress of a single open wallet.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug, Default)]
pub struct WalletSyncState {
    pub wallet_id: String,
    pub syncing: bool,
    pub progress: f64,
    pub last_synced_block: u64,
    pub balance: i64,
    pub tx_count: u32,
    pub utxo_count: u32,
}

impl WalletSyncState {
    /// Progress clamped into `[0, 1]`, NaN reads as zero.
    pub fn progress_clamped(&self) -> f64 {
        if self.progress.is_nan() {
            0.0
        } else {
            self.progress.clamp(0.0, 1.0)
        }
    }
}
