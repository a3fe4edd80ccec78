use dg_sync_core::status::{ChainSyncState, WalletSyncState};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ChainStatusResp {
    pub chain_status: ChainSyncState,
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletSyncStatusResp {
    pub wallet_sync_status: Option<WalletSyncState>,
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResp {
    pub error: Option<String>,
    pub success: bool,
}
