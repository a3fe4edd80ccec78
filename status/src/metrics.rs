use dg_sync_core::status::{ChainSyncState, WalletSyncState};
use serde::Serialize;

#[derive(Copy, Clone, PartialEq, Eq, Serialize, Debug, Default)]
pub struct DerivedView {
    pub blocks_behind: u64,
    /// `None` while no wallet is open or its status has not arrived.
    pub wallet_blocks_behind: Option<u64>,
}

pub fn blocks_behind(chain: &ChainSyncState) -> u64 {
    chain.network_height.saturating_sub(chain.local_height)
}

pub fn wallet_blocks_behind(chain: &ChainSyncState, wallet: &WalletSyncState) -> u64 {
    chain.local_height.saturating_sub(wallet.last_synced_block)
}

pub fn derive(chain: &ChainSyncState, wallet: Option<&WalletSyncState>) -> DerivedView {
    DerivedView {
        blocks_behind: blocks_behind(chain),
        wallet_blocks_behind: wallet.map(|w| wallet_blocks_behind(chain, w)),
    }
}
