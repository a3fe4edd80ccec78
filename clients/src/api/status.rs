use crate::websocket::PushSubscription;
use async_trait::async_trait;
use dg_sync_core::status::{ChainSyncState, WalletSyncState};
use std::io::Error;

/// Request/response side of the backend.
#[async_trait]
pub trait StatusAPI {
    async fn get_chain_status(&self) -> Result<ChainSyncState, Error>;
    /// `Ok(None)` when the backend has no sync status for the wallet.
    async fn get_wallet_sync_status(
        &self,
        wallet_id: &str,
    ) -> Result<Option<WalletSyncState>, Error>;
}

/// Event-push side of the backend.
#[async_trait]
pub trait PushAPI {
    async fn subscribe_chain_status(&self) -> Result<PushSubscription<ChainSyncState>, Error>;
    async fn subscribe_wallet_sync_status(
        &self,
        wallet_id: &str,
    ) -> Result<PushSubscription<WalletSyncState>, Error>;
}
