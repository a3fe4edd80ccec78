use crate::api::status::{PushAPI, StatusAPI};
use crate::rpc::status::StatusClient;
use crate::websocket::{PushClient, PushSubscription};
use async_trait::async_trait;
use dg_sync_core::config::BackendConfig;
use dg_sync_core::status::{ChainSyncState, WalletSyncState};
use std::io::Error;

/// The RPC and push clients of one backend process.
pub struct BackendClient {
    pub rpc: StatusClient,
    pub push: PushClient,
}
impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        BackendClient {
            rpc: StatusClient::from_config(config),
            push: PushClient::from_config(config),
        }
    }
}

#[async_trait]
impl StatusAPI for BackendClient {
    async fn get_chain_status(&self) -> Result<ChainSyncState, Error> {
        self.rpc.get_chain_status().await
    }
    async fn get_wallet_sync_status(
        &self,
        wallet_id: &str,
    ) -> Result<Option<WalletSyncState>, Error> {
        self.rpc.get_wallet_sync_status(wallet_id).await
    }
}

#[async_trait]
impl PushAPI for BackendClient {
    async fn subscribe_chain_status(&self) -> Result<PushSubscription<ChainSyncState>, Error> {
        self.push.subscribe_chain_status().await
    }
    async fn subscribe_wallet_sync_status(
        &self,
        wallet_id: &str,
    ) -> Result<PushSubscription<WalletSyncState>, Error> {
        self.push.subscribe_wallet_sync_status(wallet_id).await
    }
}
