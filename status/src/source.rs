use crate::reconciler::StatusUpdate;
use async_trait::async_trait;
use dg_sync_clients::api::status::{PushAPI, StatusAPI};
use dg_sync_clients::websocket::PushSubscription;
use dg_sync_core::status::{ChainSyncState, StatusTopic, WalletSyncState};
use std::io::Error;
use std::sync::Arc;

/// Everything the aggregator needs from the backend process.
pub trait StatusBackend: StatusAPI + PushAPI + Send + Sync + 'static {}
impl<T: StatusAPI + PushAPI + Send + Sync + 'static> StatusBackend for T {}

/// Pull and push access to one logical status topic.
///
/// A source never touches aggregated state, it only returns what the backend reported.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    type Entity: Into<StatusUpdate> + Send + 'static;
    fn topic(&self) -> StatusTopic;
    /// `Ok(None)` when the backend has nothing to report for the topic.
    async fn fetch(&self) -> Result<Option<Self::Entity>, Error>;
    async fn subscribe(&self) -> Result<PushSubscription<Self::Entity>, Error>;
}

pub struct ChainStatusSource<B: StatusBackend> {
    backend: Arc<B>,
}
impl<B: StatusBackend> ChainStatusSource<B> {
    pub fn new(backend: Arc<B>) -> Self {
        ChainStatusSource { backend }
    }
}

#[async_trait]
impl<B: StatusBackend> StatusSource for ChainStatusSource<B> {
    type Entity = ChainSyncState;
    fn topic(&self) -> StatusTopic {
        StatusTopic::Chain
    }
    async fn fetch(&self) -> Result<Option<ChainSyncState>, Error> {
        self.backend.get_chain_status().await.map(Some)
    }
    async fn subscribe(&self) -> Result<PushSubscription<ChainSyncState>, Error> {
        self.backend.subscribe_chain_status().await
    }
}

pub struct WalletStatusSource<B: StatusBackend> {
    backend: Arc<B>,
    wallet_id: String,
}
impl<B: StatusBackend> WalletStatusSource<B> {
    pub fn new(backend: Arc<B>, wallet_id: &str) -> Self {
        WalletStatusSource {
            backend,
            wallet_id: wallet_id.to_string(),
        }
    }
    pub fn wallet_id(&self) -> &str {
        &self.wallet_id
    }
}

#[async_trait]
impl<B: StatusBackend> StatusSource for WalletStatusSource<B> {
    type Entity = WalletSyncState;
    fn topic(&self) -> StatusTopic {
        StatusTopic::WalletSync
    }
    async fn fetch(&self) -> Result<Option<WalletSyncState>, Error> {
        self.backend.get_wallet_sync_status(&self.wallet_id).await
    }
    async fn subscribe(&self) -> Result<PushSubscription<WalletSyncState>, Error> {
        self.backend
            .subscribe_wallet_sync_status(&self.wallet_id)
            .await
    }
}
