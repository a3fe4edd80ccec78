use async_trait::async_trait;
use dg_sync_clients::api::status::{PushAPI, StatusAPI};
use dg_sync_clients::websocket::PushSubscription;
use dg_sync_core::status::{ChainSyncState, StatusTopic, WalletSyncState};
use dg_sync_status::StatusUpdate;
use simple_logger::SimpleLogger;
use std::io::{Error, ErrorKind};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub fn init_logger() {
    SimpleLogger::new().env().init().unwrap_or_default();
}

pub fn chain_state(local_height: u64, network_height: u64, connected: bool) -> ChainSyncState {
    ChainSyncState {
        local_height,
        network_height,
        connected,
        syncing: local_height < network_height,
        peer_count: 8,
    }
}

pub fn wallet_state(wallet_id: &str, last_synced_block: u64) -> WalletSyncState {
    WalletSyncState {
        wallet_id: wallet_id.to_string(),
        syncing: true,
        progress: 0.5,
        last_synced_block,
        balance: 250_000,
        tx_count: 3,
        utxo_count: 2,
    }
}

/// A fetch issued against [`MockBackend`], held open until the test answers it.
/// Dropping it fails the fetch.
pub struct PendingFetch {
    pub topic: StatusTopic,
    pub wallet_id: Option<String>,
    reply: oneshot::Sender<Result<Option<StatusUpdate>, Error>>,
}
impl PendingFetch {
    pub fn chain(self, state: ChainSyncState) {
        let _ = self.reply.send(Ok(Some(StatusUpdate::Chain(state))));
    }
    pub fn wallet(self, state: WalletSyncState) {
        let _ = self.reply.send(Ok(Some(StatusUpdate::Wallet(state))));
    }
    pub fn absent(self) {
        let _ = self.reply.send(Ok(None));
    }
    pub fn fail(self, msg: &str) {
        let _ = self
            .reply
            .send(Err(Error::new(ErrorKind::ConnectionRefused, msg.to_string())));
    }
}

/// The backend side of one push subscription.
pub struct PushFeed<T> {
    pub topic: StatusTopic,
    pub wallet_id: Option<String>,
    sender: mpsc::Sender<T>,
    released: oneshot::Receiver<()>,
}
impl<T> PushFeed<T> {
    /// Returns false once the subscriber has gone away.
    pub async fn push(&self, entity: T) -> bool {
        self.sender.send(entity).await.is_ok()
    }
    /// Ends the stream from the backend side.
    pub fn end(self) {}
    pub async fn wait_released(self) -> bool {
        matches!(
            tokio::time::timeout(Duration::from_secs(5), self.released).await,
            Ok(_)
        )
    }
}

pub struct MockController {
    fetches: mpsc::UnboundedReceiver<PendingFetch>,
    chain_feeds: mpsc::UnboundedReceiver<PushFeed<ChainSyncState>>,
    wallet_feeds: mpsc::UnboundedReceiver<PushFeed<WalletSyncState>>,
}
impl MockController {
    pub async fn next_fetch(&mut self) -> PendingFetch {
        self.fetches.recv().await.expect("mock backend dropped")
    }
    pub fn try_next_fetch(&mut self) -> Option<PendingFetch> {
        self.fetches.try_recv().ok()
    }
    pub async fn next_chain_feed(&mut self) -> PushFeed<ChainSyncState> {
        self.chain_feeds.recv().await.expect("mock backend dropped")
    }
    pub async fn next_wallet_feed(&mut self) -> PushFeed<WalletSyncState> {
        self.wallet_feeds.recv().await.expect("mock backend dropped")
    }
}

/// In-memory backend whose fetches and push feeds are driven by a [`MockController`].
pub struct MockBackend {
    fetches: mpsc::UnboundedSender<PendingFetch>,
    chain_feeds: mpsc::UnboundedSender<PushFeed<ChainSyncState>>,
    wallet_feeds: mpsc::UnboundedSender<PushFeed<WalletSyncState>>,
    refuse_subscriptions: AtomicBool,
    fetch_count: AtomicUsize,
}
impl MockBackend {
    pub fn new() -> (Arc<Self>, MockController) {
        let (fetches, fetch_rx) = mpsc::unbounded_channel();
        let (chain_feeds, chain_feed_rx) = mpsc::unbounded_channel();
        let (wallet_feeds, wallet_feed_rx) = mpsc::unbounded_channel();
        (
            Arc::new(MockBackend {
                fetches,
                chain_feeds,
                wallet_feeds,
                refuse_subscriptions: AtomicBool::new(false),
                fetch_count: AtomicUsize::new(0),
            }),
            MockController {
                fetches: fetch_rx,
                chain_feeds: chain_feed_rx,
                wallet_feeds: wallet_feed_rx,
            },
        )
    }
    pub fn refuse_subscriptions(&self, refuse: bool) {
        self.refuse_subscriptions.store(refuse, Ordering::SeqCst);
    }
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    async fn fetch(
        &self,
        topic: StatusTopic,
        wallet_id: Option<String>,
    ) -> Result<Option<StatusUpdate>, Error> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let (reply, rx) = oneshot::channel();
        self.fetches
            .send(PendingFetch {
                topic,
                wallet_id,
                reply,
            })
            .map_err(|_| Error::new(ErrorKind::NotConnected, "mock controller dropped"))?;
        rx.await
            .map_err(|_| Error::new(ErrorKind::ConnectionAborted, "fetch dropped"))?
    }

    fn open_feed<T>(
        &self,
        topic: StatusTopic,
        wallet_id: Option<String>,
        feeds: &mpsc::UnboundedSender<PushFeed<T>>,
    ) -> Result<PushSubscription<T>, Error> {
        if self.refuse_subscriptions.load(Ordering::SeqCst) {
            return Err(Error::new(
                ErrorKind::ConnectionRefused,
                format!("{topic} push refused"),
            ));
        }
        let (sender, receiver) = mpsc::channel(16);
        let (release, released) = oneshot::channel();
        feeds
            .send(PushFeed {
                topic,
                wallet_id,
                sender,
                released,
            })
            .map_err(|_| Error::new(ErrorKind::NotConnected, "mock controller dropped"))?;
        Ok(PushSubscription::new(topic, receiver, release))
    }
}

#[async_trait]
impl StatusAPI for MockBackend {
    async fn get_chain_status(&self) -> Result<ChainSyncState, Error> {
        match self.fetch(StatusTopic::Chain, None).await? {
            Some(StatusUpdate::Chain(state)) => Ok(state),
            other => Err(Error::new(
                ErrorKind::InvalidData,
                format!("Not a chain status: {:?}", other),
            )),
        }
    }
    async fn get_wallet_sync_status(
        &self,
        wallet_id: &str,
    ) -> Result<Option<WalletSyncState>, Error> {
        match self
            .fetch(StatusTopic::WalletSync, Some(wallet_id.to_string()))
            .await?
        {
            Some(StatusUpdate::Wallet(state)) => Ok(Some(state)),
            None => Ok(None),
            other => Err(Error::new(
                ErrorKind::InvalidData,
                format!("Not a wallet status: {:?}", other),
            )),
        }
    }
}

#[async_trait]
impl PushAPI for MockBackend {
    async fn subscribe_chain_status(&self) -> Result<PushSubscription<ChainSyncState>, Error> {
        self.open_feed(StatusTopic::Chain, None, &self.chain_feeds)
    }
    async fn subscribe_wallet_sync_status(
        &self,
        wallet_id: &str,
    ) -> Result<PushSubscription<WalletSyncState>, Error> {
        self.open_feed(
            StatusTopic::WalletSync,
            Some(wallet_id.to_string()),
            &self.wallet_feeds,
        )
    }
}
