use crate::lifecycle::{Delivery, DeliveryKind, SubscriptionLifecycle};
use crate::metrics::DerivedView;
use crate::reconciler::{ApplyOutcome, Reconciler};
use crate::scope::{Scope, ScopeKind};
use crate::source::{ChainStatusSource, StatusBackend, WalletStatusSource};
use dg_sync_core::errors::RecentErrors;
use dg_sync_core::status::{ChainSyncState, WalletSyncState};
use log::{debug, info, warn};
use serde::Serialize;
use std::io::{Error, ErrorKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const RECENT_ERROR_DEPTH: usize = 16;
const RECENT_ERROR_DURATION: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenWallet(String),
    CloseWallet,
    Shutdown,
}

/// Read-only copy of the aggregated state, published after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct StatusSnapshot {
    pub chain: ChainSyncState,
    pub wallet: Option<WalletSyncState>,
    pub active_wallet: Option<String>,
    pub view: DerivedView,
    pub chain_failures: u32,
    pub wallet_failures: u32,
    pub recent_errors: Vec<String>,
}

pub struct SyncStatusAggregator<B: StatusBackend> {
    backend: Arc<B>,
    reconciler: Reconciler,
    chain: SubscriptionLifecycle,
    wallet: SubscriptionLifecycle,
    deliveries: mpsc::UnboundedReceiver<Delivery>,
    snapshot: watch::Sender<StatusSnapshot>,
    recent_errors: RecentErrors<String>,
}
impl<B: StatusBackend> SyncStatusAggregator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let chain_scope = Scope::chain();
        let wallet_scope = Scope::wallet();
        let (sink, deliveries) = mpsc::unbounded_channel();
        let (snapshot, _) = watch::channel(StatusSnapshot::default());
        SyncStatusAggregator {
            backend,
            reconciler: Reconciler::new(chain_scope.clone(), wallet_scope.clone()),
            chain: SubscriptionLifecycle::new(chain_scope, sink.clone()),
            wallet: SubscriptionLifecycle::new(wallet_scope, sink),
            deliveries,
            snapshot,
            recent_errors: RecentErrors::new(RECENT_ERROR_DEPTH, RECENT_ERROR_DURATION),
        }
    }

    pub fn current_chain_sync_state(&self) -> ChainSyncState {
        *self.reconciler.chain()
    }
    pub fn current_wallet_sync_state(&self) -> Option<&WalletSyncState> {
        self.reconciler.wallet()
    }
    pub fn derived_metrics(&self) -> DerivedView {
        self.reconciler.derived()
    }
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
    pub fn chain_lifecycle(&self) -> &SubscriptionLifecycle {
        &self.chain
    }
    pub fn wallet_lifecycle(&self) -> &SubscriptionLifecycle {
        &self.wallet
    }
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshot.subscribe()
    }

    /// Starts the global chain scope.
    pub fn start(&mut self) {
        self.chain
            .start(Arc::new(ChainStatusSource::new(self.backend.clone())));
        self.publish();
    }

    /// Switches the wallet scope to `wallet_id`. The previous wallet's state is absent
    /// from this point on, before the new scope issues anything.
    pub fn open_wallet(&mut self, wallet_id: &str) {
        self.wallet.stop();
        self.reconciler.close_wallet();
        info!("Opening wallet {wallet_id}");
        self.reconciler.open_wallet(wallet_id);
        self.wallet.start(Arc::new(WalletStatusSource::new(
            self.backend.clone(),
            wallet_id,
        )));
        self.publish();
    }

    pub fn close_wallet(&mut self) {
        self.wallet.stop();
        self.reconciler.close_wallet();
        self.publish();
    }

    pub fn shutdown(&mut self) {
        info!("Shutting down sync status aggregator");
        self.wallet.stop();
        self.reconciler.close_wallet();
        self.chain.stop();
        self.publish();
    }

    pub async fn next_delivery(&mut self) -> Option<Delivery> {
        self.deliveries.recv().await
    }

    /// Waits for the next delivery and applies it.
    pub async fn process_next(&mut self) -> Option<ApplyOutcome> {
        let delivery = self.deliveries.recv().await?;
        Some(self.handle_delivery(delivery))
    }

    pub fn handle_delivery(&mut self, delivery: Delivery) -> ApplyOutcome {
        let Delivery {
            scope,
            generation,
            kind,
        } = delivery;
        let lifecycle = match scope {
            ScopeKind::Chain => &mut self.chain,
            ScopeKind::Wallet => &mut self.wallet,
        };
        lifecycle.acknowledge(generation);
        let outcome = match kind {
            DeliveryKind::Fetched(Some(update)) | DeliveryKind::Pushed(update) => {
                self.reconciler.apply(generation, update)
            }
            DeliveryKind::Fetched(None) => self.reconciler.apply_absent(scope, generation),
            DeliveryKind::FetchFailed(e) => {
                let outcome = self.reconciler.record_failure(scope, generation, &e);
                if outcome == ApplyOutcome::Failed {
                    self.recent_errors
                        .add(format!("Failed to fetch {scope} status: {e}"));
                }
                outcome
            }
            DeliveryKind::SubscribeFailed(e) => {
                if lifecycle.scope().is_current(generation) {
                    warn!("Failed to subscribe to {scope} status, polling only: {e}");
                    self.recent_errors
                        .add(format!("Failed to subscribe to {scope} status: {e}"));
                    ApplyOutcome::Failed
                } else {
                    ApplyOutcome::StaleGeneration
                }
            }
            DeliveryKind::PushEnded => {
                if lifecycle.scope().is_current(generation) {
                    info!("{scope} push stream ended, polling only");
                    ApplyOutcome::Unchanged
                } else {
                    ApplyOutcome::StaleGeneration
                }
            }
        };
        if outcome.is_discard() {
            debug!("Discarded {scope} delivery: {:?}", outcome);
        } else {
            self.publish();
        }
        outcome
    }

    /// Runs the event loop until a shutdown command arrives or every handle is dropped.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        self.start();
        loop {
            select! {
                command = commands.recv() => match command {
                    Some(Command::OpenWallet(wallet_id)) => self.open_wallet(&wallet_id),
                    Some(Command::CloseWallet) => self.close_wallet(),
                    Some(Command::Shutdown) | None => break,
                },
                Some(delivery) = self.deliveries.recv() => {
                    self.handle_delivery(delivery);
                }
            }
        }
        self.shutdown();
    }

    fn publish(&mut self) {
        let snapshot = StatusSnapshot {
            chain: *self.reconciler.chain(),
            wallet: self.reconciler.wallet().cloned(),
            active_wallet: self.reconciler.active_wallet().map(str::to_string),
            view: self.reconciler.derived(),
            chain_failures: self.reconciler.consecutive_failures(ScopeKind::Chain),
            wallet_failures: self.reconciler.consecutive_failures(ScopeKind::Wallet),
            recent_errors: self.recent_errors.values(),
        };
        self.snapshot.send_replace(snapshot);
    }
}

/// Thread safe front of a spawned [`SyncStatusAggregator`].
pub struct AggregatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<StatusSnapshot>,
    task: JoinHandle<()>,
}
impl AggregatorHandle {
    pub fn spawn<B: StatusBackend>(backend: Arc<B>) -> Self {
        let aggregator = SyncStatusAggregator::new(backend);
        let snapshot = aggregator.subscribe();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(aggregator.run(command_rx));
        AggregatorHandle {
            commands,
            snapshot,
            task,
        }
    }

    fn send(&self, command: Command) -> Result<(), Error> {
        self.commands.send(command).map_err(|e| {
            Error::new(
                ErrorKind::BrokenPipe,
                format!("Sync status aggregator has stopped: {:?}", e.0),
            )
        })
    }
    pub fn open_wallet(&self, wallet_id: &str) -> Result<(), Error> {
        self.send(Command::OpenWallet(wallet_id.to_string()))
    }
    pub fn close_wallet(&self) -> Result<(), Error> {
        self.send(Command::CloseWallet)
    }
    /// Asks the loop to stop without waiting for it.
    pub fn request_shutdown(&self) -> Result<(), Error> {
        self.send(Command::Shutdown)
    }

    pub fn current_chain_sync_state(&self) -> ChainSyncState {
        self.snapshot.borrow().chain
    }
    pub fn current_wallet_sync_state(&self) -> Option<WalletSyncState> {
        self.snapshot.borrow().wallet.clone()
    }
    pub fn derived_metrics(&self) -> DerivedView {
        self.snapshot.borrow().view
    }
    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot.borrow().clone()
    }
    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.snapshot.clone()
    }
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn shutdown(self) -> Result<(), Error> {
        let _ = self.commands.send(Command::Shutdown);
        self.task
            .await
            .map_err(|e| Error::new(ErrorKind::Other, format!("{:?}", e)))
    }
}
