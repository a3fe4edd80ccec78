use crate::metrics::{derive, DerivedView};
use crate::scope::{Generation, Scope, ScopeKind};
use dg_sync_core::status::{ChainSyncState, WalletSyncState};
use log::{debug, error, trace, warn};
use serde::Serialize;
use std::io::Error;
use std::sync::Arc;

/// Consecutive fetch failures after which a scope is reported as unreachable.
pub const FAILURE_ALERT_THRESHOLD: u32 = 3;

#[derive(Clone, PartialEq, Debug)]
pub enum StatusUpdate {
    Chain(ChainSyncState),
    Wallet(WalletSyncState),
}
impl StatusUpdate {
    pub fn scope(&self) -> ScopeKind {
        match self {
            StatusUpdate::Chain(_) => ScopeKind::Chain,
            StatusUpdate::Wallet(_) => ScopeKind::Wallet,
        }
    }
}
impl From<ChainSyncState> for StatusUpdate {
    fn from(value: ChainSyncState) -> Self {
        StatusUpdate::Chain(value)
    }
}
impl From<WalletSyncState> for StatusUpdate {
    fn from(value: WalletSyncState) -> Self {
        StatusUpdate::Wallet(value)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Serialize, Debug)]
pub enum ApplyOutcome {
    /// The record was replaced in full.
    Applied,
    /// Accepted, but nothing to apply.
    Unchanged,
    /// A transport failure was counted, state retained.
    Failed,
    StaleGeneration,
    NoActiveWallet,
    WalletMismatch,
}
impl ApplyOutcome {
    pub fn is_discard(&self) -> bool {
        matches!(
            self,
            ApplyOutcome::StaleGeneration
                | ApplyOutcome::NoActiveWallet
                | ApplyOutcome::WalletMismatch
        )
    }
}

/// Owner of the current chain and wallet status.
///
/// Every accepted entity overwrites the whole record in arrival order. There is no
/// field merge and no comparison of heights, so a lower height delivered last wins.
pub struct Reconciler {
    chain_scope: Arc<Scope>,
    wallet_scope: Arc<Scope>,
    chain: ChainSyncState,
    wallet: Option<WalletSyncState>,
    active_wallet: Option<String>,
    chain_failures: u32,
    wallet_failures: u32,
}
impl Reconciler {
    pub fn new(chain_scope: Arc<Scope>, wallet_scope: Arc<Scope>) -> Self {
        Reconciler {
            chain_scope,
            wallet_scope,
            chain: ChainSyncState::default(),
            wallet: None,
            active_wallet: None,
            chain_failures: 0,
            wallet_failures: 0,
        }
    }

    pub fn chain(&self) -> &ChainSyncState {
        &self.chain
    }
    pub fn wallet(&self) -> Option<&WalletSyncState> {
        self.wallet.as_ref()
    }
    pub fn active_wallet(&self) -> Option<&str> {
        self.active_wallet.as_deref()
    }
    pub fn derived(&self) -> DerivedView {
        derive(&self.chain, self.wallet.as_ref())
    }
    pub fn consecutive_failures(&self, scope: ScopeKind) -> u32 {
        match scope {
            ScopeKind::Chain => self.chain_failures,
            ScopeKind::Wallet => self.wallet_failures,
        }
    }

    /// Begins tracking `wallet_id`. Any previous wallet state is dropped first.
    pub fn open_wallet(&mut self, wallet_id: &str) {
        self.close_wallet();
        self.active_wallet = Some(wallet_id.to_string());
    }

    pub fn close_wallet(&mut self) {
        if let Some(wallet_id) = self.active_wallet.take() {
            debug!("Clearing sync state for wallet {wallet_id}");
        }
        self.wallet = None;
        self.wallet_failures = 0;
    }

    pub fn apply(&mut self, generation: Generation, update: StatusUpdate) -> ApplyOutcome {
        let scope = update.scope();
        if let Some(outcome) = self.check_delivery(scope, generation) {
            return outcome;
        }
        match update {
            StatusUpdate::Chain(chain) => {
                trace!("Applying chain status {:?}", chain);
                self.chain = chain;
                self.chain_failures = 0;
            }
            StatusUpdate::Wallet(wallet) => {
                if self.active_wallet.as_deref() != Some(wallet.wallet_id.as_str()) {
                    debug!(
                        "Dropping status for wallet {}, active wallet is {:?}",
                        wallet.wallet_id, self.active_wallet
                    );
                    return ApplyOutcome::WalletMismatch;
                }
                trace!("Applying wallet status {:?}", wallet);
                self.wallet = Some(wallet);
                self.wallet_failures = 0;
            }
        }
        ApplyOutcome::Applied
    }

    /// A fetch that succeeded but returned nothing. The current record is kept.
    pub fn apply_absent(&mut self, scope: ScopeKind, generation: Generation) -> ApplyOutcome {
        if let Some(outcome) = self.check_delivery(scope, generation) {
            return outcome;
        }
        debug!("Backend reported no {scope} status, keeping last known state");
        match scope {
            ScopeKind::Chain => self.chain_failures = 0,
            ScopeKind::Wallet => self.wallet_failures = 0,
        }
        ApplyOutcome::Unchanged
    }

    /// Counts a failed fetch. State is never cleared, `connected` only changes through an
    /// applied entity.
    pub fn record_failure(
        &mut self,
        scope: ScopeKind,
        generation: Generation,
        err: &Error,
    ) -> ApplyOutcome {
        if let Some(outcome) = self.check_delivery(scope, generation) {
            return outcome;
        }
        let failures = match scope {
            ScopeKind::Chain => &mut self.chain_failures,
            ScopeKind::Wallet => &mut self.wallet_failures,
        };
        *failures += 1;
        if *failures >= FAILURE_ALERT_THRESHOLD {
            error!(
                "{scope} status unreachable after {} attempts, holding last known state: {err}",
                *failures
            );
        } else {
            warn!("Failed to fetch {scope} status: {err}");
        }
        ApplyOutcome::Failed
    }

    fn check_delivery(&self, scope: ScopeKind, generation: Generation) -> Option<ApplyOutcome> {
        let current = match scope {
            ScopeKind::Chain => &self.chain_scope,
            ScopeKind::Wallet => &self.wallet_scope,
        };
        if !current.is_current(generation) {
            debug!(
                "Discarding {scope} delivery from generation {generation}, current is {}",
                current.current()
            );
            return Some(ApplyOutcome::StaleGeneration);
        }
        if scope == ScopeKind::Wallet && self.active_wallet.is_none() {
            return Some(ApplyOutcome::NoActiveWallet);
        }
        None
    }
}
