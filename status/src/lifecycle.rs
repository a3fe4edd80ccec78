use crate::reconciler::StatusUpdate;
use crate::scope::{Generation, Scope, ScopeKind};
use crate::source::StatusSource;
use log::{debug, info, trace};
use std::io::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum DeliveryKind {
    Fetched(Option<StatusUpdate>),
    Pushed(StatusUpdate),
    FetchFailed(Error),
    SubscribeFailed(Error),
    PushEnded,
}

/// Result of one in-flight operation, tagged with the generation it was issued under.
#[derive(Debug)]
pub struct Delivery {
    pub scope: ScopeKind,
    pub generation: Generation,
    pub kind: DeliveryKind,
}

pub type DeliverySink = mpsc::UnboundedSender<Delivery>;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub enum LifecycleState {
    Inactive,
    Starting,
    Active,
    Stopping,
}

/// Owns the polling timer and the push subscription of one scope.
///
/// At most one timer/subscription pair is alive per lifecycle. `stop` must be called on
/// every exit path: wallet switch, wallet close and teardown.
pub struct SubscriptionLifecycle {
    scope: Arc<Scope>,
    sink: DeliverySink,
    state: LifecycleState,
    timer: Option<JoinHandle<()>>,
    release: Option<oneshot::Sender<()>>,
}
impl SubscriptionLifecycle {
    pub fn new(scope: Arc<Scope>, sink: DeliverySink) -> Self {
        SubscriptionLifecycle {
            scope,
            sink,
            state: LifecycleState::Inactive,
            timer: None,
            release: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }
    pub fn generation(&self) -> Generation {
        self.scope.current()
    }
    pub fn is_running(&self) -> bool {
        matches!(
            self.state,
            LifecycleState::Starting | LifecycleState::Active
        )
    }

    /// Issues the initial fetch, opens the push subscription and arms the poll timer,
    /// all under a fresh generation. A running lifecycle is stopped first.
    pub fn start<S: StatusSource>(&mut self, source: Arc<S>) -> Generation {
        if self.state != LifecycleState::Inactive {
            self.stop();
        }
        self.state = LifecycleState::Starting;
        let kind = self.scope.kind();
        let generation = self.scope.advance();
        info!(
            "Starting {kind} scope for {} (generation {generation})",
            source.topic()
        );
        spawn_fetch(kind, generation, source.clone(), self.sink.clone());
        let (release_tx, release_rx) = oneshot::channel();
        tokio::spawn(forward_push(
            kind,
            generation,
            source.clone(),
            self.sink.clone(),
            release_rx,
        ));
        self.release = Some(release_tx);
        self.timer = Some(tokio::spawn(poll(
            kind,
            generation,
            source,
            self.sink.clone(),
        )));
        generation
    }

    /// Marks the scope active once the first delivery of the current generation arrives.
    pub fn acknowledge(&mut self, generation: Generation) {
        if self.state == LifecycleState::Starting && self.scope.is_current(generation) {
            debug!("{} scope active", self.scope.kind());
            self.state = LifecycleState::Active;
        }
    }

    /// Cancels the timer and releases the subscription. Anything still in flight resolves
    /// under an outdated generation and is discarded by the reconciler.
    pub fn stop(&mut self) {
        if self.state == LifecycleState::Inactive {
            return;
        }
        self.state = LifecycleState::Stopping;
        let generation = self.scope.advance();
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        if let Some(release) = self.release.take() {
            let _ = release.send(());
        }
        self.state = LifecycleState::Inactive;
        info!(
            "Stopped {} scope (generation now {generation})",
            self.scope.kind()
        );
    }
}
impl Drop for SubscriptionLifecycle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_fetch<S: StatusSource>(
    scope: ScopeKind,
    generation: Generation,
    source: Arc<S>,
    sink: DeliverySink,
) {
    tokio::spawn(async move {
        let kind = match source.fetch().await {
            Ok(entity) => DeliveryKind::Fetched(entity.map(Into::into)),
            Err(e) => DeliveryKind::FetchFailed(e),
        };
        let _ = sink.send(Delivery {
            scope,
            generation,
            kind,
        });
    });
}

async fn poll<S: StatusSource>(
    scope: ScopeKind,
    generation: Generation,
    source: Arc<S>,
    sink: DeliverySink,
) {
    let mut interval = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if sink.is_closed() {
            return;
        }
        trace!("Polling {} (generation {generation})", source.topic());
        spawn_fetch(scope, generation, source.clone(), sink.clone());
    }
}

async fn forward_push<S: StatusSource>(
    scope: ScopeKind,
    generation: Generation,
    source: Arc<S>,
    sink: DeliverySink,
    mut release: oneshot::Receiver<()>,
) {
    let mut subscription = select! {
        _ = &mut release => return,
        opened = source.subscribe() => match opened {
            Ok(subscription) => subscription,
            Err(e) => {
                let _ = sink.send(Delivery {
                    scope,
                    generation,
                    kind: DeliveryKind::SubscribeFailed(e),
                });
                return;
            }
        }
    };
    loop {
        select! {
            biased;
            _ = &mut release => {
                subscription.unsubscribe();
                return;
            }
            event = subscription.recv() => match event {
                Some(entity) => {
                    let delivery = Delivery {
                        scope,
                        generation,
                        kind: DeliveryKind::Pushed(entity.into()),
                    };
                    if sink.send(delivery).is_err() {
                        subscription.unsubscribe();
                        return;
                    }
                }
                None => {
                    let _ = sink.send(Delivery {
                        scope,
                        generation,
                        kind: DeliveryKind::PushEnded,
                    });
                    return;
                }
            }
        }
    }
}
