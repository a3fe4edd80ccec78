pub mod aggregator;
pub mod lifecycle;
pub mod metrics;
pub mod reconciler;
pub mod scope;
pub mod source;

pub use aggregator::{AggregatorHandle, Command, StatusSnapshot, SyncStatusAggregator};
pub use lifecycle::{Delivery, DeliveryKind, LifecycleState, SubscriptionLifecycle, POLL_INTERVAL};
pub use metrics::DerivedView;
pub use reconciler::{ApplyOutcome, Reconciler, StatusUpdate};
pub use scope::{Generation, Scope, ScopeKind};
pub use source::{ChainStatusSource, StatusBackend, StatusSource, WalletStatusSource};
