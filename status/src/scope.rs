use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub type Generation = u64;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash, Serialize)]
pub enum ScopeKind {
    Chain,
    Wallet,
}
impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Chain => f.write_str("chain"),
            ScopeKind::Wallet => f.write_str("wallet"),
        }
    }
}

/// Lifetime boundary of one subscription/timer pair.
///
/// The generation is bumped by the owning lifecycle on every start and stop. Work issued
/// under an older generation is stale and must not be applied.
#[derive(Debug)]
pub struct Scope {
    kind: ScopeKind,
    generation: AtomicU64,
}
impl Scope {
    pub fn new(kind: ScopeKind) -> Arc<Self> {
        Arc::new(Scope {
            kind,
            generation: AtomicU64::new(0),
        })
    }
    pub fn chain() -> Arc<Self> {
        Self::new(ScopeKind::Chain)
    }
    pub fn wallet() -> Arc<Self> {
        Self::new(ScopeKind::Wallet)
    }
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }
    pub fn current(&self) -> Generation {
        self.generation.load(Ordering::SeqCst)
    }
    pub fn is_current(&self, generation: Generation) -> bool {
        self.current() == generation
    }
    pub(crate) fn advance(&self) -> Generation {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }
}

#[test]
fn test_advance_invalidates_previous() {
    let scope = Scope::wallet();
    assert_eq!(scope.current(), 0);
    let first = scope.advance();
    assert!(scope.is_current(first));
    let second = scope.advance();
    assert!(second > first);
    assert!(!scope.is_current(first));
    assert_eq!(scope.kind(), ScopeKind::Wallet);
}
