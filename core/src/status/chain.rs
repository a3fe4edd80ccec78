use serde::{Deserialize, Serialize};

/// Node level sync status as reported by the backend.
///
/// The default value is the state assumed at process start, before the backend has
/// answered anything: zero heights, no peers, disconnected.
#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Debug, Default)]
pub struct ChainSyncState {
    pub local_height: u64,
    pub network_height: u64,
    pub connected: bool,
    pub syncing: bool,
    pub peer_count: u32,
}

impl ChainSyncState {
    pub fn is_synced(&self) -> bool {
        self.connected && !self.syncing && self.local_height >= self.network_height
    }
}
