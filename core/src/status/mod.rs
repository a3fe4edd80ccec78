pub mod chain;
pub mod topic;
pub mod wallet;

pub use chain::ChainSyncState;
pub use topic::StatusTopic;
pub use wallet::WalletSyncState;
