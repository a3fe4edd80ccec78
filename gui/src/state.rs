use dg_sync_status::AggregatorHandle;
use std::sync::Arc;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub enum SelectedTab {
    Wallet,
    Errors,
}

pub struct State {
    pub selected_tab: SelectedTab,
    pub status: Arc<AggregatorHandle>,
}
