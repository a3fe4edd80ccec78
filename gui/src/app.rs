use crate::components::top_bar::StatusBar;
use crate::scenes::errors::ErrorsScene;
use crate::scenes::wallet::WalletScene;
use crate::scenes::Scene;
use crate::state::{SelectedTab, State};
use dg_sync_core::config::Config;
use dg_sync_status::AggregatorHandle;
use eframe::egui;
use eframe::egui::mutex::Mutex;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

static STATUS_BAR: OnceLock<Mutex<StatusBar>> = OnceLock::new();
static WALLET_SCENE: OnceLock<Mutex<WalletScene>> = OnceLock::new();
static ERRORS_SCENE: OnceLock<Mutex<ErrorsScene>> = OnceLock::new();

const REPAINT_INTERVAL: Duration = Duration::from_millis(500);

pub struct DgSyncGui {
    pub state: State,
    pub config: Config,
    pub config_path: PathBuf,
}
impl DgSyncGui {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: Config,
        config_path: PathBuf,
        status: Arc<AggregatorHandle>,
    ) -> Self {
        if let Some(wallet_id) = &config.last_wallet_id {
            info!("Reopening last wallet {wallet_id}");
            if let Err(e) = status.open_wallet(wallet_id) {
                warn!("{e}");
            }
        }
        Self {
            state: State {
                selected_tab: SelectedTab::Wallet,
                status,
            },
            config,
            config_path,
        }
    }

    /// Remembers the wallet so the next launch reopens it.
    pub fn remember_wallet(&mut self, wallet_id: Option<String>) {
        self.config.last_wallet_id = wallet_id;
        if let Err(e) = self.config.save_as_yaml(&self.config_path) {
            warn!("Failed to save config to {:?}: {e}", self.config_path);
        }
    }
}

impl eframe::App for DgSyncGui {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        STATUS_BAR
            .get_or_init(|| Mutex::new(StatusBar::new(self)))
            .lock()
            .update(self, ctx, frame);
        match self.state.selected_tab {
            SelectedTab::Wallet => WALLET_SCENE
                .get_or_init(|| Mutex::new(WalletScene::new(self)))
                .lock()
                .update(self, ctx, frame),
            SelectedTab::Errors => ERRORS_SCENE
                .get_or_init(|| Mutex::new(ErrorsScene::new()))
                .lock()
                .update(self, ctx, frame),
        }
        ctx.request_repaint_after(REPAINT_INTERVAL);
    }
}
