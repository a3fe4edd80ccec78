use crate::app::DgSyncGui;
use dg_sync_clients::BackendClient;
use dg_sync_core::config::{Config, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use dg_sync_status::AggregatorHandle;
use log::{error, warn};
use simple_logger::SimpleLogger;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

mod app;
mod components;
mod scenes;
mod state;

#[tokio::main]
async fn main() -> eframe::Result {
    let config_path =
        PathBuf::from(env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into()));
    let config = Config::try_from(&config_path).unwrap_or_default();
    SimpleLogger::new()
        .with_level(config.log_level().to_level_filter())
        .env()
        .init()
        .unwrap_or_default();
    if let Err(e) = config.save_as_yaml(&config_path) {
        warn!("Failed to save config to {:?}: {e}", config_path);
    }
    let backend = Arc::new(BackendClient::new(&config.backend));
    let status = Arc::new(AggregatorHandle::spawn(backend));
    let app_status = status.clone();
    let options = eframe::NativeOptions::default();
    let result = eframe::run_native(
        "Druid Garden Sync Status",
        options,
        Box::new(|cc| Ok(Box::new(DgSyncGui::new(cc, config, config_path, app_status)))),
    );
    match Arc::try_unwrap(status) {
        Ok(status) => {
            if let Err(e) = status.shutdown().await {
                error!("Error stopping sync status aggregator: {e}");
            }
        }
        Err(status) => {
            let _ = status.request_shutdown();
        }
    }
    result
}
