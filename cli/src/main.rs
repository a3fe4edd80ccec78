pub mod cli;
use clap::Parser;
use cli::*;
use dg_sync_cli::commands::{load_config, print_chain_status, print_wallet_status, watch};
use dg_sync_clients::BackendClient;
use simple_logger::SimpleLogger;
use std::io::Error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref());
    SimpleLogger::new()
        .with_level(config.log_level().to_level_filter())
        .env()
        .init()
        .unwrap_or_default();
    if let Some(host) = cli.host {
        config.backend.hostname = host;
    }
    if let Some(rpc_port) = cli.rpc_port {
        config.backend.rpc_port = rpc_port;
    }
    if let Some(ws_port) = cli.ws_port {
        config.backend.ws_port = ws_port;
    }
    if cli.ssl_path.is_some() {
        config.backend.ssl_path = cli.ssl_path;
    }
    let backend = BackendClient::new(&config.backend);
    match cli.action {
        RootCommands::ChainStatus => print_chain_status(&backend).await,
        RootCommands::WalletStatus { wallet_id } => print_wallet_status(&backend, &wallet_id).await,
        RootCommands::Watch { wallet_id, json } => {
            let wallet_id = wallet_id.or(config.last_wallet_id.clone());
            watch(Arc::new(backend), wallet_id, json).await
        }
    }
}
