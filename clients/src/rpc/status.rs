use crate::api::responses::{ChainStatusResp, WalletSyncStatusResp};
use crate::api::status::StatusAPI;
use crate::rpc::{get_client, get_url, post};
use async_trait::async_trait;
use dg_sync_core::config::BackendConfig;
use dg_sync_core::status::{ChainSyncState, WalletSyncState};
use log::warn;
use reqwest::Client;
use serde_json::{json, Map};
use std::collections::HashMap;
use std::io::Error;
use std::time::Duration;

pub struct StatusClient {
    client: Client,
    pub host: String,
    pub port: u16,
    pub use_tls: bool,
    pub ssl_path: Option<String>,
    pub additional_headers: Option<HashMap<String, String>>,
}

impl StatusClient {
    pub fn new(
        host: &str,
        port: u16,
        use_tls: bool,
        timeout: Duration,
        ssl_path: Option<String>,
        additional_headers: &Option<HashMap<String, String>>,
    ) -> Self {
        let client = match get_client(ssl_path.as_deref(), timeout) {
            Ok(client) => client,
            Err(e) => {
                warn!("Failed to build RPC client from ssl config, using defaults: {e}");
                Client::default()
            }
        };
        StatusClient {
            client,
            host: host.to_string(),
            port,
            use_tls,
            ssl_path,
            additional_headers: additional_headers.clone(),
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(
            &config.hostname,
            config.rpc_port,
            config.use_tls,
            Duration::from_secs(config.request_timeout_secs),
            config.ssl_path.clone(),
            &config.additional_headers,
        )
    }
}

#[async_trait]
impl StatusAPI for StatusClient {
    async fn get_chain_status(&self) -> Result<ChainSyncState, Error> {
        Ok(post::<ChainStatusResp>(
            &self.client,
            &get_url(self.host.as_str(), self.port, self.use_tls, "get_chain_status"),
            &Map::new(),
            &self.additional_headers,
        )
        .await?
        .chain_status)
    }
    async fn get_wallet_sync_status(
        &self,
        wallet_id: &str,
    ) -> Result<Option<WalletSyncState>, Error> {
        let mut request_body = Map::new();
        request_body.insert("wallet_id".to_string(), json!(wallet_id));
        Ok(post::<WalletSyncStatusResp>(
            &self.client,
            &get_url(
                self.host.as_str(),
                self.port,
                self.use_tls,
                "get_wallet_sync_status",
            ),
            &request_body,
            &self.additional_headers,
        )
        .await?
        .wallet_sync_status)
    }
}
