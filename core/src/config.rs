use log::Level;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::TryFrom;
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_PATH_ENV: &str = "DG_SYNC_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "sync_config.yaml";

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub log_level: String,
    pub backend: BackendConfig,
    pub last_wallet_id: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
pub struct BackendConfig {
    pub hostname: String,
    pub rpc_port: u16,
    pub ws_port: u16,
    pub use_tls: bool,
    pub ssl_path: Option<String>,
    pub request_timeout_secs: u64,
    pub additional_headers: Option<HashMap<String, String>>,
}

impl Config {
    pub fn save_as_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        fs::write(
            path.as_ref(),
            serde_yaml::to_string(&self)
                .map_err(|e| Error::new(ErrorKind::Other, format!("{:?}", e)))?,
        )
    }

    pub fn log_level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::Info)
    }
}

impl TryFrom<&Path> for Config {
    type Error = Error;
    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        serde_yaml::from_str::<Config>(&fs::read_to_string(value)?)
            .map_err(|e| Error::new(ErrorKind::InvalidData, format!("{:?}", e)))
    }
}
impl TryFrom<&PathBuf> for Config {
    type Error = Error;
    fn try_from(value: &PathBuf) -> Result<Self, Self::Error> {
        Self::try_from(value.as_path())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            backend: BackendConfig::default(),
            last_wallet_id: None,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            hostname: "localhost".to_string(),
            rpc_port: 9256,
            ws_port: 9257,
            use_tls: true,
            ssl_path: None,
            request_timeout_secs: 60,
            additional_headers: None,
        }
    }
}
