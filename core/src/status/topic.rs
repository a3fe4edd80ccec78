use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Error, ErrorKind};
use std::str::FromStr;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub enum StatusTopic {
    #[serde(rename = "chain-status")]
    Chain,
    #[serde(rename = "wallet-sync-status")]
    WalletSync,
}

impl StatusTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTopic::Chain => "chain-status",
            StatusTopic::WalletSync => "wallet-sync-status",
        }
    }
}

impl fmt::Display for StatusTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusTopic {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chain-status" => Ok(StatusTopic::Chain),
            "wallet-sync-status" => Ok(StatusTopic::WalletSync),
            _ => Err(Error::new(
                ErrorKind::InvalidData,
                format!("Unknown status topic: {s}"),
            )),
        }
    }
}

#[test]
fn test_topic_names() {
    assert_eq!(StatusTopic::Chain.to_string(), "chain-status");
    assert_eq!(
        StatusTopic::from_str("wallet-sync-status").unwrap(),
        StatusTopic::WalletSync
    );
    assert!(StatusTopic::from_str("peer-status").is_err());
}
