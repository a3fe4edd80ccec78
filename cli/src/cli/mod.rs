use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[arg(short, long, value_name = "Path to the config file")]
    pub config: Option<String>,
    #[arg(short, long, value_name = "Path to the backend ssl folder")]
    pub ssl_path: Option<String>,

    #[arg(long, value_name = "Backend Hostname")]
    pub host: Option<String>,
    #[arg(long, value_name = "Backend RPC Port")]
    pub rpc_port: Option<u16>,
    #[arg(long, value_name = "Backend Websocket Port")]
    pub ws_port: Option<u16>,

    #[command(subcommand)]
    pub action: RootCommands,
}

#[derive(Debug, Subcommand)]
pub enum RootCommands {
    #[command(about = "Fetches the chain sync status once", long_about = None)]
    ChainStatus,
    #[command(about = "Fetches the sync status of one wallet once", long_about = None)]
    WalletStatus {
        #[arg(short, long)]
        wallet_id: String,
    },
    #[command(about = "Watches chain and wallet sync status until Ctrl-C", long_about = None)]
    Watch {
        #[arg(short, long)]
        wallet_id: Option<String>,
        #[arg(short, long)]
        json: bool,
    },
}
