use anyhow::Result;
use clap::{Parser, Subcommand};
use server::api::{run_api_server, run_proxy_server};
use server::config::{ApiConfig, ProxyConfig};

#[derive(Parser, Debug)]
#[command(
    name = "server",
    about = "Leaderboard services for Pablo el Devorador de Huevos"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cache scores locally and mirror them to a GitHub-hosted document
    Proxy {
        /// Address to listen on (overrides PABLO_BIND_ADDR)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Serve read/write leaderboard endpoints over a local document
    Api {
        /// Address to listen on (overrides PABLO_BIND_ADDR)
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if exists
    dotenv::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Proxy { addr } => {
            let mut config = ProxyConfig::from_env()?;
            if let Some(addr) = addr {
                config.bind_addr = addr;
            }
            run_proxy_server(config).await
        }
        Command::Api { addr } => {
            let mut config = ApiConfig::from_env();
            if let Some(addr) = addr {
                config.bind_addr = addr;
            }
            run_api_server(config).await
        }
    }
}
