use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use r4x_configuration::Config;
use r4x_redis::{ConnectionRegistry, RedisConnector};
use r4x_server::ServerError;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "R4X_CONFIG", default_value = "r4x.yaml")]
    config: PathBuf,

    /// Load and compile the configuration, then exit
    #[arg(short = 't', long)]
    test: bool,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let gateway = match Config::from_file(&args.config).and_then(|config| config.compile()) {
        Ok(gateway) => gateway,
        Err(err) => {
            error!(config = %args.config.display(), error = %err, "Invalid configuration");
            return Err(err.into());
        }
    };
    if args.test {
        info!(config = %args.config.display(), "Configuration is valid");
        return Ok(());
    }

    let registry = Arc::new(ConnectionRegistry::new(RedisConnector::new()));
    r4x_server::run(gateway, registry, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
