mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use ytte::config::Config;
use ytte::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let mut config = {
        let _startup = observability::bootstrap_logging();
        Config::load()?
    };

    match cli.command {
        Commands::Server(args) => {
            observability::init_tracing(&config.telemetry);
            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }
            ytte::api::run(config).await?
        }
        Commands::Config => print!("{}", config.to_toml()?),
    }

    Ok(())
}
