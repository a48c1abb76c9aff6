mod api;
mod cli;
mod config;
mod extension;
mod handlers;
mod linked_records;
mod server;
mod session;

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use cli::Cli;
use config::{Config, Settings};

pub use config::global_config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.command.needs_database() {
        let settings = Settings::load()?;
        let config = Config::open(settings).await?;
        config::init_global_config(config)?;
        debug!("Configuration loaded");
    }

    if let Err(err) = cli::run(cli.command).await {
        let kind = handlers::classify(&err);
        eprintln!("Error ({}): {:#}", kind.as_str(), err);
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    // sqlx logs every statement at info
    builder.filter_module("sqlx", LevelFilter::Warn);
    builder.init();
}
