//! # facturador
//!
//! Command-line front-end over the numbering and tax services.
//!
//! ```text
//! facturador --company 7 next-number facturas     → F001-000042
//! facturador series set boletas B002 150
//! facturador tax set-igv 18
//! facturador totals --line 3:4.33 --line 7:1.19
//! facturador --company 7 config init
//! ```

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::Subscriber;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use facturador_engine::{AppContext, FacturadorConfig};

use crate::cli::{Cli, Command, ConfigCommand};

/// Used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "warn,facturador=info,sqlx=warn";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let mut config = FacturadorConfig::load(cli.config.clone()).context("loading configuration")?;
    if let Some(company) = cli.company.clone() {
        config.company.active_id = Some(company);
    }

    if let Command::Config(ConfigCommand::Init { force }) = cli.command {
        return commands::init_config(&config, cli.config, force);
    }

    let ctx = AppContext::build(config)
        .await
        .context("starting facturador")?;

    let result = commands::handle(&ctx, cli.command).await;
    ctx.shutdown().await;
    result
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    subscriber(filter).init();
}

/// Logs go to stderr so command output on stdout stays clean.
fn subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_default_filter_levels() {
        let subscriber = subscriber(EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(target: "sqlx::query", Level::DEBUG));
            assert!(tracing::enabled!(target: "sqlx::query", Level::WARN));
            assert!(tracing::enabled!(target: "facturador_engine::allocator", Level::INFO));
            assert!(!tracing::enabled!(target: "facturador_engine::allocator", Level::TRACE));
            assert!(!tracing::enabled!(target: "hyper::proto", Level::INFO));
            assert!(tracing::enabled!(target: "hyper::proto", Level::WARN));
        });
    }
}
