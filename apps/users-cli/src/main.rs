//! Users CLI
//!
//! Runs one user command or query against the configured store as the
//! principal given by `--as-id`, `--as-email` and `--as-role`, printing the
//! result as JSON on stdout. Logs go to stderr.

use clap::Parser;
use core_config::FromEnv;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{Guards, RequestContext, connect_repositories};
use eyre::{Result, WrapErr};
use tracing::info;

mod cli;
mod config;
mod run;

use cli::Cli;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    if let Err(e) = observability::init_metrics() {
        tracing::warn!(error = %e, "Metrics recorder not installed");
    }

    let cli = Cli::parse();

    info!(engine = %config.storage, "Connecting to user storage...");
    let app = connect_repositories(config.storage)
        .await
        .wrap_err("User storage connection failed")?
        .into_application(Guards::default());

    let ctx = RequestContext::for_user(cli.principal.principal())
        .with_timeout(config.request_timeout);

    let result = run::run(&app, &ctx, cli.command).await;

    if cli.metrics {
        eprintln!("{}", observability::render_metrics());
    }

    println!("{}", serde_json::to_string_pretty(&result?)?);

    Ok(())
}
