//! Sui DAO CLI binary entrypoint.
//!
//! Dashboard, DAO, proposal, wallet, governance and language commands over a
//! persisted client session.

use clap::Parser;
use sui_dao_rs::cli::{self, Cli};
use sui_dao_rs::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Store actions log at INFO; keep the terminal to warnings unless asked
    let logging = cli.config().logging;
    let quiet = !logging.debug && !logging.trace;
    init_logging(&logging.with_quiet(quiet));

    cli::run_with(cli).await
}
