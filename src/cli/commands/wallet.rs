//! Wallet commands: connect, disconnect, balance and network.

use crate::cli::utils::{
    create_table, ensure_initialized, print_info, print_success, print_warning, save_session,
    spinner,
};
use crate::cli::Cli;
use crate::types::Network;
use crate::utils::format_sui;
use clap::{Args, Subcommand};

/// Wallet command container
#[derive(Args, Clone)]
pub struct WalletCommand {
    #[command(subcommand)]
    pub command: WalletCommands,
}

/// Available wallet operations
#[derive(Subcommand, Clone)]
pub enum WalletCommands {
    /// Connect the wallet on the preferred network
    Connect,

    /// Disconnect the wallet
    Disconnect,

    /// Show the connected wallet and refresh its balance
    Balance,

    /// Show or switch the network
    Network {
        /// Network to switch to (mainnet, testnet, devnet)
        network: Option<Network>,
    },
}

/// Execute wallet commands
pub async fn execute(cmd: WalletCommand, cli: &Cli) -> anyhow::Result<()> {
    match cmd.command {
        WalletCommands::Connect => connect(cli).await,
        WalletCommands::Disconnect => disconnect(cli).await,
        WalletCommands::Balance => balance(cli).await,
        WalletCommands::Network { network } => switch_network(network, cli).await,
    }
}

async fn connect(cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    ensure_initialized(&mut session).await?;

    if let Some(address) = session.wallet().address() {
        print_info(&format!("Already connected as {}", address));
        return Ok(());
    }

    let sp = spinner(&session.t("connecting", Some("dashboard")));
    let result = session.connect_wallet().await;
    sp.finish_and_clear();
    let wallet = result.map_err(|e| anyhow::anyhow!("Failed to connect wallet: {}", e))?;

    print_success(&format!(
        "{}: {} ({})",
        session.t("connected", Some("wallet")),
        wallet.address,
        wallet.network
    ));
    print_info(&format!(
        "{}: {}",
        session.t("votingPower", Some("governance")),
        session.governance().user_voting_power()
    ));
    save_session(&session);
    Ok(())
}

async fn disconnect(cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    session.disconnect_wallet();
    print_success(&session.t("disconnected", Some("wallet")));
    save_session(&session);
    Ok(())
}

async fn balance(cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    if !session.wallet().is_connected() {
        print_warning(&session.t("notConnected", Some("wallet")));
        return Ok(());
    }

    let sp = spinner("Fetching balance...");
    let result = session.refresh_balance().await;
    sp.finish_and_clear();
    result.map_err(|e| anyhow::anyhow!("Failed to fetch balance: {}", e))?;

    if let Some(wallet) = session.wallet().wallet() {
        let mut table = create_table();
        table.add_row(vec![session.t("address", Some("wallet")), wallet.address.clone()]);
        table.add_row(vec![
            session.t("balance", Some("dashboard")),
            format!("{} SUI", format_sui(&wallet.balance)),
        ]);
        table.add_row(vec![
            session.t("network", Some("wallet")),
            wallet.network.to_string(),
        ]);
        println!("{table}");
    }
    save_session(&session);
    Ok(())
}

async fn switch_network(network: Option<Network>, cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;

    let Some(network) = network else {
        let current = session
            .wallet()
            .wallet()
            .map(|w| w.network)
            .unwrap_or_else(|| session.wallet().preferred_network());
        println!("{}: {}", session.t("network", Some("wallet")), current);
        return Ok(());
    };

    if session.wallet().is_connected() {
        session
            .wallet_mut()
            .switch_network(network)
            .map_err(|e| anyhow::anyhow!("Failed to switch network: {}", e))?;
    } else {
        session.wallet_mut().set_preferred_network(network);
    }
    print_success(&format!("Using {}", network));
    save_session(&session);
    Ok(())
}
