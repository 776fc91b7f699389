//! Command-line dashboard for the Sui DAO financing platform
//!
//! Every invocation restores the session from the storage directory, runs one
//! command against it and saves it again, so state carries over between runs
//! the same way the browser dashboard keeps it in local storage.
//!
//! # Commands
//!
//! - `dashboard` - Treasury, voting power and active proposals
//! - `dao` - List, select, refresh and create DAOs
//! - `proposal` - List, create, vote on and move proposals through their lifecycle
//! - `wallet` - Connect, disconnect, balance and network
//! - `governance` - Governance tokens and vote history
//! - `lang` - Show or change the display language

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::ledger::LedgerBackend;
use crate::session::DaoSession;
use crate::types::{Language, Network};

pub mod commands;
pub mod utils;

/// Sui DAO CLI
#[derive(Parser)]
#[command(name = "suidao")]
#[command(version)]
#[command(about = "Sui DAO financing dashboard", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Network to use (mainnet, testnet, devnet)
    #[arg(short, long, global = true)]
    pub network: Option<Network>,

    /// Custom fullnode JSON-RPC endpoint (overrides --network)
    #[arg(long, global = true)]
    pub rpc: Option<String>,

    /// Published DAO package id
    #[arg(long, global = true)]
    pub package: Option<String>,

    /// Ledger backend (mock, rpc)
    #[arg(long, global = true)]
    pub ledger: Option<LedgerBackend>,

    /// Directory holding the persisted session state
    #[arg(long, global = true)]
    pub storage_dir: Option<String>,

    /// Display language for this run (es, en)
    #[arg(long, global = true)]
    pub lang: Option<Language>,

    /// Don't prompt for confirmations (auto-approve)
    #[arg(long, global = true)]
    pub no_prompt: bool,

    /// Verbose logging to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Also write logs to a daily file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<String>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Dashboard overview of the current DAO
    #[command(alias = "d")]
    Dashboard,

    /// DAO operations (list, select, refresh, create)
    Dao(commands::dao::DaoCommand),

    /// Proposal operations (list, create, vote, execute)
    #[command(alias = "p")]
    Proposal(commands::proposal::ProposalCommand),

    /// Wallet operations (connect, balance, network)
    #[command(alias = "w")]
    Wallet(commands::wallet::WalletCommand),

    /// Governance tokens and votes
    #[command(alias = "g")]
    Governance(commands::governance::GovernanceCommand),

    /// Display language
    Lang(commands::lang::LangCommand),
}

impl Cli {
    /// Environment configuration with the global flags applied on top
    pub fn config(&self) -> Config {
        self.apply_flags(Config::from_env())
    }

    /// Apply every flag that was given; flags always win over `base`
    pub fn apply_flags(&self, mut config: Config) -> Config {
        if let Some(network) = self.network {
            config = config.with_network(network);
        }
        if let Some(rpc) = &self.rpc {
            config = config.with_rpc_url(rpc);
        }
        if let Some(package) = &self.package {
            config = config.with_package_id(package);
        }
        if let Some(ledger) = self.ledger {
            config = config.with_ledger(ledger);
        }
        if let Some(dir) = &self.storage_dir {
            config = config.with_storage_dir(dir);
        }
        if let Some(dir) = &self.log_dir {
            config.logging = config
                .logging
                .with_logging_dir(dir)
                .with_file_logging(true);
        }
        if self.debug {
            config = config.with_debug(true);
        }
        config
    }

    /// Restore the session this invocation works on
    pub fn open_session(&self) -> anyhow::Result<DaoSession> {
        let mut session = DaoSession::from_config(self.config())
            .map_err(|e| anyhow::anyhow!("Failed to open session: {}", e))?;
        if let Some(lang) = self.lang {
            session.language_mut().set_language(lang);
        }
        Ok(session)
    }
}

/// Run the CLI application
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with(cli).await
}

/// Run an already parsed command line
pub async fn run_with(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Dashboard => commands::dashboard::execute(&cli).await,
        Commands::Dao(cmd) => commands::dao::execute(cmd.clone(), &cli).await,
        Commands::Proposal(cmd) => commands::proposal::execute(cmd.clone(), &cli).await,
        Commands::Wallet(cmd) => commands::wallet::execute(cmd.clone(), &cli).await,
        Commands::Governance(cmd) => commands::governance::execute(cmd.clone(), &cli).await,
        Commands::Lang(cmd) => commands::lang::execute(cmd.clone(), &cli).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_parse() {
        let cli = Cli::try_parse_from([
            "suidao",
            "proposal",
            "list",
            "--network",
            "devnet",
            "--ledger",
            "mock",
            "--lang",
            "en",
        ])
        .unwrap();
        assert_eq!(cli.network, Some(Network::Devnet));
        assert_eq!(cli.ledger, Some(LedgerBackend::Mock));
        assert_eq!(cli.lang, Some(Language::En));
    }

    #[test]
    fn test_flags_win_over_environment() {
        let env = Config::new()
            .with_ledger(LedgerBackend::Rpc)
            .with_network(Network::Mainnet)
            .with_package_id("0xenvpkg");

        let cli = Cli::try_parse_from([
            "suidao",
            "dashboard",
            "--ledger",
            "mock",
            "--network",
            "testnet",
        ])
        .unwrap();
        let config = cli.apply_flags(env.clone());
        assert_eq!(config.ledger, LedgerBackend::Mock);
        assert_eq!(config.chain.network, Network::Testnet);
        assert_eq!(config.chain.rpc_url, Network::Testnet.fullnode_url());
        assert_eq!(config.chain.package_id, "0xenvpkg");

        // --rpc wins over the network's endpoint, absent flags keep the base
        let cli = Cli::try_parse_from([
            "suidao",
            "dashboard",
            "--network",
            "devnet",
            "--rpc",
            "http://127.0.0.1:9000",
            "--package",
            "0xflagpkg",
        ])
        .unwrap();
        let config = cli.apply_flags(env);
        assert_eq!(config.ledger, LedgerBackend::Rpc);
        assert_eq!(config.chain.network, Network::Devnet);
        assert_eq!(config.chain.rpc_url, "http://127.0.0.1:9000");
        assert_eq!(config.chain.package_id, "0xflagpkg");
    }

    #[test]
    fn test_log_dir_enables_file_logging() {
        let cli = Cli::try_parse_from([
            "suidao",
            "lang",
            "show",
            "--log-dir",
            "/tmp/suidao-logs",
            "--debug",
        ])
        .unwrap();
        let config = cli.apply_flags(Config::new());
        assert!(config.logging.record_log);
        assert_eq!(config.logging.logging_dir, "/tmp/suidao-logs");
        assert!(config.logging.debug);

        let cli = Cli::try_parse_from(["suidao", "lang", "show"]).unwrap();
        assert!(!cli.apply_flags(Config::new()).logging.record_log);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "suidao",
            "dashboard",
            "--rpc",
            "http://127.0.0.1:9000",
            "--storage-dir",
            "/tmp/suidao-test",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.chain.rpc_url, "http://127.0.0.1:9000");
        assert_eq!(config.storage_dir, "/tmp/suidao-test");
    }
}
