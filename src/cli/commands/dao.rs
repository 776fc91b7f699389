//! DAO commands: list, show, select, refresh and create.

use crate::cli::utils::{
    confirm, create_table, create_table_with_headers, ensure_initialized, print_info,
    print_success, save_session, spinner,
};
use crate::cli::Cli;
use crate::utils::{format_address, format_count, format_datetime, format_sui};
use clap::{Args, Subcommand};
use console::style;

/// DAO command container
#[derive(Args, Clone)]
pub struct DaoCommand {
    #[command(subcommand)]
    pub command: DaoCommands,
}

/// Available DAO operations
#[derive(Subcommand, Clone)]
pub enum DaoCommands {
    /// Show the current DAO
    Show,

    /// List known DAOs
    List,

    /// Make another DAO current and load its proposals and tokens
    Select {
        /// DAO object id
        id: String,
    },

    /// Reload DAOs, proposals and tokens from the ledger
    Refresh,

    /// Create a new DAO
    Create {
        /// DAO name
        name: String,
        /// Voting power needed to take part
        #[arg(long, default_value = "1000")]
        min_voting_power: u64,
    },
}

/// Execute DAO commands
pub async fn execute(cmd: DaoCommand, cli: &Cli) -> anyhow::Result<()> {
    match cmd.command {
        DaoCommands::Show => show(cli).await,
        DaoCommands::List => list(cli).await,
        DaoCommands::Select { id } => select(&id, cli).await,
        DaoCommands::Refresh => refresh(cli).await,
        DaoCommands::Create {
            name,
            min_voting_power,
        } => create(&name, min_voting_power, cli).await,
    }
}

async fn show(cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    ensure_initialized(&mut session).await?;

    let Some(dao) = session.daos().current_dao() else {
        print_info("No DAO selected");
        return Ok(());
    };

    let mut table = create_table();
    table.add_row(vec!["ID".to_string(), dao.id.clone()]);
    table.add_row(vec!["Name".to_string(), dao.name.clone()]);
    table.add_row(vec![
        session.t("treasury", Some("navigation")),
        format!("{} SUI", format_sui(&dao.treasury)),
    ]);
    table.add_row(vec![
        session.t("proposals", Some("navigation")),
        dao.proposal_count.to_string(),
    ]);
    table.add_row(vec![
        "Min voting power".to_string(),
        format_count(dao.min_voting_power),
    ]);
    table.add_row(vec!["Active".to_string(), dao.active.to_string()]);
    if let Some(creator) = &dao.creator {
        table.add_row(vec!["Creator".to_string(), format_address(creator)]);
    }
    if let Some(created_at) = &dao.created_at {
        table.add_row(vec!["Created".to_string(), format_datetime(created_at)]);
    }
    println!("{table}");

    save_session(&session);
    Ok(())
}

async fn list(cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    ensure_initialized(&mut session).await?;

    let current = session.daos().current_dao().map(|d| d.id.clone());
    let mut table = create_table_with_headers(&["", "ID", "Name", "Treasury", "Proposals"]);
    for dao in session.daos().daos() {
        let marker = if current.as_deref() == Some(dao.id.as_str()) {
            style("*").green().bold().to_string()
        } else {
            String::new()
        };
        table.add_row(vec![
            marker,
            dao.id.clone(),
            dao.name.clone(),
            format!("{} SUI", format_sui(&dao.treasury)),
            dao.proposal_count.to_string(),
        ]);
    }
    println!("{table}");

    save_session(&session);
    Ok(())
}

async fn select(id: &str, cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    ensure_initialized(&mut session).await?;

    let sp = spinner(&format!("Loading {}...", id));
    let result = session.select_dao(id).await;
    sp.finish_and_clear();
    result.map_err(|e| anyhow::anyhow!("Failed to select DAO: {}", e))?;

    print_success(&format!("Now using DAO {}", id));
    save_session(&session);
    Ok(())
}

async fn refresh(cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;

    let sp = spinner(&format!("Refreshing from {} ledger...", session.ledger().name()));
    let result = session.initialize().await;
    sp.finish_and_clear();
    result.map_err(|e| anyhow::anyhow!("Failed to refresh DAO data: {}", e))?;

    print_success(&format!(
        "Loaded {} DAOs and {} proposals",
        session.daos().daos().len(),
        session.proposals().proposals().len()
    ));
    save_session(&session);
    Ok(())
}

async fn create(name: &str, min_voting_power: u64, cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;

    if !confirm(&format!("Create DAO '{}'?", name), cli.no_prompt) {
        print_info("Aborted");
        return Ok(());
    }

    let sp = spinner("Creating DAO...");
    let result = session.create_dao(name, min_voting_power).await;
    sp.finish_and_clear();
    let dao = result.map_err(|e| anyhow::anyhow!("Failed to create DAO: {}", e))?;

    print_success(&format!("DAO '{}' created: {}", dao.name, dao.id));
    save_session(&session);
    Ok(())
}
