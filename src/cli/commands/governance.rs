//! Governance commands: tokens, minting and vote history.

use crate::cli::utils::{
    confirm, create_translated_table, ensure_initialized, print_info, print_success,
    save_session, spinner,
};
use crate::cli::Cli;
use crate::utils::{format_address, format_count, format_timestamp};
use clap::{Args, Subcommand};

/// Governance command container
#[derive(Args, Clone)]
pub struct GovernanceCommand {
    #[command(subcommand)]
    pub command: GovernanceCommands,
}

/// Available governance operations
#[derive(Subcommand, Clone)]
pub enum GovernanceCommands {
    /// List governance tokens of the current DAO
    Tokens {
        /// Only tokens owned by the connected wallet
        #[arg(long)]
        mine: bool,
    },

    /// Mint a governance token for the connected wallet
    Mint {
        /// Voting power of the new token
        #[arg(short, long)]
        power: u64,
    },

    /// List votes cast on a proposal
    Votes {
        /// Proposal object id
        proposal: String,
    },
}

/// Execute governance commands
pub async fn execute(cmd: GovernanceCommand, cli: &Cli) -> anyhow::Result<()> {
    match cmd.command {
        GovernanceCommands::Tokens { mine } => tokens(mine, cli).await,
        GovernanceCommands::Mint { power } => mint(power, cli).await,
        GovernanceCommands::Votes { proposal } => votes(&proposal, cli).await,
    }
}

async fn tokens(mine: bool, cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    ensure_initialized(&mut session).await?;

    let governance = session.governance();
    let tokens = if mine {
        governance.user_tokens()
    } else {
        governance.tokens()
    };
    if tokens.is_empty() {
        print_info("No governance tokens");
        return Ok(());
    }

    let mut table =
        create_translated_table(&session, "governance", &["tokens", "owner", "votingPower"]);
    for token in tokens {
        table.add_row(vec![
            token.id.clone(),
            format_address(&token.owner),
            format_count(token.voting_power),
        ]);
    }
    println!("{table}");

    let total = if mine {
        governance.user_voting_power()
    } else {
        governance.total_voting_power()
    };
    print_info(&format!(
        "{}: {} ({} holders)",
        session.t("votingPower", Some("governance")),
        format_count(total),
        governance.holder_count()
    ));
    save_session(&session);
    Ok(())
}

async fn mint(power: u64, cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    ensure_initialized(&mut session).await?;

    if !confirm(
        &format!("Mint a token with voting power {}?", format_count(power)),
        cli.no_prompt,
    ) {
        print_info("Aborted");
        return Ok(());
    }

    let sp = spinner("Minting token...");
    let result = session.mint_token(power).await;
    sp.finish_and_clear();
    let token = result.map_err(|e| anyhow::anyhow!("Failed to mint token: {}", e))?;

    print_success(&format!(
        "Token {} minted for {}",
        token.id,
        format_address(&token.owner)
    ));
    save_session(&session);
    Ok(())
}

async fn votes(proposal_id: &str, cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    ensure_initialized(&mut session).await?;

    let sp = spinner("Loading votes...");
    let result = session.refresh_votes(proposal_id).await;
    sp.finish_and_clear();
    result.map_err(|e| anyhow::anyhow!("Failed to load votes: {}", e))?;

    let votes = session.governance().votes_for_proposal(proposal_id);
    if votes.is_empty() {
        print_info("No votes yet");
    } else {
        let mut table =
            create_translated_table(&session, "governance", &["owner", "votingPower", "votes"]);
        for vote in votes {
            let side = if vote.support { "votesFor" } else { "votesAgainst" };
            table.add_row(vec![
                format_address(&vote.voter),
                format_count(vote.voting_power),
                format!(
                    "{} ({})",
                    session.t(side, Some("proposals")),
                    format_timestamp(vote.timestamp)
                ),
            ]);
        }
        println!("{table}");
    }
    save_session(&session);
    Ok(())
}
