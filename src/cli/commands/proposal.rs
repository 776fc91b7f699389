//! Proposal commands: browse, create, vote and lifecycle changes.

use crate::cli::utils::{
    confirm, create_table, create_table_with_headers, create_translated_table, ensure_initialized,
    format_time_left, print_error, print_info, print_success, print_warning, save_session, spinner,
    styled_status, value_or_prompt,
};
use crate::cli::Cli;
use crate::session::DaoSession;
use crate::types::{ProposalDraft, SortKey, SortOrder, StatusFilter};
use crate::utils::{
    format_address, format_count, format_percentage, format_sui, format_timestamp, now_millis,
};
use clap::{Args, Subcommand};

/// Proposal command container
#[derive(Args, Clone)]
pub struct ProposalCommand {
    #[command(subcommand)]
    pub command: ProposalCommands,
}

/// Available proposal operations
#[derive(Subcommand, Clone)]
pub enum ProposalCommands {
    /// List proposals of the current DAO
    List {
        /// Status filter (all, active, executed, rejected, draft)
        #[arg(short, long)]
        status: Option<StatusFilter>,
        /// Sort key (created_at, votes_for, amount_requested)
        #[arg(long)]
        sort: Option<SortKey>,
        /// Sort order (asc, desc)
        #[arg(long)]
        order: Option<SortOrder>,
    },

    /// Show one proposal with its votes
    Show {
        /// Proposal object id
        id: String,
    },

    /// Create a proposal in the current DAO
    Create {
        /// Proposal title
        #[arg(short, long)]
        title: Option<String>,
        /// Proposal description
        #[arg(short, long)]
        description: Option<String>,
        /// Requested amount in SUI
        #[arg(short, long)]
        amount: Option<String>,
    },

    /// Vote on an active proposal
    Vote {
        /// Proposal object id
        id: String,
        /// Vote against instead of in favour
        #[arg(long)]
        against: bool,
        /// Governance token to vote with (default: your first token)
        #[arg(long)]
        token: Option<String>,
    },

    /// Open a draft for voting
    Activate {
        /// Proposal object id
        id: String,
    },

    /// Execute an active proposal
    Execute {
        /// Proposal object id
        id: String,
    },

    /// Reject an active proposal
    Reject {
        /// Proposal object id
        id: String,
    },
}

/// Execute proposal commands
pub async fn execute(cmd: ProposalCommand, cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    ensure_initialized(&mut session).await?;

    let result = match cmd.command {
        ProposalCommands::List {
            status,
            sort,
            order,
        } => list(&mut session, status, sort, order),
        ProposalCommands::Show { id } => show(&mut session, &id).await,
        ProposalCommands::Create {
            title,
            description,
            amount,
        } => create(&mut session, title, description, amount, cli).await,
        ProposalCommands::Vote { id, against, token } => {
            vote(&mut session, &id, !against, token, cli).await
        }
        ProposalCommands::Activate { id } => activate(&mut session, &id),
        ProposalCommands::Execute { id } => execute_proposal(&mut session, &id, cli).await,
        ProposalCommands::Reject { id } => reject(&mut session, &id, cli),
    };

    save_session(&session);
    result
}

fn list(
    session: &mut DaoSession,
    status: Option<StatusFilter>,
    sort: Option<SortKey>,
    order: Option<SortOrder>,
) -> anyhow::Result<()> {
    let store = session.proposals_mut();
    if let Some(status) = status {
        store.set_status_filter(status);
    }
    if let Some(sort) = sort {
        store.set_sort_by(sort);
    }
    if let Some(order) = order {
        store.set_sort_order(order);
    }

    let proposals = session.proposals().filtered_proposals();
    if proposals.is_empty() {
        print_info(&session.t("empty", Some("proposals")));
        return Ok(());
    }

    let language = session.language().language();
    let headers: Vec<String> = std::iter::once("ID".to_string())
        .chain(
            ["title", "amount", "votesFor", "votesAgainst", "status"]
                .iter()
                .map(|k| session.t(k, Some("proposals"))),
        )
        .collect();
    let refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    let mut table = create_table_with_headers(&refs);
    for p in &proposals {
        table.add_row(vec![
            format_address(&p.id),
            p.title.clone(),
            format!("{} SUI", format_sui(&p.amount_requested)),
            format_count(p.votes_for),
            format_count(p.votes_against),
            styled_status(p.status, language),
        ]);
    }
    println!("{table}");

    let store = session.proposals();
    print_info(&format!(
        "{} of {} proposals (status: {}, sort: {} {})",
        proposals.len(),
        store.proposals().len(),
        store.status_filter(),
        store.sort_by(),
        store.sort_order()
    ));
    Ok(())
}

async fn show(session: &mut DaoSession, id: &str) -> anyhow::Result<()> {
    if session.proposals().proposal_by_id(id).is_none() {
        print_error(&format!("Proposal {} not found", id));
        return Err(anyhow::anyhow!("Proposal not found: {}", id));
    }

    let sp = spinner("Loading votes...");
    let refreshed = session.refresh_votes(id).await;
    sp.finish_and_clear();
    if let Err(e) = refreshed {
        print_warning(&format!("Could not load votes: {}", e));
    }

    let Some(p) = session.proposals().proposal_by_id(id) else {
        return Err(anyhow::anyhow!("Proposal not found: {}", id));
    };
    let language = session.language().language();
    let t = |key: &str| session.t(key, Some("proposals"));

    let mut table = create_table();
    table.add_row(vec!["ID".to_string(), p.id.clone()]);
    table.add_row(vec![t("title"), p.title.clone()]);
    table.add_row(vec![t("description"), p.description.clone()]);
    table.add_row(vec![
        t("amount"),
        format!("{} SUI", format_sui(&p.amount_requested)),
    ]);
    table.add_row(vec![t("proposer"), format_address(&p.proposer)]);
    table.add_row(vec![
        t("deadline"),
        format!(
            "{} ({})",
            format_timestamp(p.deadline),
            format_time_left(p.deadline, now_millis())
        ),
    ]);
    table.add_row(vec![t("status"), styled_status(p.status, language)]);
    table.add_row(vec![t("votesFor"), format_count(p.votes_for)]);
    table.add_row(vec![t("votesAgainst"), format_count(p.votes_against)]);
    table.add_row(vec![t("support"), format_percentage(p.support_percentage())]);
    println!("{table}");

    let votes = session.governance().votes_for_proposal(id);
    if !votes.is_empty() {
        let mut table = create_translated_table(
            session,
            "governance",
            &["owner", "votingPower", "votes"],
        );
        for v in votes {
            let side = if v.support { t("votesFor") } else { t("votesAgainst") };
            table.add_row(vec![
                format_address(&v.voter),
                format_count(v.voting_power),
                side,
            ]);
        }
        println!("{table}");
    }
    if session.governance().has_user_voted_on_proposal(id) {
        print_info(&t("alreadyVoted"));
    }
    Ok(())
}

async fn create(
    session: &mut DaoSession,
    title: Option<String>,
    description: Option<String>,
    amount: Option<String>,
    cli: &Cli,
) -> anyhow::Result<()> {
    let title = value_or_prompt(title, &session.t("title", Some("proposals")), cli.no_prompt)?;
    let description = value_or_prompt(
        description,
        &session.t("description", Some("proposals")),
        cli.no_prompt,
    )?;
    let amount = value_or_prompt(
        amount,
        &format!("{} (SUI)", session.t("amount", Some("proposals"))),
        cli.no_prompt,
    )?;
    let draft = ProposalDraft::new(title, description, amount);

    if let Err(errors) = draft.validate() {
        for (field, message) in &errors.fields {
            print_error(&format!("{}: {}", field, message));
        }
        return Err(anyhow::anyhow!("Invalid proposal"));
    }

    let sp = spinner("Submitting proposal...");
    let result = session.create_proposal(&draft).await;
    sp.finish_and_clear();
    let proposal = result.map_err(|e| anyhow::anyhow!("Failed to create proposal: {}", e))?;

    print_success(&format!(
        "{}: {} ({} SUI)",
        session.t("created", Some("proposals")),
        proposal.id,
        format_sui(&proposal.amount_requested)
    ));
    Ok(())
}

async fn vote(
    session: &mut DaoSession,
    id: &str,
    support: bool,
    token: Option<String>,
    cli: &Cli,
) -> anyhow::Result<()> {
    let token_id = match token {
        Some(token) => token,
        None => match session.governance().user_tokens().first() {
            Some(token) => token.id.clone(),
            None => {
                print_error(&session.t("notConnected", Some("wallet")));
                return Err(anyhow::anyhow!(
                    "No governance token to vote with; run `suidao wallet connect` first"
                ));
            }
        },
    };

    let side = if support { "voteFor" } else { "voteAgainst" };
    let prompt = format!("{} {}?", session.t(side, Some("proposals")), id);
    if !confirm(&prompt, cli.no_prompt) {
        print_info("Aborted");
        return Ok(());
    }

    let sp = spinner("Submitting vote...");
    let result = session.vote(id, support, &token_id).await;
    sp.finish_and_clear();
    let receipt = result.map_err(|e| anyhow::anyhow!("Vote failed: {}", e))?;

    print_success(&format!(
        "{}: {} ({} / {})",
        session.t("voteRecorded", Some("governance")),
        format_count(receipt.vote.voting_power),
        format_count(receipt.proposal.votes_for),
        format_count(receipt.proposal.votes_against)
    ));
    Ok(())
}

fn activate(session: &mut DaoSession, id: &str) -> anyhow::Result<()> {
    session
        .activate_proposal(id)
        .map_err(|e| anyhow::anyhow!("Failed to activate proposal: {}", e))?;
    print_success(&format!("Proposal {} is open for voting", id));
    Ok(())
}

async fn execute_proposal(session: &mut DaoSession, id: &str, cli: &Cli) -> anyhow::Result<()> {
    if !confirm(&format!("Execute proposal {}?", id), cli.no_prompt) {
        print_info("Aborted");
        return Ok(());
    }

    let sp = spinner("Executing proposal...");
    let result = session.execute_proposal(id).await;
    sp.finish_and_clear();
    let receipt = result.map_err(|e| anyhow::anyhow!("Failed to execute proposal: {}", e))?;

    print_success(&format!(
        "{} ({})",
        session.t("executed", Some("proposals")),
        receipt.digest
    ));
    Ok(())
}

fn reject(session: &mut DaoSession, id: &str, cli: &Cli) -> anyhow::Result<()> {
    if !confirm(&format!("Reject proposal {}?", id), cli.no_prompt) {
        print_info("Aborted");
        return Ok(());
    }
    session
        .reject_proposal(id)
        .map_err(|e| anyhow::anyhow!("Failed to reject proposal: {}", e))?;
    print_success(&format!("Proposal {} rejected", id));
    Ok(())
}
