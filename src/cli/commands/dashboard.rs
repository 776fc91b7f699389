//! Dashboard overview: treasury, holders, voting power and open proposals.

use crate::cli::utils::{
    create_table, create_translated_table, ensure_initialized, format_time_left, print_info,
    save_session, styled_status,
};
use crate::cli::Cli;
use crate::types::ProposalStatus;
use crate::utils::{format_address, format_count, format_percentage, format_sui, now_millis};
use console::style;

/// Execute the dashboard command
pub async fn execute(cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    ensure_initialized(&mut session).await?;

    let stats = session.stats();
    let title = session.t("title", Some("dashboard"));
    match &stats.dao_name {
        Some(name) => println!("{} - {}", style(title).bold(), name),
        None => println!("{}", style(title).bold()),
    }
    println!();

    let mut summary = create_table();
    summary.add_row(vec![
        session.t("treasury", Some("dashboard")),
        format!("{} SUI", stats.treasury),
    ]);
    summary.add_row(vec![
        session.t("activeProposals", Some("dashboard")),
        stats.active_proposals.to_string(),
    ]);
    summary.add_row(vec![
        session.t("holders", Some("dashboard")),
        stats.token_holders.to_string(),
    ]);
    summary.add_row(vec![
        session.t("votingPower", Some("dashboard")),
        format_count(stats.user_voting_power),
    ]);
    if let Some(wallet) = session.wallet().wallet().filter(|w| w.connected) {
        summary.add_row(vec![
            session.t("myWallet", Some("dashboard")),
            format!(
                "{} ({} SUI)",
                format_address(&wallet.address),
                format_sui(&wallet.balance)
            ),
        ]);
    }
    println!("{summary}");

    let active = session.proposals().proposals_by_status(ProposalStatus::Active);
    if active.is_empty() {
        print_info(&session.t("empty", Some("proposals")));
    } else {
        println!();
        println!("{}", style(session.t("activeProposals", Some("navigation"))).bold());
        let language = session.language().language();
        let now = now_millis();
        let mut table = create_translated_table(
            &session,
            "proposals",
            &["title", "amount", "support", "deadline", "status"],
        );
        for p in active {
            table.add_row(vec![
                p.title.clone(),
                format!("{} SUI", format_sui(&p.amount_requested)),
                format_percentage(p.support_percentage()),
                format_time_left(p.deadline, now),
                styled_status(p.status, language),
            ]);
        }
        println!("{table}");
    }

    save_session(&session);
    Ok(())
}
