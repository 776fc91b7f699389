//! CLI utility functions for terminal interaction and formatting.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use console::{style, Term};
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::core::constants::DAY_MS;
use crate::session::DaoSession;
use crate::types::{Language, ProposalStatus};
use crate::utils::{format_proposal_status, proposal_status_color, StatusColor};

/// Prompt for confirmation with default behavior based on `no_prompt` flag.
/// If `no_prompt` is true, returns true without prompting.
pub fn confirm(message: &str, no_prompt: bool) -> bool {
    if no_prompt {
        return true;
    }

    Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .unwrap_or(false)
}

/// Use `value` if given, otherwise ask for it.
/// With `no_prompt` a missing value is an error.
pub fn value_or_prompt(
    value: Option<String>,
    message: &str,
    no_prompt: bool,
) -> anyhow::Result<String> {
    match value {
        Some(v) => Ok(v),
        None if no_prompt => Err(anyhow::anyhow!("Missing value for '{}'", message)),
        None => Input::new()
            .with_prompt(message)
            .interact_text()
            .map_err(|e| anyhow::anyhow!("Failed to read '{}': {}", message, e)),
    }
}

/// Create a spinner progress bar with message.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print success message in green.
pub fn print_success(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("✓").green().bold(), message));
}

/// Print error message in red.
pub fn print_error(message: &str) {
    let term = Term::stderr();
    let _ = term.write_line(&format!("{} {}", style("✗").red().bold(), message));
}

/// Print info message in blue.
pub fn print_info(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("ℹ").blue().bold(), message));
}

/// Print warning message in yellow.
pub fn print_warning(message: &str) {
    let term = Term::stdout();
    let _ = term.write_line(&format!("{} {}", style("⚠").yellow().bold(), message));
}

/// Status label in `language`, colored like the dashboard badge.
pub fn styled_status(status: ProposalStatus, language: Language) -> String {
    let label = format_proposal_status(status, language);
    match proposal_status_color(status) {
        StatusColor::Blue => style(label).blue().to_string(),
        StatusColor::Green => style(label).green().to_string(),
        StatusColor::Red => style(label).red().to_string(),
        StatusColor::Gray => style(label).dim().to_string(),
    }
}

/// Time left until `deadline_ms`, or "ended".
pub fn format_time_left(deadline_ms: i64, now_ms: i64) -> String {
    let left = deadline_ms - now_ms;
    if left <= 0 {
        return "ended".to_string();
    }
    let hours = (left % DAY_MS) / 3_600_000;
    if left >= DAY_MS {
        format!("{}d {}h", left / DAY_MS, hours)
    } else {
        let mins = (left % 3_600_000) / 60_000;
        format!("{}h {}m", hours, mins)
    }
}

/// Create a styled table for CLI output.
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Create a table with custom headers.
pub fn create_table_with_headers(headers: &[&str]) -> Table {
    let mut table = create_table();
    table.set_header(headers.iter().map(|h| style(*h).bold().to_string()));
    table
}

/// Create a table whose headers are translation keys of `section`.
pub fn create_translated_table(session: &DaoSession, section: &str, keys: &[&str]) -> Table {
    let headers: Vec<String> = keys.iter().map(|k| session.t(k, Some(section))).collect();
    let refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    create_table_with_headers(&refs)
}

/// Fetch DAOs, proposals and tokens when the restored session has none yet.
pub async fn ensure_initialized(session: &mut DaoSession) -> anyhow::Result<()> {
    if !session.daos().daos().is_empty() {
        return Ok(());
    }
    let sp = spinner("Loading DAO data...");
    let result = session.initialize().await;
    sp.finish_and_clear();
    result.map_err(|e| anyhow::anyhow!("Failed to load DAO data: {}", e))
}

/// Persist the session, reporting failures without aborting the command.
pub fn save_session(session: &DaoSession) {
    if let Err(e) = session.save() {
        print_warning(&format!("Failed to save session state: {}", e));
    }
}
