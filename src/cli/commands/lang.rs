//! Language commands.

use crate::cli::utils::{print_info, print_success, save_session};
use crate::cli::Cli;
use crate::types::Language;
use clap::{Args, Subcommand};

/// Language command container
#[derive(Args, Clone)]
pub struct LangCommand {
    #[command(subcommand)]
    pub command: LangCommands,
}

/// Available language operations
#[derive(Subcommand, Clone)]
pub enum LangCommands {
    /// Show the display language
    Show,

    /// Set the display language (es, en)
    Set {
        language: Language,
    },

    /// Switch between Spanish and English
    Toggle,
}

/// Execute language commands
pub async fn execute(cmd: LangCommand, cli: &Cli) -> anyhow::Result<()> {
    let mut session = cli.open_session()?;
    match cmd.command {
        LangCommands::Show => {
            print_info(&format!("Language: {}", session.language().language()));
            return Ok(());
        }
        LangCommands::Set { language } => session.language_mut().set_language(language),
        LangCommands::Toggle => {
            session.language_mut().toggle();
        }
    }
    print_success(&format!(
        "Language: {} ({})",
        session.language().language(),
        session.t("dashboard", Some("navigation"))
    ));
    save_session(&session);
    Ok(())
}
