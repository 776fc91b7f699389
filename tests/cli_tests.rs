//! CLI commands run end to end against the mock ledger in a temp directory

use clap::Parser;
use sui_dao_rs::cli::{run_with, Cli};
use sui_dao_rs::{Config, DaoSession, Language, ProposalStatus};

fn cli(storage: &std::path::Path, args: &[&str]) -> Cli {
    let dir = storage.to_string_lossy().to_string();
    let mut argv = vec![
        "suidao".to_string(),
        "--ledger".to_string(),
        "mock".to_string(),
        "--storage-dir".to_string(),
        dir,
        "--no-prompt".to_string(),
    ];
    argv.extend(args.iter().map(|a| a.to_string()));
    Cli::try_parse_from(argv).unwrap()
}

fn reopen(storage: &std::path::Path) -> DaoSession {
    DaoSession::from_config(Config::new().with_storage_dir(storage.to_string_lossy())).unwrap()
}

#[tokio::test]
async fn test_proposal_lifecycle_across_invocations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path();

    run_with(cli(path, &["wallet", "connect"])).await.unwrap();
    run_with(cli(
        path,
        &["proposal", "create", "-t", "Audit", "-d", "Security audit", "-a", "2500"],
    ))
    .await
    .unwrap();

    let session = reopen(path);
    let created = session
        .proposals()
        .proposals()
        .iter()
        .find(|p| p.title == "Audit")
        .cloned()
        .unwrap();
    assert_eq!(created.status, ProposalStatus::Draft);
    assert_eq!(created.amount_requested, "2500000000000");

    run_with(cli(path, &["proposal", "activate", &created.id])).await.unwrap();
    run_with(cli(path, &["proposal", "vote", &created.id])).await.unwrap();
    assert!(run_with(cli(path, &["proposal", "vote", &created.id])).await.is_err());
    run_with(cli(path, &["proposal", "execute", &created.id])).await.unwrap();

    let session = reopen(path);
    let p = session.proposals().proposal_by_id(&created.id).unwrap();
    assert_eq!(p.votes_for, 12_500);
    assert_eq!(p.status, ProposalStatus::Executed);
}

#[tokio::test]
async fn test_invalid_proposal_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_with(cli(
        dir.path(),
        &["proposal", "create", "-t", "", "-d", "x", "-a", "abc"],
    ))
    .await;
    assert!(result.is_err());
    assert_eq!(reopen(dir.path()).proposals().proposals().len(), 3);
}

#[tokio::test]
async fn test_read_only_commands_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path();
    for args in [
        vec!["dashboard"],
        vec!["dao", "list"],
        vec!["dao", "show"],
        vec!["proposal", "list", "--status", "active", "--sort", "votes"],
        vec!["proposal", "show", "0xproposal1"],
        vec!["governance", "tokens"],
        vec!["governance", "votes", "0xproposal1"],
        vec!["wallet", "network"],
    ] {
        run_with(cli(path, &args)).await.unwrap();
    }
}

#[tokio::test]
async fn test_language_persists() {
    let dir = tempfile::tempdir().unwrap();
    run_with(cli(dir.path(), &["lang", "set", "en"])).await.unwrap();
    assert_eq!(reopen(dir.path()).language().language(), Language::En);

    run_with(cli(dir.path(), &["lang", "toggle"])).await.unwrap();
    assert_eq!(reopen(dir.path()).language().language(), Language::Es);
}
