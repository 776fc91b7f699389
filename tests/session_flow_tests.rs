//! End-to-end flows through `DaoSession` against the mock ledger

use std::sync::Arc;
use sui_dao_rs::ledger::mock::{MockLedger, MOCK_ACCOUNT, MOCK_DAO_ID};
use sui_dao_rs::utils::format_sui;
use sui_dao_rs::{Config, DaoSession, ProposalDraft, ProposalStatus, StateStorage};

fn mock_session() -> (DaoSession, Arc<MockLedger>) {
    let ledger = Arc::new(MockLedger::new());
    let session = DaoSession::new(Config::new(), ledger.clone());
    (session, ledger)
}

#[tokio::test]
async fn test_dashboard_proposal_vote_flow() {
    let (mut session, _ledger) = mock_session();
    session.initialize().await.unwrap();

    // Dashboard
    let dao = session.daos().current_dao().unwrap();
    assert_eq!(dao.id, MOCK_DAO_ID);
    assert_eq!(dao.treasury, "125000000000000");
    assert_eq!(session.stats().treasury, "125,000");
    assert_eq!(session.stats().active_proposals, 1);

    session.connect_wallet().await.unwrap();
    assert_eq!(session.stats().user_voting_power, 12_500);

    // Create
    let created = session
        .create_proposal(&ProposalDraft::new(
            "Community fund",
            "Grants for ecosystem builders",
            "50000",
        ))
        .await
        .unwrap();
    assert_eq!(created.amount_requested, "50000000000000");
    assert_eq!(format_sui(&created.amount_requested), "50,000");
    assert_eq!(created.status, ProposalStatus::Draft);
    assert_eq!(created.proposer, MOCK_ACCOUNT);
    assert_eq!((created.votes_for, created.votes_against), (0, 0));

    // Vote
    session.activate_proposal(&created.id).unwrap();
    let receipt = session.vote(&created.id, true, "0xtoken1").await.unwrap();
    assert_eq!(receipt.proposal.votes_for, 12_500);
    assert_eq!(receipt.proposal.votes_against, 0);
    assert!(session.governance().has_user_voted_on_proposal(&created.id));
    assert_eq!(session.stats().active_proposals, 2);

    // Execute
    session.execute_proposal(&created.id).await.unwrap();
    let executed = session.proposals().proposal_by_id(&created.id).unwrap();
    assert_eq!(executed.status, ProposalStatus::Executed);
    assert!(executed.executed);
}

#[tokio::test]
async fn test_repeat_vote_is_rejected_without_double_counting() {
    let (mut session, ledger) = mock_session();
    session.initialize().await.unwrap();
    session.connect_wallet().await.unwrap();

    session.vote("0xproposal1", false, "0xtoken1").await.unwrap();
    let writes = ledger.transactions();

    let err = session.vote("0xproposal1", false, "0xtoken1").await.unwrap_err();
    assert!(err.is_duplicate_vote());
    assert_eq!(ledger.transactions(), writes);

    let p = session.proposals().proposal_by_id("0xproposal1").unwrap();
    assert_eq!(p.votes_against, 23_000 + 12_500);
}

#[tokio::test]
async fn test_reconnect_restores_user_votes() {
    let (mut session, _ledger) = mock_session();
    session.initialize().await.unwrap();
    session.connect_wallet().await.unwrap();
    session.vote("0xproposal1", true, "0xtoken1").await.unwrap();

    session.disconnect_wallet();
    assert!(!session.governance().has_user_voted_on_proposal("0xproposal1"));

    session.connect_wallet().await.unwrap();
    assert!(session.governance().has_user_voted_on_proposal("0xproposal1"));
    let vote = session
        .governance()
        .user_vote_for_proposal("0xproposal1")
        .unwrap();
    assert_eq!(vote.voter, MOCK_ACCOUNT);
    assert_eq!(vote.voting_power, 12_500);
    assert!(session
        .governance()
        .user_votes()
        .all(|v| session.governance().votes().any(|g| g == v)));
}

#[tokio::test]
async fn test_closed_proposals_refuse_votes() {
    let (mut session, _ledger) = mock_session();
    session.initialize().await.unwrap();
    session.connect_wallet().await.unwrap();

    // 0xproposal2 is EXECUTED, 0xproposal3 is DRAFT
    for id in ["0xproposal2", "0xproposal3"] {
        let err = session.vote(id, true, "0xtoken1").await.unwrap_err();
        assert!(err.is_invalid_transition(), "{}", id);
        assert!(!session.governance().has_user_voted_on_proposal(id));
    }
}

#[tokio::test]
async fn test_lifecycle_rules() {
    let (mut session, _ledger) = mock_session();
    session.initialize().await.unwrap();

    // DRAFT cannot be executed or rejected
    let err = session.execute_proposal("0xproposal3").await.unwrap_err();
    assert!(err.is_invalid_transition());
    let err = session.reject_proposal("0xproposal3").unwrap_err();
    assert!(err.is_invalid_transition());

    session.activate_proposal("0xproposal3").unwrap();
    let err = session.activate_proposal("0xproposal3").unwrap_err();
    assert!(err.is_invalid_transition());
    session.reject_proposal("0xproposal3").unwrap();

    // terminal
    assert!(session.activate_proposal("0xproposal3").is_err());
    assert!(session.execute_proposal("0xproposal3").await.is_err());
    assert_eq!(
        session.proposals().proposal_by_id("0xproposal3").unwrap().status,
        ProposalStatus::Rejected
    );
}

#[tokio::test]
async fn test_switching_dao_reloads_tokens() {
    let (mut session, _ledger) = mock_session();
    session.initialize().await.unwrap();
    session.connect_wallet().await.unwrap();

    session.select_dao("defi-dao").await.unwrap();
    assert_eq!(session.daos().current_dao().unwrap().id, "defi-dao");
    assert!(session
        .governance()
        .tokens()
        .iter()
        .all(|t| t.dao_id == "defi-dao"));
    assert_eq!(session.stats().user_voting_power, 12_500);

    assert!(session.select_dao("nope").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_mint_and_create_dao() {
    let (mut session, _ledger) = mock_session();
    session.initialize().await.unwrap();
    session.connect_wallet().await.unwrap();

    let token = session.mint_token(5_000).await.unwrap();
    assert_eq!(token.owner, MOCK_ACCOUNT);
    assert_eq!(session.governance().user_voting_power(), 17_500);
    assert_eq!(session.governance().total_voting_power(), 40_500);

    let dao = session.create_dao("Builders", 250).await.unwrap();
    assert_eq!(dao.creator.as_deref(), Some(MOCK_ACCOUNT));
    assert!(session.daos().dao_by_id(&dao.id).is_some());
}

#[tokio::test]
async fn test_ledger_failure_is_reported_in_store() {
    let (mut session, ledger) = mock_session();
    ledger.set_failure(Some("fullnode timeout".to_string()));

    let err = session.initialize().await.unwrap_err();
    assert!(err.is_backend_error());
    assert!(session.daos().error().unwrap().contains("fullnode timeout"));
    assert!(!session.daos().is_loading());
}

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::new().with_storage_dir(dir.path().to_string_lossy());

    let created_id = {
        let mut session = DaoSession::from_config(config.clone()).unwrap();
        session.initialize().await.unwrap();
        session.connect_wallet().await.unwrap();
        let p = session
            .create_proposal(&ProposalDraft::new("Audit", "Security audit", "1200.5"))
            .await
            .unwrap();
        session.activate_proposal(&p.id).unwrap();
        session.vote(&p.id, true, "0xtoken1").await.unwrap();
        session.save().unwrap();
        p.id
    };

    let session = DaoSession::from_config(config).unwrap();
    let restored = session.proposals().proposal_by_id(&created_id).unwrap();
    assert_eq!(restored.amount_requested, "1200500000000");
    assert_eq!(restored.votes_for, 12_500);
    assert!(session.governance().has_user_voted_on_proposal(&created_id));
    assert!(session.wallet().is_connected());
    assert!(StateStorage::new(dir.path()).path_for("dao-storage").exists());
}
