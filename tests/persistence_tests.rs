//! Store snapshots on disk: whitelisted fields only, tolerant loading

use serde_json::Value;
use std::sync::Arc;
use sui_dao_rs::ledger::mock::MockLedger;
use sui_dao_rs::persistence::SNAPSHOT_VERSION;
use sui_dao_rs::stores::{ProposalSnapshot, WalletSnapshot};
use sui_dao_rs::{
    Config, DaoSession, Language, Network, Persist, ProposalStatus, ProposalStore, SortKey,
    SortOrder, StateStorage, StatusFilter, WalletStore,
};

fn read_json(storage: &StateStorage, key: &str) -> Value {
    let content = std::fs::read_to_string(storage.path_for(key)).unwrap();
    serde_json::from_str(&content).unwrap()
}

fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

async fn saved_session(storage: &StateStorage) {
    let mut session =
        DaoSession::new(Config::new(), Arc::new(MockLedger::new())).with_storage(storage.clone());
    session.initialize().await.unwrap();
    session.connect_wallet().await.unwrap();
    session
        .proposals_mut()
        .set_status_filter(StatusFilter::Only(ProposalStatus::Active));
    session.language_mut().set_language(Language::En);
    session.save().unwrap();
}

#[tokio::test]
async fn test_files_hold_whitelisted_fields_only() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StateStorage::new(dir.path());
    saved_session(&storage).await;

    let wallet = read_json(&storage, "wallet-storage");
    assert_eq!(wallet["version"], SNAPSHOT_VERSION);
    assert_eq!(
        keys(&wallet["state"]),
        vec!["auto_connect", "preferred_network", "wallet"]
    );

    let proposals = read_json(&storage, "proposal-storage");
    assert_eq!(
        keys(&proposals["state"]),
        vec!["proposals", "sort_by", "sort_order", "status_filter"]
    );

    let governance = read_json(&storage, "governance-storage");
    assert_eq!(
        keys(&governance["state"]),
        vec!["tokens", "user_tokens", "user_votes", "votes"]
    );

    let daos = read_json(&storage, "dao-storage");
    assert_eq!(keys(&daos["state"]), vec!["current_dao", "daos"]);

    let language = read_json(&storage, "language-storage");
    assert_eq!(keys(&language["state"]), vec!["language"]);
    assert_eq!(language["state"]["language"], "en");
}

#[tokio::test]
async fn test_restore_recomputes_derived_values() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StateStorage::new(dir.path());
    saved_session(&storage).await;

    let mut session =
        DaoSession::new(Config::new(), Arc::new(MockLedger::new())).with_storage(storage);
    session.load();

    assert_eq!(session.proposals().active_proposals().len(), 1);
    assert_eq!(session.governance().total_voting_power(), 35_500);
    assert_eq!(session.governance().user_voting_power(), 12_500);
    assert_eq!(
        session.proposals().status_filter(),
        StatusFilter::Only(ProposalStatus::Active)
    );
    assert!(!session.proposals().is_loading());
    assert!(session.proposals().error().is_none());
}

#[test]
fn test_corrupt_snapshot_restores_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StateStorage::new(dir.path());
    std::fs::write(storage.path_for("wallet-storage"), "{ not json").unwrap();

    let snapshot: WalletSnapshot = storage.load("wallet-storage");
    assert_eq!(snapshot, WalletSnapshot::default());
    assert!(snapshot.auto_connect);

    let mut store = WalletStore::new();
    storage.load_into(&mut store);
    assert!(!store.is_connected());
    assert_eq!(store.preferred_network(), Network::Testnet);
}

#[test]
fn test_missing_directory_loads_defaults_and_save_creates_it() {
    let dir = tempfile::tempdir().unwrap();
    let storage = StateStorage::new(dir.path().join("nested").join("state"));

    let snapshot: ProposalSnapshot = storage.load(ProposalStore::KEY);
    assert!(snapshot.proposals.is_empty());
    assert_eq!(snapshot.sort_by, SortKey::CreatedAt);
    assert_eq!(snapshot.sort_order, SortOrder::Desc);

    let mut store = ProposalStore::new();
    store.set_sort_order(SortOrder::Asc);
    storage.save_from(&store).unwrap();
    assert!(storage.path_for(ProposalStore::KEY).exists());

    let mut restored = ProposalStore::new();
    storage.load_into(&mut restored);
    assert_eq!(restored.sort_order(), SortOrder::Asc);
}
