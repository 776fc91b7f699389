//! Known DAOs and the current selection

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::constants::DAO_STORAGE_KEY;
use crate::errors::{DaoError, DaoNotFound, DaoResult};
use crate::ledger::LedgerClient;
use crate::persistence::Persist;
use crate::types::{Dao, DaoPatch};

/// Durable subset of [`DaoStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoSnapshot {
    pub current_dao: Option<Dao>,
    pub daos: Vec<Dao>,
}

#[derive(Debug, Clone, Default)]
pub struct DaoStore {
    current_dao: Option<Dao>,
    daos: Vec<Dao>,
    is_loading: bool,
    error: Option<String>,
}

impl DaoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_dao(&self) -> Option<&Dao> {
        self.current_dao.as_ref()
    }

    pub fn daos(&self) -> &[Dao] {
        &self.daos
    }

    pub fn dao_by_id(&self, id: &str) -> Option<&Dao> {
        self.daos.iter().find(|d| d.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fail(&mut self, err: DaoError) -> DaoError {
        warn!(error = %err, "DAO store action failed");
        self.error = Some(err.to_string());
        err
    }

    pub fn set_current_dao(&mut self, dao: Dao) {
        self.current_dao = Some(dao);
        self.error = None;
    }

    /// Select a known DAO by id
    pub fn select_dao(&mut self, id: &str) -> DaoResult<()> {
        match self.dao_by_id(id).cloned() {
            Some(dao) => {
                self.set_current_dao(dao);
                Ok(())
            }
            None => Err(self.fail(DaoNotFound::with_id(id).into())),
        }
    }

    pub fn add_dao(&mut self, dao: Dao) {
        self.daos.push(dao);
        self.error = None;
    }

    /// Merge `patch` into the DAO with `id`, keeping the current selection in step
    pub fn update_dao(&mut self, id: &str, patch: &DaoPatch) -> DaoResult<()> {
        let dao = self
            .daos
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| DaoNotFound::with_id(id))?;
        patch.apply_to(dao);

        if let Some(current) = self.current_dao.as_mut().filter(|c| c.id == id) {
            patch.apply_to(current);
        }
        Ok(())
    }

    pub fn set_daos(&mut self, daos: Vec<Dao>) {
        self.daos = daos;
        self.error = None;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Reload the DAO list. The current selection survives if it is still
    /// listed (with fresh data), otherwise the first DAO becomes current.
    pub async fn refresh_dao_data(&mut self, ledger: &dyn LedgerClient) -> DaoResult<()> {
        self.is_loading = true;
        self.error = None;
        let result = ledger.list_daos().await;
        self.is_loading = false;
        let daos = result.map_err(|e| self.fail(e))?;

        let kept = self
            .current_dao
            .as_ref()
            .and_then(|current| daos.iter().find(|d| d.id == current.id))
            .or_else(|| daos.first())
            .cloned();
        debug!(count = daos.len(), current = ?kept.as_ref().map(|d| &d.id), "Loaded DAOs");

        self.daos = daos;
        self.current_dao = kept;
        Ok(())
    }

    /// Create a DAO on the ledger and add it with an empty treasury
    pub async fn create_dao(
        &mut self,
        ledger: &dyn LedgerClient,
        name: &str,
        min_voting_power: u64,
        creator: &str,
    ) -> DaoResult<Dao> {
        self.is_loading = true;
        self.error = None;
        let result = ledger.create_dao(name, min_voting_power).await;
        self.is_loading = false;
        let receipt = result.map_err(|e| self.fail(e))?;

        let dao = Dao {
            id: receipt.created_object.unwrap_or(receipt.digest),
            name: name.to_string(),
            treasury: "0".to_string(),
            proposal_count: 0,
            min_voting_power,
            active: true,
            creator: Some(creator.to_string()),
            created_at: Some(Utc::now()),
        };
        info!(dao_id = %dao.id, name, "DAO created");
        self.add_dao(dao.clone());
        Ok(dao)
    }
}

impl Persist for DaoStore {
    const KEY: &'static str = DAO_STORAGE_KEY;
    type Snapshot = DaoSnapshot;

    fn snapshot(&self) -> DaoSnapshot {
        DaoSnapshot {
            current_dao: self.current_dao.clone(),
            daos: self.daos.clone(),
        }
    }

    fn restore(&mut self, snapshot: DaoSnapshot) {
        self.current_dao = snapshot.current_dao;
        self.daos = snapshot.daos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::mock::{MockLedger, MOCK_DAO_ID};

    fn dao(id: &str) -> Dao {
        Dao {
            id: id.to_string(),
            name: format!("DAO {}", id),
            treasury: "0".to_string(),
            proposal_count: 0,
            min_voting_power: 1000,
            active: true,
            creator: None,
            created_at: None,
        }
    }

    #[test]
    fn test_update_keeps_current_in_sync() {
        let mut store = DaoStore::new();
        store.set_daos(vec![dao("a"), dao("b")]);
        store.select_dao("a").unwrap();

        store
            .update_dao("a", &DaoPatch::new().treasury("42").proposal_count(3))
            .unwrap();
        assert_eq!(store.current_dao().unwrap().treasury, "42");
        assert_eq!(store.dao_by_id("a").unwrap().proposal_count, 3);

        store.update_dao("b", &DaoPatch::new().active(false)).unwrap();
        assert!(store.current_dao().unwrap().active);
    }

    #[test]
    fn test_unknown_dao() {
        let mut store = DaoStore::new();
        assert!(store.update_dao("x", &DaoPatch::new()).unwrap_err().is_not_found());
        assert!(store.select_dao("x").unwrap_err().is_not_found());
        assert!(store.error().is_some());
    }

    #[tokio::test]
    async fn test_refresh_selects_first_then_keeps_selection() {
        let ledger = MockLedger::new();
        let mut store = DaoStore::new();

        store.refresh_dao_data(&ledger).await.unwrap();
        assert_eq!(store.current_dao().unwrap().id, MOCK_DAO_ID);
        assert_eq!(store.current_dao().unwrap().treasury, "125000000000000");

        store.select_dao("defi-dao").unwrap();
        store.refresh_dao_data(&ledger).await.unwrap();
        assert_eq!(store.current_dao().unwrap().id, "defi-dao");
    }

    #[tokio::test]
    async fn test_refresh_replaces_vanished_selection() {
        let ledger = MockLedger::new();
        let mut store = DaoStore::new();
        store.set_current_dao(dao("gone"));
        store.refresh_dao_data(&ledger).await.unwrap();
        assert_eq!(store.current_dao().unwrap().id, MOCK_DAO_ID);
    }

    #[tokio::test]
    async fn test_create_dao() {
        let ledger = MockLedger::new();
        let mut store = DaoStore::new();
        let created = store.create_dao(&ledger, "Builders", 500, "0xme").await.unwrap();
        assert_eq!(created.treasury, "0");
        assert_eq!(created.min_voting_power, 500);
        assert_eq!(store.daos().len(), 1);
    }
}
