//! Sui JSON-RPC ledger backend
//!
//! Reads go straight to a fullnode: DAO objects through `sui_getObject`,
//! proposals as dynamic fields of the DAO object, governance tokens through
//! `suix_getOwnedObjects`, votes through `suix_queryEvents` and balances
//! through `suix_getBalance`. Every request is retried with exponential
//! backoff on transport failures; JSON-RPC error responses are not retried.
//!
//! Writes need a signed transaction block, which this client cannot produce,
//! so they fail with an unsupported [`LedgerError`].

use async_trait::async_trait;
use backoff::{future::retry, Error as BackoffError, ExponentialBackoffBuilder};
use chrono::DateTime;
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use super::{LedgerClient, ProposalSubmission, TxReceipt};
use crate::core::constants::SUI_COIN_TYPE;
use crate::errors::{DaoError, DaoNotFound, DaoResult, LedgerError, WalletNotConnected};
use crate::types::{Dao, GovernanceToken, Network, Proposal, ProposalStatus, Vote, WalletInfo};
use crate::utils::balance::Mist;

/// Default timeout for a single JSON-RPC call
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Initial retry delay in milliseconds
pub const INITIAL_RETRY_DELAY_MS: u64 = 200;

/// Maximum retry delay in milliseconds
pub const MAX_RETRY_DELAY_MS: u64 = 5_000;

/// Give up retrying after this long
pub const MAX_RETRY_ELAPSED_TIME: Duration = Duration::from_secs(30);

/// Page size for paginated reads
const PAGE_LIMIT: u32 = 50;

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: &'a Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Read-only client for a Sui fullnode
pub struct JsonRpcLedger {
    client: Client,
    endpoint: String,
    package_id: String,
    account: Option<String>,
    dao_objects: Vec<String>,
    request_id: AtomicU64,
}

impl JsonRpcLedger {
    /// Create a client for `endpoint` with the default timeout
    pub fn new(endpoint: impl Into<String>, package_id: impl Into<String>) -> DaoResult<Self> {
        Self::with_timeout(endpoint, package_id, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        package_id: impl Into<String>,
        timeout: Duration,
    ) -> DaoResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            package_id: package_id.into(),
            account: None,
            dao_objects: Vec::new(),
            request_id: AtomicU64::new(1),
        })
    }

    /// Address used by `connect_account`
    pub fn with_account(mut self, address: impl Into<String>) -> Self {
        self.account = Some(address.into());
        self
    }

    /// DAO object ids enumerated by `list_daos`
    pub fn with_dao_objects(mut self, ids: Vec<String>) -> Self {
        self.dao_objects = ids;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn struct_type(&self, name: &str) -> String {
        format!("{}::dao::{}", self.package_id, name)
    }

    /// Issue one JSON-RPC call and return its `result`
    async fn call(&self, method: &str, params: Value) -> DaoResult<Value> {
        let backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(INITIAL_RETRY_DELAY_MS))
            .with_max_interval(Duration::from_millis(MAX_RETRY_DELAY_MS))
            .with_max_elapsed_time(Some(MAX_RETRY_ELAPSED_TIME))
            .build();

        retry(backoff, || async {
            let id = self.request_id.fetch_add(1, Ordering::Relaxed);
            let request = RpcRequest {
                jsonrpc: "2.0",
                id,
                method,
                params: &params,
            };
            debug!(method, id, endpoint = %self.endpoint, "JSON-RPC request");

            let response = self
                .client
                .post(&self.endpoint)
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    warn!(method, error = %e, "JSON-RPC transport failure");
                    BackoffError::transient(DaoError::from(e))
                })?;

            if response.status().is_server_error() {
                let status = response.status();
                warn!(method, %status, "JSON-RPC server error");
                return Err(BackoffError::transient(DaoError::from(
                    LedgerError::with_method(format!("fullnode returned {}", status), method),
                )));
            }

            let body: RpcResponse = response
                .json()
                .await
                .map_err(|e| BackoffError::permanent(DaoError::from(e)))?;

            unwrap_response(method, body).map_err(BackoffError::permanent)
        })
        .await
    }

    /// Fetch an object's Move fields
    async fn object_fields(&self, object_id: &str) -> DaoResult<Map<String, Value>> {
        let result = self
            .call(
                "sui_getObject",
                json!([object_id, { "showContent": true, "showOwner": true }]),
            )
            .await?;
        move_fields(&result).ok_or_else(|| {
            LedgerError::with_method(
                format!("object {} has no Move content", object_id),
                "sui_getObject",
            )
            .into()
        })
    }

    async fn dynamic_field_ids(&self, parent_id: &str) -> DaoResult<Vec<String>> {
        let entries = collect_pages(move |cursor| {
            self.call(
                "suix_getDynamicFields",
                json!([parent_id, cursor, PAGE_LIMIT]),
            )
        })
        .await?;
        Ok(entries
            .iter()
            .filter_map(|entry| entry.get("objectId").and_then(Value::as_str))
            .map(str::to_string)
            .collect())
    }
}

/// Follow `nextCursor` until the last page and return every `data` entry
async fn collect_pages<F, Fut>(mut fetch: F) -> DaoResult<Vec<Value>>
where
    F: FnMut(Value) -> Fut,
    Fut: Future<Output = DaoResult<Value>>,
{
    let mut items = Vec::new();
    let mut cursor = Value::Null;
    loop {
        let page = fetch(cursor).await?;
        if let Some(data) = page.get("data").and_then(Value::as_array) {
            items.extend(data.iter().cloned());
        }
        match next_cursor(&page) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    Ok(items)
}

fn unwrap_response(method: &str, body: RpcResponse) -> DaoResult<Value> {
    if let Some(err) = body.error {
        return Err(LedgerError::with_method(
            format!("{} (code {})", err.message, err.code),
            method,
        )
        .into());
    }
    body.result.ok_or_else(|| {
        LedgerError::with_method("response carried neither result nor error", method).into()
    })
}

fn next_cursor(page: &Value) -> Option<Value> {
    let has_next = page
        .get("hasNextPage")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    match page.get("nextCursor") {
        Some(cursor) if has_next && !cursor.is_null() => Some(cursor.clone()),
        _ => None,
    }
}

/// `data.content.fields` of a `sui_getObject` result
fn move_fields(object: &Value) -> Option<Map<String, Value>> {
    object
        .get("data")?
        .get("content")?
        .get("fields")?
        .as_object()
        .cloned()
}

fn object_id(object: &Value) -> Option<String> {
    object
        .get("data")?
        .get("objectId")?
        .as_str()
        .map(str::to_string)
}

/// Move `u64` fields arrive as JSON strings; accept plain numbers too
fn field_u64(fields: &Map<String, Value>, name: &str) -> u64 {
    match fields.get(name) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

fn field_string(fields: &Map<String, Value>, name: &str) -> String {
    match fields.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn field_bool(fields: &Map<String, Value>, name: &str) -> bool {
    fields.get(name).and_then(Value::as_bool).unwrap_or(false)
}

/// `Balance<SUI>` fields are either a bare amount or `{ fields: { value } }`
fn field_balance(fields: &Map<String, Value>, name: &str) -> String {
    match fields.get(name) {
        Some(Value::Object(inner)) => inner
            .get("fields")
            .and_then(Value::as_object)
            .map(|f| field_string(f, "value"))
            .unwrap_or_else(|| "0".to_string()),
        Some(_) => {
            let value = field_string(fields, name);
            if value.is_empty() {
                "0".to_string()
            } else {
                value
            }
        }
        None => "0".to_string(),
    }
}

fn status_from_fields(fields: &Map<String, Value>) -> ProposalStatus {
    let raw = field_string(fields, "status");
    raw.parse().unwrap_or_else(|_| {
        warn!(status = %raw, "Unknown proposal status, treating as DRAFT");
        ProposalStatus::Draft
    })
}

pub(crate) fn dao_from_fields(id: &str, fields: &Map<String, Value>) -> Dao {
    let name = field_string(fields, "name");
    let creator = field_string(fields, "creator");
    Dao {
        id: id.to_string(),
        name: if name.is_empty() {
            format!("DAO {}", id)
        } else {
            name
        },
        treasury: field_balance(fields, "treasury"),
        proposal_count: field_u64(fields, "proposal_count"),
        min_voting_power: field_u64(fields, "min_voting_power"),
        active: fields.get("active").and_then(Value::as_bool).unwrap_or(true),
        creator: (!creator.is_empty()).then_some(creator),
        created_at: DateTime::from_timestamp_millis(field_u64(fields, "created_at") as i64)
            .filter(|_| fields.contains_key("created_at")),
    }
}

pub(crate) fn proposal_from_fields(id: &str, dao_id: &str, fields: &Map<String, Value>) -> Proposal {
    let amount = field_string(fields, "amount_requested");
    Proposal {
        id: id.to_string(),
        dao_id: dao_id.to_string(),
        title: field_string(fields, "title"),
        description: field_string(fields, "description"),
        amount_requested: if amount.is_empty() {
            "0".to_string()
        } else {
            amount
        },
        proposer: field_string(fields, "proposer"),
        deadline: field_u64(fields, "deadline") as i64,
        executed: field_bool(fields, "executed"),
        votes_for: field_u64(fields, "votes_for"),
        votes_against: field_u64(fields, "votes_against"),
        status: status_from_fields(fields),
        created_at: fields
            .contains_key("created_at")
            .then(|| DateTime::from_timestamp_millis(field_u64(fields, "created_at") as i64))
            .flatten(),
    }
}

/// Owned `GovernanceToken` object; tokens of another DAO yield `None`
pub(crate) fn token_from_object(
    object: &Value,
    dao_id: &str,
    owner: &str,
) -> Option<GovernanceToken> {
    let id = object_id(object)?;
    let fields = move_fields(object)?;
    let token_dao = field_string(&fields, "dao_id");
    if !token_dao.is_empty() && token_dao != dao_id {
        return None;
    }
    Some(GovernanceToken {
        id,
        dao_id: dao_id.to_string(),
        voting_power: field_u64(&fields, "voting_power"),
        owner: owner.to_string(),
        created_at: None,
    })
}

/// `VoteCast` event for `proposal_id`; events of other proposals yield `None`
pub(crate) fn vote_from_event(event: &Value, proposal_id: &str) -> Option<Vote> {
    let fields = event.get("parsedJson")?.as_object()?;
    if field_string(fields, "proposal_id") != proposal_id {
        return None;
    }
    let digest = event
        .get("id")
        .and_then(|id| id.get("txDigest"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(Vote {
        id: digest.to_string(),
        proposal_id: proposal_id.to_string(),
        voter: field_string(fields, "voter"),
        support: field_bool(fields, "support"),
        voting_power: field_u64(fields, "voting_power"),
        timestamp: event
            .get("timestampMs")
            .and_then(Value::as_str)
            .and_then(|t| t.parse().ok())
            .unwrap_or(0),
    })
}

#[async_trait]
impl LedgerClient for JsonRpcLedger {
    fn name(&self) -> &'static str {
        "rpc"
    }

    async fn list_daos(&self) -> DaoResult<Vec<Dao>> {
        let lookups = self.dao_objects.iter().map(|id| self.get_dao(id));
        let mut daos = Vec::with_capacity(self.dao_objects.len());
        for result in join_all(lookups).await {
            match result {
                Ok(dao) => daos.push(dao),
                Err(e) => warn!(error = %e, "Skipping unreadable DAO object"),
            }
        }
        Ok(daos)
    }

    async fn get_dao(&self, dao_id: &str) -> DaoResult<Dao> {
        let fields = self.object_fields(dao_id).await.map_err(|e| match e {
            DaoError::Ledger(_) => DaoError::from(DaoNotFound::with_id(dao_id)),
            other => other,
        })?;
        Ok(dao_from_fields(dao_id, &fields))
    }

    async fn list_proposals(&self, dao_id: &str) -> DaoResult<Vec<Proposal>> {
        let ids = self.dynamic_field_ids(dao_id).await?;
        debug!(dao_id, count = ids.len(), "Fetching proposal objects");

        let reads = ids.iter().map(|id| async move {
            self.object_fields(id)
                .await
                .map(|fields| proposal_from_fields(id, dao_id, &fields))
        });

        let mut proposals = Vec::with_capacity(ids.len());
        for result in join_all(reads).await {
            match result {
                Ok(p) => proposals.push(p),
                Err(e) => warn!(dao_id, error = %e, "Skipping unreadable proposal object"),
            }
        }
        Ok(proposals)
    }

    async fn list_tokens(&self, dao_id: &str) -> DaoResult<Vec<GovernanceToken>> {
        let Some(owner) = self.account.as_deref() else {
            return Ok(Vec::new());
        };
        let filter = json!({
            "filter": { "StructType": self.struct_type("GovernanceToken") },
            "options": { "showContent": true }
        });

        let objects = collect_pages(move |cursor| {
            self.call(
                "suix_getOwnedObjects",
                json!([owner, filter, cursor, PAGE_LIMIT]),
            )
        })
        .await?;
        Ok(objects
            .iter()
            .filter_map(|object| token_from_object(object, dao_id, owner))
            .collect())
    }

    async fn list_votes(&self, proposal_id: &str) -> DaoResult<Vec<Vote>> {
        let query = json!({ "MoveEventType": self.struct_type("VoteCast") });
        let events = collect_pages(move |cursor| {
            self.call(
                "suix_queryEvents",
                json!([query, cursor, PAGE_LIMIT, false]),
            )
        })
        .await?;
        let votes: Vec<Vote> = events
            .iter()
            .filter_map(|event| vote_from_event(event, proposal_id))
            .collect();
        debug!(
            proposal_id,
            events = events.len(),
            votes = votes.len(),
            "Loaded vote events"
        );
        Ok(votes)
    }

    async fn get_balance(&self, address: &str) -> DaoResult<Mist> {
        let result = self
            .call("suix_getBalance", json!([address, SUI_COIN_TYPE]))
            .await?;
        let total = result
            .get("totalBalance")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u128>().ok())
            .ok_or_else(|| {
                LedgerError::with_method("missing totalBalance", "suix_getBalance")
            })?;
        Ok(Mist(total))
    }

    async fn connect_account(&self, network: Network) -> DaoResult<WalletInfo> {
        let address = self.account.clone().ok_or_else(|| {
            WalletNotConnected::new("no account configured for the RPC backend (set SUIDAO_ACCOUNT)")
        })?;
        let balance = self.get_balance(&address).await?;
        Ok(WalletInfo {
            address,
            balance: balance.to_base_units(),
            network,
            connected: true,
            connecting: false,
        })
    }

    async fn submit_proposal(&self, _submission: &ProposalSubmission) -> DaoResult<TxReceipt> {
        Err(LedgerError::unsupported("create_proposal").into())
    }

    async fn cast_vote(
        &self,
        _proposal_id: &str,
        _support: bool,
        _token_id: &str,
    ) -> DaoResult<TxReceipt> {
        Err(LedgerError::unsupported("vote_on_proposal").into())
    }

    async fn execute_proposal(&self, _proposal_id: &str) -> DaoResult<TxReceipt> {
        Err(LedgerError::unsupported("execute_proposal").into())
    }

    async fn mint_token(
        &self,
        _dao_id: &str,
        _owner: &str,
        _voting_power: u64,
    ) -> DaoResult<TxReceipt> {
        Err(LedgerError::unsupported("mint_governance_token").into())
    }

    async fn create_dao(&self, _name: &str, _min_voting_power: u64) -> DaoResult<TxReceipt> {
        Err(LedgerError::unsupported("create_dao").into())
    }
}
