//! JSON-RPC ledger fetching — one request per ledger index, single attempt.
//!
//! The [`LedgerFetcher`] trait is the seam between the retry layer and the
//! wire: production code goes through [`RpcLedgerFetcher`] over HTTP, tests
//! substitute stub implementations.

use crate::config::RpcConfig;
use crate::error::{Error, Result};
use crate::types::{LedgerIndex, TransactionRecord};
use serde::{Deserialize, Serialize};

/// Abstraction over single-attempt ledger retrieval, enabling testability.
///
/// Implementations must not retry internally; bounded retries are the
/// responsibility of [`crate::retry::fetch_with_retry`].
#[async_trait::async_trait]
pub trait LedgerFetcher: Send + Sync {
    /// Fetch the full transaction list of one ledger. Single attempt only.
    async fn fetch(&self, index: LedgerIndex) -> Result<Vec<TransactionRecord>>;
}

/// Request parameters for the rippled `ledger` method
///
/// Accounts, full state and owner funds are disabled; transactions are
/// requested in expanded (full JSON) form.
#[derive(Debug, Serialize)]
struct LedgerRequestParams {
    ledger_index: String,
    accounts: bool,
    full: bool,
    transactions: bool,
    expand: bool,
    owner_funds: bool,
}

impl LedgerRequestParams {
    fn for_index(index: LedgerIndex) -> Self {
        Self {
            ledger_index: index.to_string(),
            accounts: false,
            full: false,
            transactions: true,
            expand: true,
            owner_funds: false,
        }
    }
}

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    method: &'static str,
    params: [LedgerRequestParams; 1],
    jsonrpc: &'static str,
    id: u32,
}

/// Top-level JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<LedgerResult>,
}

/// The `result` object of a ledger response
///
/// rippled reports failures inside `result` with `status: "error"` plus an
/// `error` code, rather than through the JSON-RPC error member.
#[derive(Debug, Deserialize)]
struct LedgerResult {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    ledger: Option<LedgerObject>,
}

/// The ledger object carrying the expanded transaction list
#[derive(Debug, Deserialize)]
struct LedgerObject {
    #[serde(default)]
    transactions: Vec<TransactionRecord>,
}

/// Production [`LedgerFetcher`] over a rippled HTTP JSON-RPC endpoint
pub struct RpcLedgerFetcher {
    client: reqwest::Client,
    url: String,
}

impl RpcLedgerFetcher {
    /// Build a fetcher from endpoint configuration.
    ///
    /// The underlying HTTP client enforces the configured per-request
    /// timeout, so a hung node surfaces as a transport error instead of
    /// stalling its partition forever.
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl LedgerFetcher for RpcLedgerFetcher {
    async fn fetch(&self, index: LedgerIndex) -> Result<Vec<TransactionRecord>> {
        let request = JsonRpcRequest {
            method: "ledger",
            params: [LedgerRequestParams::for_index(index)],
            jsonrpc: "2.0",
            id: index.get(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| Error::Protocol(format!("malformed JSON-RPC response: {e}")))?;

        let result = envelope
            .result
            .ok_or_else(|| Error::Protocol("response has no result object".to_string()))?;

        if let Some(code) = result.error {
            let detail = result.error_message.unwrap_or_default();
            return Err(Error::Protocol(format!(
                "node returned error '{code}' for ledger {index}: {detail}"
            )));
        }
        if result.status.as_deref() != Some("success") {
            return Err(Error::Protocol(format!(
                "node returned status {:?} for ledger {index}",
                result.status
            )));
        }

        let ledger = result
            .ledger
            .ok_or_else(|| Error::Protocol(format!("response has no ledger object for {index}")))?;

        Ok(ledger.transactions)
    }
}
