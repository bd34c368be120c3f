//! Core types for ledger-export

use serde::{Deserialize, Serialize};

/// Sequence number identifying one immutable ledger instance
///
/// Ledger indices are strictly positive and form a contiguous history; an
/// export run covers an inclusive range `[start, end]` of them.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LedgerIndex(pub u32);

impl LedgerIndex {
    /// Create a new LedgerIndex
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the inner u32 value
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl From<u32> for LedgerIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl From<LedgerIndex> for u32 {
    fn from(index: LedgerIndex) -> Self {
        index.0
    }
}

impl std::fmt::Display for LedgerIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LedgerIndex {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// One transaction as returned inside a ledger's expanded transaction list
///
/// Only the fixed export schema is kept; any other field present in the
/// response is dropped during deserialization. Fields absent in a given
/// transaction stay `None` and render as blank cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Sending account address
    #[serde(rename = "Account", skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Transaction fee in drops
    #[serde(rename = "Fee", skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,

    /// Transaction flags bitfield
    #[serde(rename = "Flags", skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,

    /// Last ledger index at which the transaction could have been applied
    #[serde(rename = "LastLedgerSequence", skip_serializing_if = "Option::is_none")]
    pub last_ledger_sequence: Option<u32>,

    /// Sequence of the offer this transaction cancels or replaces
    #[serde(rename = "OfferSequence", skip_serializing_if = "Option::is_none")]
    pub offer_sequence: Option<u32>,

    /// Sequence number of the sending account
    #[serde(rename = "Sequence", skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,

    /// Public key that signed the transaction
    #[serde(rename = "SigningPubKey", skip_serializing_if = "Option::is_none")]
    pub signing_pub_key: Option<String>,

    /// Amount the offer creator receives (string drops or currency object)
    #[serde(rename = "TakerGets", skip_serializing_if = "Option::is_none")]
    pub taker_gets: Option<serde_json::Value>,

    /// Amount the offer creator pays (string drops or currency object)
    #[serde(rename = "TakerPays", skip_serializing_if = "Option::is_none")]
    pub taker_pays: Option<serde_json::Value>,

    /// Transaction type name (Payment, OfferCreate, ...)
    #[serde(rename = "TransactionType", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,

    /// Transaction signature
    #[serde(rename = "TxnSignature", skip_serializing_if = "Option::is_none")]
    pub txn_signature: Option<String>,

    /// Identifying hash of the transaction
    #[serde(rename = "hash", skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl TransactionRecord {
    /// Render the record as one CSV row in fixed schema order.
    ///
    /// Scalar JSON values render bare; compound values (issued-currency
    /// amounts) render as compact JSON so the cell stays a single field.
    pub fn csv_fields(&self) -> Vec<String> {
        vec![
            opt_str(&self.account),
            opt_str(&self.fee),
            opt_display(&self.flags),
            opt_display(&self.last_ledger_sequence),
            opt_display(&self.offer_sequence),
            opt_display(&self.sequence),
            opt_str(&self.signing_pub_key),
            opt_value(&self.taker_gets),
            opt_value(&self.taker_pays),
            opt_str(&self.transaction_type),
            opt_str(&self.txn_signature),
            opt_str(&self.hash),
        ]
    }
}

fn opt_str(field: &Option<String>) -> String {
    field.clone().unwrap_or_default()
}

fn opt_display<T: std::fmt::Display>(field: &Option<T>) -> String {
    field.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

fn opt_value(field: &Option<serde_json::Value>) -> String {
    match field {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Terminal outcome of fetching one ledger index through the retry layer
///
/// There is no partial-success state: a ledger's transaction list is
/// retrieved whole or not at all.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The ledger's full transaction list was retrieved
    Success(Vec<TransactionRecord>),
    /// All attempts were exhausted; carries the last error observed
    Unavailable(crate::error::Error),
}

/// Per-partition bookkeeping returned by a worker when it finishes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionSummary {
    /// Partition identifier (0-based)
    pub partition_id: usize,
    /// First ledger index of the partition (inclusive)
    pub start: LedgerIndex,
    /// Last ledger index of the partition (inclusive)
    pub end: LedgerIndex,
    /// Number of ledgers written to the partition's output file
    pub written: u64,
    /// Number of ledgers skipped after retry exhaustion
    pub skipped: u64,
    /// True when the first index was unavailable and the partition
    /// terminated without creating its output file
    pub aborted: bool,
}

/// Events emitted during an export run
///
/// Consumers subscribe via [`crate::LedgerExporter::subscribe`]. Per-index
/// progress, skip diagnostics, and the final completion signal are the sole
/// feedback channel of a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A ledger's transactions were appended to a partition's output file
    LedgerWritten {
        /// Ledger index that was written
        index: LedgerIndex,
        /// Owning partition
        partition_id: usize,
        /// Number of transactions in the ledger
        transactions: usize,
    },

    /// A ledger was skipped after the retry limit was exhausted
    LedgerSkipped {
        /// Ledger index that was skipped
        index: LedgerIndex,
        /// Owning partition
        partition_id: usize,
        /// Last error observed before giving up
        error: String,
    },

    /// A partition finished processing its full range
    PartitionComplete {
        /// Partition identifier
        partition_id: usize,
        /// Ledgers written
        written: u64,
        /// Ledgers skipped
        skipped: u64,
    },

    /// A partition terminated early because its first index was unavailable
    PartitionAborted {
        /// Partition identifier
        partition_id: usize,
        /// The first index of the partition
        index: LedgerIndex,
        /// Last error observed before giving up
        error: String,
    },

    /// All partition workers have finished
    BatchComplete {
        /// Number of partitions in the run
        partitions: usize,
        /// Total ledgers written across all partitions
        written: u64,
        /// Total ledgers skipped across all partitions
        skipped: u64,
    },
}
