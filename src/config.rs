//! Configuration types for ledger-export

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Top-level configuration for an export run
///
/// Constructed once, then shared immutably (via `Arc`) with the orchestrator
/// and every partition worker. Nothing in here is mutated after the run
/// starts.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint settings
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Range, concurrency and output settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Retry policy for transient fetch failures
    #[serde(default)]
    pub retry: RetryConfig,
}

/// JSON-RPC endpoint configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RpcConfig {
    /// rippled JSON-RPC endpoint URL (default: the public s1 cluster)
    #[serde(default = "default_rpc_url")]
    pub url: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Range, concurrency and output configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// First ledger index to export, inclusive (default: 32570, the earliest
    /// ledger available from public full-history nodes)
    #[serde(default = "default_start_index")]
    pub start_index: u32,

    /// Last ledger index to export, inclusive (default: 32570)
    #[serde(default = "default_start_index")]
    pub end_index: u32,

    /// Number of concurrently-running partition workers (default: 4)
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Directory receiving one CSV file per partition (default: "./exports")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            start_index: default_start_index(),
            end_index: default_start_index(),
            worker_count: default_worker_count(),
            output_dir: default_output_dir(),
        }
    }
}

/// Retry policy configuration
///
/// A fixed delay between attempts; the attempt limit for the first index of
/// a partition is configured independently from the limit for subsequent
/// indices, because a partition whose very first index is unavailable
/// terminates early rather than skipping.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum attempts per index (default: 5)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Maximum attempts for the first index of each partition (default: 1)
    #[serde(default = "default_first_index_max_attempts")]
    pub first_index_max_attempts: u32,

    /// Fixed delay between attempts (default: 1 second)
    #[serde(default = "default_retry_delay", with = "duration_serde")]
    pub delay: Duration,

    /// Add up to 100% uniform random jitter to the delay (default: false)
    #[serde(default)]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            first_index_max_attempts: default_first_index_max_attempts(),
            delay: default_retry_delay(),
            jitter: false,
        }
    }
}

impl RetryConfig {
    /// Policy applied to the first index of a partition
    pub fn first_index_policy(&self) -> crate::retry::RetryPolicy {
        crate::retry::RetryPolicy {
            max_attempts: self.first_index_max_attempts,
            delay: self.delay,
            jitter: self.jitter,
        }
    }

    /// Policy applied to every index after the first
    pub fn policy(&self) -> crate::retry::RetryPolicy {
        crate::retry::RetryPolicy {
            max_attempts: self.max_attempts,
            delay: self.delay,
            jitter: self.jitter,
        }
    }
}

fn default_rpc_url() -> String {
    "https://s1.ripple.com:51234/".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_start_index() -> u32 {
    32570
}

fn default_worker_count() -> usize {
    4
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./exports")
}

fn default_max_attempts() -> u32 {
    5
}

fn default_first_index_max_attempts() -> u32 {
    1
}

fn default_retry_delay() -> Duration {
    Duration::from_secs(1)
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
