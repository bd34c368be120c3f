//! # ledger-export
//!
//! Library for exporting historical XRP Ledger transaction data from a
//! rippled JSON-RPC endpoint into partitioned, append-only CSV archives.
//!
//! ## Design Philosophy
//!
//! - **Partitioned** - the requested index range is split into disjoint
//!   contiguous partitions, each owned by one concurrently-running worker
//! - **Sequential within a partition** - one outstanding RPC call at a time,
//!   indices processed in strictly ascending order
//! - **Failure-tolerant** - transient node failures are retried with a
//!   bounded fixed-delay policy; an exhausted index is skipped with a
//!   diagnostic instead of aborting a multi-hour batch
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use ledger_export::{Config, LedgerExporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.export.start_index = 32570;
//!     config.export.end_index = 4_184_823;
//!     config.export.worker_count = 24;
//!     config.export.output_dir = "/var/tmp".into();
//!
//!     let exporter = LedgerExporter::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = exporter.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summaries = exporter.run().await?;
//!     println!("Exported {} partitions", summaries.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Export orchestration and partition workers
pub mod exporter;
/// Range partitioning
pub mod partition;
/// Bounded fixed-delay retry around the fetcher
pub mod retry;
/// JSON-RPC ledger fetching
pub mod rpc;
/// Append-only CSV targets
pub mod sink;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, ExportConfig, RetryConfig, RpcConfig};
pub use error::{Error, IsRetryable, Result};
pub use exporter::LedgerExporter;
pub use partition::{Partition, partition_range};
pub use retry::{RetryPolicy, fetch_with_retry};
pub use rpc::{LedgerFetcher, RpcLedgerFetcher};
pub use sink::{CSV_HEADERS, CsvSink, LedgerSink};
pub use types::{Event, FetchOutcome, LedgerIndex, PartitionSummary, TransactionRecord};
