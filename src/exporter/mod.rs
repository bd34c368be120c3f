//! Export orchestration — partitions the requested range and runs one
//! concurrent worker per partition.
//!
//! Workers are fire-and-forget with respect to each other: there is no
//! ordering guarantee across partitions and no cancellation of an in-flight
//! batch. The batch-complete signal fires only after every worker has
//! finished, whether it completed, skipped indices, or terminated early.

mod worker;

use crate::config::Config;
use crate::error::Result;
use crate::partition::partition_range;
use crate::rpc::{LedgerFetcher, RpcLedgerFetcher};
use crate::sink::CsvSink;
use crate::types::{Event, LedgerIndex, PartitionSummary};
use std::sync::Arc;
use worker::{PartitionTaskContext, run_partition_task};

/// Main exporter instance (cloneable, all fields are shared handles)
#[derive(Clone)]
pub struct LedgerExporter {
    /// Configuration (wrapped in Arc for sharing across worker tasks)
    config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Ledger fetcher shared by every worker (trait object for pluggable
    /// implementations)
    fetcher: Arc<dyn LedgerFetcher>,
}

impl LedgerExporter {
    /// Create an exporter backed by the configured JSON-RPC endpoint.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Arc::new(RpcLedgerFetcher::new(&config.rpc)?);
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Create an exporter with a custom fetcher implementation.
    ///
    /// The production path goes through [`LedgerExporter::new`]; this
    /// constructor exists so tests and embedders can substitute the
    /// transport.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn LedgerFetcher>) -> Self {
        // Buffer sized for bursts of per-index events from many partitions;
        // slow subscribers see RecvError::Lagged rather than blocking workers
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1024);
        Self {
            config: Arc::new(config),
            event_tx,
            fetcher,
        }
    }

    /// Subscribe to export events
    ///
    /// Multiple subscribers are supported; each receives all events
    /// independently. Per-index progress, skip diagnostics, and the final
    /// [`Event::BatchComplete`] are the run's only feedback channel.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Run the export batch to completion.
    ///
    /// Splits `[start_index, end_index]` into `worker_count` partitions,
    /// spawns one task per partition, and waits for all of them. Returns the
    /// per-partition summaries in partition order once every worker has
    /// finished.
    ///
    /// # Errors
    ///
    /// Range and worker-count validation errors surface here, before any
    /// worker launches or any file is created. Individual worker failures do
    /// not fail the batch: a worker that hits an unrecoverable sink error is
    /// logged and omitted from the returned summaries, and the batch still
    /// runs to completion. A failed run leaves partially written files in
    /// place; re-running the same range appends duplicate rows.
    pub async fn run(&self) -> Result<Vec<PartitionSummary>> {
        let export = &self.config.export;
        let partitions = partition_range(
            LedgerIndex::new(export.start_index),
            LedgerIndex::new(export.end_index),
            export.worker_count,
        )?;

        tracing::info!(
            start = export.start_index,
            end = export.end_index,
            workers = partitions.len(),
            output_dir = %export.output_dir.display(),
            "Starting export batch"
        );

        let mut handles = Vec::with_capacity(partitions.len());
        for partition in &partitions {
            let ctx = PartitionTaskContext {
                partition: *partition,
                fetcher: Arc::clone(&self.fetcher),
                retry: self.config.retry.clone(),
                event_tx: self.event_tx.clone(),
            };
            let sink = CsvSink::for_partition(&export.output_dir, partition);
            handles.push(tokio::spawn(run_partition_task(ctx, sink)));
        }

        let mut summaries = Vec::with_capacity(partitions.len());
        let mut written = 0u64;
        let mut skipped = 0u64;

        for (partition, joined) in partitions
            .iter()
            .zip(futures::future::join_all(handles).await)
        {
            match joined {
                Ok(Ok(summary)) => {
                    written += summary.written;
                    skipped += summary.skipped;
                    summaries.push(summary);
                }
                Ok(Err(e)) => {
                    tracing::error!(
                        partition_id = partition.id,
                        error = %e,
                        "Partition worker failed"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        partition_id = partition.id,
                        error = %e,
                        "Partition worker panicked"
                    );
                }
            }
        }

        tracing::info!(
            partitions = partitions.len(),
            written = written,
            skipped = skipped,
            "Export batch complete"
        );
        self.event_tx
            .send(Event::BatchComplete {
                partitions: partitions.len(),
                written,
                skipped,
            })
            .ok();

        Ok(summaries)
    }
}
