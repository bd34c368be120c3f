//! Partition worker — drives one partition strictly sequentially.
//!
//! One outstanding RPC call at a time, never pipelined. The first index of
//! the partition decides whether the partition runs at all: if it is
//! unavailable after its (separately configured) retry budget, the worker
//! terminates early without creating its output file. Every later index
//! that comes back unavailable is skipped with a diagnostic and the worker
//! moves on.

use crate::config::RetryConfig;
use crate::error::Result;
use crate::partition::Partition;
use crate::retry::fetch_with_retry;
use crate::rpc::LedgerFetcher;
use crate::sink::LedgerSink;
use crate::types::{Event, FetchOutcome, PartitionSummary};
use std::sync::Arc;

/// Shared context for a single partition task
pub(crate) struct PartitionTaskContext {
    pub(crate) partition: Partition,
    pub(crate) fetcher: Arc<dyn LedgerFetcher>,
    pub(crate) retry: RetryConfig,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl PartitionTaskContext {
    /// Emit an event, dropping it silently when nobody is subscribed.
    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}

/// Process one partition: fetch each index in ascending order and append the
/// result to the sink.
///
/// Returns the partition's bookkeeping on normal completion or early abort.
/// A sink failure is the worker's first unrecoverable non-network error and
/// is propagated to the orchestrator instead.
pub(crate) async fn run_partition_task<S: LedgerSink>(
    ctx: PartitionTaskContext,
    mut sink: S,
) -> Result<PartitionSummary> {
    let partition = ctx.partition;
    let mut summary = PartitionSummary {
        partition_id: partition.id,
        start: partition.start,
        end: partition.end,
        written: 0,
        skipped: 0,
        aborted: false,
    };

    let mut indices = partition.indices();
    let Some(first_index) = indices.next() else {
        // Degenerate partition (more workers than indices): nothing to do
        tracing::debug!(partition_id = partition.id, "Partition owns no indices");
        ctx.emit(Event::PartitionComplete {
            partition_id: partition.id,
            written: 0,
            skipped: 0,
        });
        return Ok(summary);
    };

    tracing::info!(
        partition_id = partition.id,
        start = partition.start.get(),
        end = partition.end.get(),
        ledgers = partition.len(),
        "Partition worker started"
    );

    // The first index gates the partition: without it there is no target
    // file to append to, so exhaustion here terminates the whole partition
    match fetch_with_retry(&*ctx.fetcher, first_index, &ctx.retry.first_index_policy()).await {
        FetchOutcome::Success(records) => {
            sink.append(first_index, &records)?;
            summary.written += 1;
            ctx.emit(Event::LedgerWritten {
                index: first_index,
                partition_id: partition.id,
                transactions: records.len(),
            });
        }
        FetchOutcome::Unavailable(e) => {
            tracing::warn!(
                partition_id = partition.id,
                ledger_index = first_index.get(),
                error = %e,
                "First ledger of partition unavailable, terminating partition"
            );
            summary.aborted = true;
            ctx.emit(Event::PartitionAborted {
                partition_id: partition.id,
                index: first_index,
                error: e.to_string(),
            });
            return Ok(summary);
        }
    }

    for index in indices {
        match fetch_with_retry(&*ctx.fetcher, index, &ctx.retry.policy()).await {
            FetchOutcome::Success(records) => {
                sink.append(index, &records)?;
                summary.written += 1;
                ctx.emit(Event::LedgerWritten {
                    index,
                    partition_id: partition.id,
                    transactions: records.len(),
                });
            }
            FetchOutcome::Unavailable(e) => {
                tracing::warn!(
                    partition_id = partition.id,
                    ledger_index = index.get(),
                    error = %e,
                    "Ledger unavailable, skipping"
                );
                summary.skipped += 1;
                ctx.emit(Event::LedgerSkipped {
                    index,
                    partition_id: partition.id,
                    error: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        partition_id = partition.id,
        written = summary.written,
        skipped = summary.skipped,
        "Partition complete"
    );
    ctx.emit(Event::PartitionComplete {
        partition_id: partition.id,
        written: summary.written,
        skipped: summary.skipped,
    });

    Ok(summary)
}
