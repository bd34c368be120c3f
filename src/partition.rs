//! Range partitioning — splits the requested ledger range into disjoint
//! contiguous sub-ranges, one per worker.

use crate::error::{Error, Result};
use crate::types::LedgerIndex;
use serde::{Deserialize, Serialize};

/// One contiguous, inclusive sub-range of ledger indices owned by a single
/// worker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    /// Partition identifier, 0-based and ascending with the range
    pub id: usize,
    /// First ledger index, inclusive
    pub start: LedgerIndex,
    /// Last ledger index, inclusive
    pub end: LedgerIndex,
}

impl Partition {
    /// Number of ledger indices in the partition
    pub fn len(&self) -> u64 {
        if self.end < self.start {
            0
        } else {
            u64::from(self.end.get() - self.start.get()) + 1
        }
    }

    /// True when the partition contains no indices
    ///
    /// Happens when the worker count exceeds the span of the requested
    /// range: the quotient is zero, so every partition except the last
    /// degenerates to an empty sub-range.
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Iterate the partition's indices in strictly ascending order
    pub fn indices(&self) -> impl Iterator<Item = LedgerIndex> + use<> {
        (self.start.get()..=self.end.get()).map(LedgerIndex::new)
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "partition {} [{}, {}]", self.id, self.start, self.end)
    }
}

/// Split `[start, end]` into `worker_count` contiguous, disjoint partitions.
///
/// Each of the first `worker_count - 1` partitions owns `span =
/// floor((end - start) / worker_count)` indices starting at
/// `start + id * span`; the last partition runs through `end`, absorbing the
/// remainder of the integer division. The union of all partitions is exactly
/// `[start, end]` with no index dropped or duplicated.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] when `end < start` and
/// [`Error::InvalidWorkerCount`] when `worker_count` is zero. Both surface
/// before any worker launches or any I/O begins.
pub fn partition_range(
    start: LedgerIndex,
    end: LedgerIndex,
    worker_count: usize,
) -> Result<Vec<Partition>> {
    if end < start {
        return Err(Error::InvalidRange {
            start: start.get(),
            end: end.get(),
        });
    }
    if worker_count < 1 {
        return Err(Error::InvalidWorkerCount(worker_count));
    }

    let span = (end.get() - start.get()) / worker_count as u32;
    let mut partitions = Vec::with_capacity(worker_count);

    for id in 0..worker_count {
        let first = start.get() + id as u32 * span;
        let last = if id == worker_count - 1 {
            end.get()
        } else {
            first + span - 1
        };
        partitions.push(Partition {
            id,
            start: LedgerIndex::new(first),
            end: LedgerIndex::new(last),
        });
    }

    Ok(partitions)
}
