//! Contiguous work partitioning for the batch worker pool

use std::ops::Range;

/// Split `0..len` into exactly `workers` contiguous ranges.
///
/// Sizes differ by at most one; the leading ranges take the remainder. When
/// `len < workers` the trailing ranges are empty. `workers == 0` is treated as
/// a single worker.
pub fn shard(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let base = len / workers;
    let extra = len % workers;

    let mut start = 0;
    (0..workers)
        .map(|index| {
            let size = base + usize::from(index < extra);
            let range = start..start + size;
            start += size;
            range
        })
        .collect()
}
