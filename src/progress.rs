//! Per-item progress reporting
//!
//! Advisory only: progress is logged after every processed Pokémon with the
//! elapsed time and a linear estimate of the time remaining.

use std::time::{Duration, Instant};

use tracing::info;

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Read from the local cache
    Cache,
    /// Fetched from the API (and written to the cache)
    Network,
}

/// Snapshot of progress after an item
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Items processed so far
    pub done: usize,
    /// Items in this run
    pub total: usize,
    /// Time since the run started
    pub elapsed: Duration,
    /// Estimated time until the run finishes, once at least one item is done
    pub remaining: Option<Duration>,
}

/// Tracks progress through the list
#[derive(Debug)]
pub struct Progress {
    total: usize,
    done: usize,
    started: Instant,
}

impl Progress {
    /// Starts tracking a run over `total` items
    pub fn new(total: usize) -> Self {
        Self {
            total,
            done: 0,
            started: Instant::now(),
        }
    }

    /// Records one finished item and logs the update
    pub fn advance(&mut self, name: &str, source: Source) -> ProgressUpdate {
        self.done += 1;
        let elapsed = self.started.elapsed();
        let update = ProgressUpdate {
            done: self.done,
            total: self.total,
            elapsed,
            remaining: estimate_remaining(elapsed, self.done, self.total),
        };

        info!(
            source = ?source,
            "Processed {}/{}: {} ({:.1}s elapsed, est. {:.1}s remaining)",
            update.done,
            update.total,
            name,
            elapsed.as_secs_f64(),
            update.remaining.unwrap_or_default().as_secs_f64()
        );

        update
    }
}

/// Linear estimate of the time left: average time per item so far, times items left
pub fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Option<Duration> {
    if done == 0 {
        return None;
    }
    let left = total.saturating_sub(done) as u32;
    Some(elapsed / done as u32 * left)
}
