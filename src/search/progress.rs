//! Progress reporting and cooperative cancellation.
//!
//! Both solvers are single-threaded and sequential; the contract here is
//! only that they report progress and honor cancellation between discrete
//! rounds. In-flight rounds always complete.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Progress callback: cumulative states explored plus a human label.
/// Invocations are monotonic in states explored and stop before the final
/// result is produced.
pub type ProgressFn<'a> = dyn FnMut(u64, &str) + 'a;

/// Shared flag a caller flips to stop a running search between rounds.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Best-effort: the solver finishes its current
    /// round before noticing.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Per-search pacing state threaded through a solver: reports progress,
/// checks the cancel flag, and yields the thread once the configured
/// interval has elapsed so a host scheduler gets a turn.
pub(crate) struct Pacer<'p, 'f> {
    progress: Option<&'p mut ProgressFn<'f>>,
    cancel: Option<CancelToken>,
    yield_interval: Duration,
    last_break: Instant,
}

impl<'p, 'f> Pacer<'p, 'f> {
    pub fn new(
        progress: Option<&'p mut ProgressFn<'f>>,
        cancel: Option<CancelToken>,
        yield_interval: Duration,
    ) -> Self {
        Self {
            progress,
            cancel,
            yield_interval,
            last_break: Instant::now(),
        }
    }

    pub fn report(&mut self, states_explored: u64, label: &str) {
        if let Some(progress) = self.progress.as_mut() {
            progress(states_explored, label);
        }
    }

    pub fn interrupted(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancelToken::is_cancelled)
    }

    /// Cooperative suspension point: yields the thread once per interval.
    pub fn breathe(&mut self) {
        if self.last_break.elapsed() >= self.yield_interval {
            thread::yield_now();
            self.last_break = Instant::now();
        }
    }
}
