//! Non-blocking alert dispatch.
//!
//! `notify` runs on the frame loop and must return immediately. Each cue is
//! handed to the tokio blocking pool; playback outcome is logged there and
//! never reaches the caller.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::runtime::Handle;

use crate::config::AlertConfig;
use crate::detector::ClosureState;
use crate::ports::CuePlayer;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound on cues queued or playing at once, coalescing or not. Keeps a
/// player slower than the frame rate from piling up blocking tasks.
pub const MAX_IN_FLIGHT_CUES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    /// Not alerting this frame.
    Idle,
    /// A cue was handed off.
    Dispatched,
    /// Alerting, but no cue was issued: the previous one is still playing,
    /// or `MAX_IN_FLIGHT_CUES` are already queued.
    Coalesced,
}

#[derive(Debug, Default)]
struct Counters {
    in_flight: AtomicUsize,
    issued: AtomicU64,
    coalesced: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchStats {
    pub issued: u64,
    pub coalesced: u64,
    pub completed: u64,
    pub failed: u64,
    pub in_flight: usize,
}

impl DispatchStats {
    /// Counts accumulated since `baseline` was taken. `in_flight` stays the
    /// current value.
    pub fn since(&self, baseline: &DispatchStats) -> DispatchStats {
        DispatchStats {
            issued: self.issued.saturating_sub(baseline.issued),
            coalesced: self.coalesced.saturating_sub(baseline.coalesced),
            completed: self.completed.saturating_sub(baseline.completed),
            failed: self.failed.saturating_sub(baseline.failed),
            in_flight: self.in_flight,
        }
    }
}

/// Decrements the in-flight count when the playback task ends, even by panic.
struct InFlightGuard(Arc<Counters>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct AlertDispatcher {
    player: Arc<dyn CuePlayer>,
    cue: Arc<str>,
    coalesce: bool,
    runtime: Handle,
    counters: Arc<Counters>,
}

impl AlertDispatcher {
    pub fn new(player: Arc<dyn CuePlayer>, config: &AlertConfig, runtime: Handle) -> Self {
        Self {
            player,
            cue: Arc::from(config.cue_identifier.as_str()),
            coalesce: config.coalesce,
            runtime,
            counters: Arc::new(Counters::default()),
        }
    }

    /// Called once per frame with the current closure state.
    pub fn notify(&self, state: &ClosureState) -> AlertOutcome {
        if !state.is_alerting() {
            return AlertOutcome::Idle;
        }

        let in_flight = self.counters.in_flight.load(Ordering::Acquire);
        if (self.coalesce && in_flight > 0) || in_flight >= MAX_IN_FLIGHT_CUES {
            self.counters.coalesced.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                closed_frames = state.consecutive_closed_frames,
                in_flight,
                "Cue still playing, coalescing alert"
            );
            return AlertOutcome::Coalesced;
        }

        self.counters.in_flight.fetch_add(1, Ordering::AcqRel);
        self.counters.issued.fetch_add(1, Ordering::Relaxed);

        let guard = InFlightGuard(self.counters.clone());
        let player = self.player.clone();
        let cue = self.cue.clone();
        let counters = self.counters.clone();

        // JoinHandle is dropped: fire-and-forget.
        self.runtime.spawn_blocking(move || {
            let _guard = guard;
            match player.play(&cue) {
                Ok(()) => {
                    counters.completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(error = %e, cue = %cue, "Failed to play alert sound");
                }
            }
        });

        AlertOutcome::Dispatched
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            issued: self.counters.issued.load(Ordering::Relaxed),
            coalesced: self.counters.coalesced.load(Ordering::Relaxed),
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            in_flight: self.counters.in_flight.load(Ordering::Acquire),
        }
    }

    /// Waits up to `timeout` for in-flight cues. Returns `true` if none remain.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.counters.in_flight.load(Ordering::Acquire) == 0 {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::Phase;
    use crate::ports::CueError;

    struct Silent;

    impl CuePlayer for Silent {
        fn play(&self, _cue: &str) -> Result<(), CueError> {
            Ok(())
        }
    }

    fn alerting() -> ClosureState {
        ClosureState {
            phase: Phase::Alerting,
            consecutive_closed_frames: 20,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn idle_states_do_not_dispatch() {
        let dispatcher =
            AlertDispatcher::new(Arc::new(Silent), &AlertConfig::default(), Handle::current());
        let closing = ClosureState {
            phase: Phase::Closing,
            consecutive_closed_frames: 5,
        };
        assert_eq!(dispatcher.notify(&ClosureState::default()), AlertOutcome::Idle);
        assert_eq!(dispatcher.notify(&closing), AlertOutcome::Idle);
        assert_eq!(dispatcher.stats().issued, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn alerting_dispatches_and_completes() {
        let dispatcher =
            AlertDispatcher::new(Arc::new(Silent), &AlertConfig::default(), Handle::current());
        assert_eq!(dispatcher.notify(&alerting()), AlertOutcome::Dispatched);
        assert!(dispatcher.drain(Duration::from_secs(2)).await);

        let stats = dispatcher.stats();
        assert_eq!(stats.issued, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.in_flight, 0);
    }

    #[test]
    fn since_subtracts_baseline_counts() {
        let baseline = DispatchStats {
            issued: 3,
            coalesced: 1,
            completed: 2,
            failed: 1,
            in_flight: 1,
        };
        let now = DispatchStats {
            issued: 5,
            coalesced: 1,
            completed: 4,
            failed: 1,
            in_flight: 0,
        };
        assert_eq!(
            now.since(&baseline),
            DispatchStats {
                issued: 2,
                coalesced: 0,
                completed: 2,
                failed: 0,
                in_flight: 0,
            }
        );
    }
}
