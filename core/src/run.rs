//! Run descriptor and lifecycle state machine

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::BenchmarkConfig;

/// Immutable description of one benchmark execution
///
/// Built once, at the instant the measurement window opens, and shared by
/// every worker behind an `Arc`. All workers therefore observe the same
/// deadline.
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    /// Root node path
    pub root_path: String,

    /// Prefix for sequential child creates (`<root>/node_`)
    pub child_prefix: String,

    /// Number of workers launched
    pub worker_count: usize,

    /// Measurement window
    pub duration: Duration,

    /// Extra time granted to stragglers
    pub drain_grace: Duration,

    /// Pause before the count query
    pub settle_pause: Duration,

    /// Window start
    pub started_at: Instant,
}

impl BenchmarkRun {
    /// Open a run now
    pub fn start(config: &BenchmarkConfig) -> Self {
        Self::starting_at(config, Instant::now())
    }

    /// Open a run with an explicit start instant
    pub fn starting_at(config: &BenchmarkConfig, started_at: Instant) -> Self {
        Self {
            root_path: config.root_path.clone(),
            child_prefix: config.child_prefix(),
            worker_count: config.worker_count,
            duration: config.duration,
            drain_grace: config.drain_grace,
            settle_pause: config.settle_pause,
            started_at,
        }
    }

    /// Time since the window opened
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether the window has closed
    ///
    /// A plain clock read; workers call this before every operation.
    pub fn deadline_passed(&self) -> bool {
        self.elapsed() >= self.duration
    }

    /// Instant the window closes
    ///
    /// Durations are bounded by config validation, so the sum is representable.
    pub fn deadline(&self) -> Instant {
        self.started_at + self.duration
    }

    /// Instant after which the pool stops waiting for workers
    pub fn drain_deadline(&self) -> Instant {
        self.deadline() + self.drain_grace
    }
}

/// Lifecycle of a run
///
/// Transitions are strictly sequential; there is no retry or rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Session open, nothing done yet
    NotStarted,
    /// Root node exists
    RootEnsured,
    /// Workers are issuing creates
    WorkersRunning,
    /// Waiting (bounded) for workers to finish
    Draining,
    /// Fixed pause before counting
    Settling,
    /// Count queried, result computed
    Aggregated,
    /// Session closed; terminal
    Closed,
}

impl RunState {
    /// The only state that may follow this one
    pub fn next(self) -> Option<RunState> {
        match self {
            RunState::NotStarted => Some(RunState::RootEnsured),
            RunState::RootEnsured => Some(RunState::WorkersRunning),
            RunState::WorkersRunning => Some(RunState::Draining),
            RunState::Draining => Some(RunState::Settling),
            RunState::Settling => Some(RunState::Aggregated),
            RunState::Aggregated => Some(RunState::Closed),
            RunState::Closed => None,
        }
    }

    /// Whether no further operation is valid
    pub fn is_terminal(self) -> bool {
        self == RunState::Closed
    }

    /// Short lowercase name used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            RunState::NotStarted => "not_started",
            RunState::RootEnsured => "root_ensured",
            RunState::WorkersRunning => "workers_running",
            RunState::Draining => "draining",
            RunState::Settling => "settling",
            RunState::Aggregated => "aggregated",
            RunState::Closed => "closed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered record of the states a run passed through
#[derive(Debug, Clone)]
pub struct RunTimeline {
    entries: Vec<(RunState, Instant)>,
}

impl RunTimeline {
    /// Start a timeline in `NotStarted`
    pub fn new() -> Self {
        Self {
            entries: vec![(RunState::NotStarted, Instant::now())],
        }
    }

    /// Current state
    pub fn current(&self) -> RunState {
        // never empty: `new` seeds NotStarted
        self.entries
            .last()
            .map(|(state, _)| *state)
            .unwrap_or(RunState::NotStarted)
    }

    /// Move to the next state, returning it
    ///
    /// Advancing past `Closed` is a no-op.
    pub fn advance(&mut self) -> RunState {
        let current = self.current();
        if current.is_terminal() {
            return current;
        }
        match current.next() {
            Some(next) => {
                self.entries.push((next, Instant::now()));
                tracing::debug!(from = %current, to = %next, "Run state transition");
                next
            }
            None => current,
        }
    }

    /// Instant a state was entered, if it was reached
    pub fn entered_at(&self, state: RunState) -> Option<Instant> {
        self.entries
            .iter()
            .find(|(s, _)| *s == state)
            .map(|(_, at)| *at)
    }

    /// States in the order they were entered
    pub fn states(&self) -> Vec<RunState> {
        self.entries.iter().map(|(state, _)| *state).collect()
    }
}

impl Default for RunTimeline {
    fn default() -> Self {
        Self::new()
    }
}
