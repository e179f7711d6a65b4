//! Progress reporting for benchmark runs. The engine emits one event when a
//! planner starts and one per completed repetition (each `<stats>` marker on
//! the binary's output); a console layer consumes them via a sink.

use std::sync::Arc;

/// One progress update for a running benchmark.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Benchmark id the event belongs to (pools interleave several).
    pub benchmark: String,
    /// Display name of the planner currently running.
    pub planner: String,
    /// Position of that planner in this benchmark's planner order.
    pub planner_index: usize,
    pub planner_count: usize,
    /// Repetitions completed across all planners of this benchmark.
    pub completed: usize,
    /// Planners x steer functions x runs.
    pub total: usize,
}

/// Sink for progress events. Implementations may throttle; events are cheap
/// but frequent when the binary prints quickly.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
