//! Metrics and observability utilities
//!
//! Solver and search metrics recorded through the `metrics` facade.
//! Nothing is exported unless the host application installs a recorder.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all scasplens metrics
pub const METRICS_PREFIX: &str = "scasplens";

/// Buckets for solver latency (a single s(CASP) run, in seconds)
pub const SOLVER_BUCKETS: &[f64] = &[
    0.010,  // 10ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
    60.00,  // 60s - default deadline
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Solver metrics
    describe_counter!(
        format!("{}_solver_invocations_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of solver process invocations"
    );

    describe_histogram!(
        format!("{}_solver_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Solver process wall-clock time in seconds"
    );

    // Parser metrics
    describe_counter!(
        format!("{}_responses_parsed_total", METRICS_PREFIX),
        Unit::Count,
        "Total solver responses parsed"
    );

    // Search metrics
    describe_counter!(
        format!("{}_relevance_searches_total", METRICS_PREFIX),
        Unit::Count,
        "Total relevance searches"
    );

    describe_histogram!(
        format!("{}_relevance_probes", METRICS_PREFIX),
        Unit::Count,
        "Solver probes issued per relevance search"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record one solver invocation
pub struct SolverMetrics {
    start: Instant,
    solver: String,
}

impl SolverMetrics {
    /// Start tracking an invocation
    pub fn start(solver: &str) -> Self {
        Self {
            start: Instant::now(),
            solver: solver.to_string(),
        }
    }

    /// Record invocation completion
    pub fn finish(self, outcome: &str) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_solver_invocations_total", METRICS_PREFIX),
            "solver" => self.solver.clone(),
            "outcome" => outcome.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_solver_duration_seconds", METRICS_PREFIX),
            "solver" => self.solver
        )
        .record(duration);
    }
}

/// Helper to record a parsed response
pub fn record_response(result: &str, answers: usize) {
    counter!(
        format!("{}_responses_parsed_total", METRICS_PREFIX),
        "result" => result.to_string(),
        "answers" => answers.min(10).to_string()
    )
    .increment(1);
}

/// Helper to record a finished relevance search
pub fn record_search(probes: usize, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_relevance_searches_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(format!("{}_relevance_probes", METRICS_PREFIX)).record(probes as f64);
}
