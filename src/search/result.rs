//! Search phases and statistics

use std::fmt;
use std::time::Duration;

/// Where a synthesis call is in its lifecycle.
///
/// `Found` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Searching { depth: usize },
    TimedOut { depth: usize },
    Exhausted { depth: usize },
    ConstantSolving,
    Found,
    Failed,
}

impl SearchPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchPhase::Found | SearchPhase::Failed)
    }
}

impl fmt::Display for SearchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchPhase::Idle => write!(f, "idle"),
            SearchPhase::Searching { depth } => write!(f, "searching(depth={})", depth),
            SearchPhase::TimedOut { depth } => write!(f, "timed-out(depth={})", depth),
            SearchPhase::Exhausted { depth } => write!(f, "exhausted(depth={})", depth),
            SearchPhase::ConstantSolving => write!(f, "constant-solving"),
            SearchPhase::Found => write!(f, "found"),
            SearchPhase::Failed => write!(f, "failed"),
        }
    }
}

/// Statistics from one synthesis call
#[derive(Debug, Clone, Default)]
pub struct SearchStatistics {
    /// Final phase of the call
    pub phase: SearchPhase,
    /// Total time spent
    pub elapsed_time: Duration,
    /// Deepest level whose candidates were checked
    pub depth_reached: usize,
    /// Number of candidate trees evaluated against the examples
    pub candidates_evaluated: u64,
    /// Candidates that failed to evaluate on some example
    pub candidates_rejected: u64,
    /// Candidates kept as subtrees for the next depth
    pub nodes_materialized: u64,
    /// Skeletons handed to the solver bridge
    pub skeletons_tried: u64,
    /// SMT queries made
    pub solver_queries: u64,
    /// SMT queries that produced a model
    pub solver_sat: u64,
}

impl SearchStatistics {
    /// Fraction of evaluated candidates that were ill-typed (0.0 to 1.0)
    pub fn rejection_rate(&self) -> f64 {
        if self.candidates_evaluated == 0 {
            0.0
        } else {
            self.candidates_rejected as f64 / self.candidates_evaluated as f64
        }
    }

    /// Get candidates evaluated per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.candidates_evaluated as f64 / secs
        }
    }

    /// Fold a worker's counters into these
    pub fn merge(&mut self, other: &SearchStatistics) {
        self.candidates_evaluated += other.candidates_evaluated;
        self.candidates_rejected += other.candidates_rejected;
        self.nodes_materialized += other.nodes_materialized;
        self.skeletons_tried += other.skeletons_tried;
        self.solver_queries += other.solver_queries;
        self.solver_sat += other.solver_sat;
    }

    /// Format statistics as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!("Outcome: {}\n", self.phase));
        s.push_str(&format!("Time: {:.2?}\n", self.elapsed_time));
        s.push_str(&format!("Depth reached: {}\n", self.depth_reached));
        s.push_str(&format!(
            "Candidates evaluated: {}\n",
            self.candidates_evaluated
        ));
        s.push_str(&format!(
            "Rejection rate: {:.2}%\n",
            self.rejection_rate() * 100.0
        ));
        s.push_str(&format!(
            "Throughput: {:.0} candidates/sec\n",
            self.throughput()
        ));

        if self.skeletons_tried > 0 {
            s.push_str(&format!("Skeletons tried: {}\n", self.skeletons_tried));
            s.push_str(&format!(
                "SMT queries: {} ({} satisfiable)\n",
                self.solver_queries, self.solver_sat
            ));
        }

        s
    }
}
