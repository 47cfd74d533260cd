//! SMT solver setup shared by constant solving

use std::time::Duration;
use z3::{Params, Solver};

/// Settings for one skeleton query
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Per-query limit; z3 answers `unknown` when it is hit
    pub timeout: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(2)),
        }
    }
}

impl SolverConfig {
    pub fn no_timeout() -> Self {
        Self { timeout: None }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    pub fn with_timeout_option(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

/// Fresh solver for the real-arithmetic obligations of one skeleton
pub fn create_solver_with_config(cfg: &SolverConfig) -> Solver {
    let solver = Solver::new();
    // z3 takes the timeout in milliseconds as a u32
    if let Some(timeout) = cfg.timeout {
        let mut params = Params::new();
        params.set_u32("timeout", timeout.as_millis().min(u32::MAX as u128) as u32);
        solver.set_params(&params);
    }
    solver
}
