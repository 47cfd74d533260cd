//! Program semantics: evaluation of expression trees and solver setup

pub mod eval;
pub mod smt;

// Re-export main functionality
pub use eval::{EvalError, apply, evaluate};
pub use smt::{SolverConfig, create_solver_with_config};
