//! Caller-facing error types

use std::time::Duration;
use thiserror::Error;

pub use crate::matrix::MatrixError;
pub use crate::parser::ParseError;
pub use crate::search::examples::ExampleError;
pub use crate::search::symbolic::SolverError;
pub use crate::semantics::EvalError;

/// The only failure `synthesize` reports.
///
/// Search-internal failures (ill-typed candidates, unsolvable skeletons) never
/// surface; this only says the budget ran out or the space was exhausted.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "cannot synthesize a program: {reason} (depth reached {depth_reached}, \
     {candidates_evaluated} candidates evaluated in {elapsed:.2?})"
)]
pub struct CannotSynthesize {
    pub reason: String,
    pub depth_reached: usize,
    pub elapsed: Duration,
    pub candidates_evaluated: u64,
}
