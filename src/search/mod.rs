//! Search for matrix programs consistent with input/output examples
//!
//! This module provides the pieces of the synthesizer:
//! - Enumerate: bottom-up generation of expression trees in depth order
//! - Synthesis: example-driven checking of the enumerated frontier
//! - Parallel: multi-threaded checking of a single depth
//! - Symbolic: SMT-based recovery of constant matrices

pub mod config;
pub mod enumerate;
pub mod examples;
pub mod parallel;
pub mod result;
pub mod symbolic;
pub mod synthesis;

pub use config::{ConstantConfig, Grammar, SearchConfig};
pub use enumerate::{Enumerator, enumerate, enumerate_with};
pub use examples::{Example, ExampleSet};
pub use result::{SearchPhase, SearchStatistics};
pub use synthesis::{EnumerativeSynthesizer, synthesize};

use crate::error::CannotSynthesize;
use crate::ir::Expr;

/// Trait for synthesizers that find a program reproducing a set of examples
pub trait Synthesizer {
    /// Find a program mapping every example's inputs to its output
    ///
    /// # Arguments
    /// * `examples` - Validated examples, all with the same number of inputs
    ///
    /// # Returns
    /// The first program found, or the reason none was
    fn synthesize(&mut self, examples: &ExampleSet) -> Result<Expr, CannotSynthesize>;

    /// Get statistics from the most recent run
    fn statistics(&self) -> SearchStatistics;
}
