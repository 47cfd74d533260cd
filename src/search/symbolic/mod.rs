//! Constant-assisted synthesis
//!
//! When structural enumeration finds nothing, the search falls back to
//! skeletons with an unresolved constant slot and asks Z3 for its value:
//! 1. Build skeletons around shallow enumerated trees (`sketch`)
//! 2. Evaluate each skeleton over symbolic matrices
//! 3. Assert per-entry equality with every expected output
//! 4. Read the slot entries off a model and verify the closed program

pub mod sketch;
pub mod synthesis;

pub use sketch::{SkeletonForm, build_skeletons};
pub use synthesis::{ConstantSolver, SolverError};
