//! Parallel checking of one search depth.
//!
//! Candidates within a depth are independent, so the frontier can be split
//! across threads. Determinism is preserved with a per-depth barrier: the
//! coordinator waits for every chunk before the next depth starts, and the
//! lowest matching frontier index wins, exactly as in a sequential scan.
//!
//! # Architecture
//!
//! - A **coordinator** that spawns scoped worker threads and merges results
//! - **Workers** that each check one contiguous chunk of the frontier
//! - A **channel** carrying finished chunks to the coordinator
//! - **Shared state** (the lowest match so far) for early exit without
//!   channel overhead
//!
//! # Example
//!
//! ```ignore
//! use matsynth::search::parallel::{ParallelConfig, check_frontier_parallel};
//!
//! let config = ParallelConfig::default().with_workers(4);
//! let outcome = check_frontier_parallel(&frontier, &cache, &examples, deadline, usize::MAX, &config);
//! ```

pub mod channel;
pub mod config;
pub mod coordinator;

pub use config::ParallelConfig;
pub use coordinator::check_frontier_parallel;
