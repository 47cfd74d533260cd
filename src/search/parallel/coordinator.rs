//! Coordinator that checks one frontier with scoped worker threads.

use crate::matrix::ConcreteMatrix;
use crate::search::enumerate::Frontier;
use crate::search::examples::ExampleSet;
use crate::search::parallel::channel::{
    CoordinatorChannels, WorkerChannels, WorkerMessage, create_channels,
};
use crate::search::parallel::config::ParallelConfig;
use crate::search::synthesis::{CheckOutcome, check_range};
use std::ops::Range;
use std::time::Instant;
use tracing::{debug, trace};

/// What every worker checks its chunk against
struct Task<'a> {
    frontier: &'a Frontier,
    cache: &'a [Vec<ConcreteMatrix>],
    examples: &'a ExampleSet,
    deadline: Option<Instant>,
    store_limit: usize,
}

/// Check a whole frontier in parallel.
///
/// The frontier is split into contiguous chunks, one per worker. The result
/// is the one a sequential scan would produce: the lowest matching index wins,
/// and the kept candidates are concatenated in frontier order.
pub fn check_frontier_parallel(
    frontier: &Frontier,
    cache: &[Vec<ConcreteMatrix>],
    examples: &ExampleSet,
    deadline: Option<Instant>,
    store_limit: usize,
    config: &ParallelConfig,
) -> CheckOutcome {
    let chunks = config.chunks(frontier.len());
    debug!(
        candidates = frontier.len(),
        workers = chunks.len(),
        "checking frontier in parallel"
    );
    let (coordinator_channels, worker_channels) = create_channels(chunks.len());
    let task = Task {
        frontier,
        cache,
        examples,
        deadline,
        store_limit,
    };

    std::thread::scope(|scope| {
        let task = &task;
        for ((worker_id, range), channels) in chunks.into_iter().enumerate().zip(worker_channels) {
            scope.spawn(move || run_worker(worker_id, range, task, channels));
        }
        run_coordinator(coordinator_channels, store_limit)
    })
}

/// Collect every worker's chunk and merge them in frontier order.
///
/// A match only counts if every chunk before it ran to completion: a
/// sequential scan that times out earlier never reaches it.
fn run_coordinator(channels: CoordinatorChannels, store_limit: usize) -> CheckOutcome {
    let mut finished: Vec<(Range<usize>, CheckOutcome)> = Vec::new();

    // Ends once every worker has dropped its sender
    for WorkerMessage::Finished {
        worker_id,
        range,
        outcome,
    } in channels.from_workers.iter()
    {
        trace!(
            worker_id,
            start = range.start,
            end = range.end,
            matched = ?outcome.matched,
            evaluated = outcome.statistics.candidates_evaluated,
            "worker finished"
        );
        finished.push((range, outcome));
    }

    finished.sort_by_key(|(range, _)| range.start);

    let first_timeout = finished
        .iter()
        .find(|(_, outcome)| outcome.timed_out)
        .map(|(range, _)| range.start);
    let matched = channels
        .shared
        .current()
        .filter(|&index| first_timeout.is_none_or(|start| index < start));
    if matched.is_none() && channels.shared.current().is_some() {
        debug!(?first_timeout, "match discarded, an earlier chunk timed out");
    }

    let mut merged = CheckOutcome {
        matched,
        timed_out: matched.is_none() && first_timeout.is_some(),
        ..Default::default()
    };
    for (_, outcome) in finished {
        merged.statistics.merge(&outcome.statistics);
        if merged.matched.is_some() || merged.timed_out || merged.truncated {
            continue;
        }
        if outcome.truncated || merged.kept.len() + outcome.kept.len() > store_limit {
            merged.truncated = true;
            merged.kept = Vec::new();
        } else {
            merged.kept.extend(outcome.kept);
        }
    }
    merged.statistics.nodes_materialized = merged.kept.len() as u64;
    merged
}

/// Worker function that checks one chunk of the frontier.
fn run_worker(worker_id: usize, range: Range<usize>, task: &Task, channels: WorkerChannels) {
    let shared = &channels.shared;
    let outcome = check_range(
        task.frontier,
        range.clone(),
        task.cache,
        task.examples,
        task.deadline,
        task.store_limit,
        |index| shared.supersedes(index),
    );

    if let Some(index) = outcome.matched {
        shared.offer(index);
    }

    channels
        .to_coordinator
        .send(WorkerMessage::Finished {
            worker_id,
            range,
            outcome,
        })
        .ok();
}
