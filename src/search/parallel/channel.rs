//! Result channel and shared match index for frontier workers.

use crate::search::synthesis::CheckOutcome;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Message sent from workers to the coordinator.
///
/// Matches travel through [`SharedMatch`]; the channel only carries results.
#[derive(Debug)]
pub enum WorkerMessage {
    /// Worker has finished its chunk.
    Finished {
        worker_id: usize,
        range: Range<usize>,
        outcome: CheckOutcome,
    },
}

/// Lowest matching frontier index found by any worker.
///
/// Workers stop as soon as every index left in their chunk is above it, since
/// the sequential order would never reach those candidates.
#[derive(Debug)]
pub struct SharedMatch {
    lowest: AtomicUsize,
}

impl Default for SharedMatch {
    fn default() -> Self {
        Self {
            lowest: AtomicUsize::new(usize::MAX),
        }
    }
}

impl SharedMatch {
    /// Record a match. Returns true if it is the lowest so far.
    pub fn offer(&self, index: usize) -> bool {
        self.lowest.fetch_min(index, Ordering::SeqCst) > index
    }

    /// Whether a match below `index` is already known.
    pub fn supersedes(&self, index: usize) -> bool {
        self.lowest.load(Ordering::SeqCst) < index
    }

    /// The lowest match, if any.
    pub fn current(&self) -> Option<usize> {
        match self.lowest.load(Ordering::SeqCst) {
            usize::MAX => None,
            index => Some(index),
        }
    }
}

/// Channel endpoints for a worker.
pub struct WorkerChannels {
    /// Send messages to coordinator.
    pub to_coordinator: Sender<WorkerMessage>,
    /// Shared state for fast early exit.
    pub shared: Arc<SharedMatch>,
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Receive messages from workers.
    pub from_workers: Receiver<WorkerMessage>,
    /// Shared state.
    pub shared: Arc<SharedMatch>,
}

/// Create channels for the given number of workers.
pub fn create_channels(num_workers: usize) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    let shared = Arc::new(SharedMatch::default());

    // Unbounded channel from workers to coordinator (workers shouldn't block)
    let (worker_tx, coordinator_rx) = unbounded();

    let worker_channels = (0..num_workers)
        .map(|_| WorkerChannels {
            to_coordinator: worker_tx.clone(),
            shared: Arc::clone(&shared),
        })
        .collect();

    let coordinator = CoordinatorChannels {
        from_workers: coordinator_rx,
        shared,
    };

    (coordinator, worker_channels)
}
