use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

/// A track checkpoint as seen by the race state machine.
///
/// Checkpoints are owned by the track layout and shared with the race, so
/// re-arming goes through `&self`.
pub trait Checkpoint: Send + Sync {
    /// Position of this checkpoint in the lap sequence (0-based).
    fn index(&self) -> u32;

    /// Make the checkpoint triggerable again for the next lap.
    fn reset_arm(&self);
}

impl std::fmt::Debug for dyn Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checkpoint")
            .field("index", &self.index())
            .finish()
    }
}

/// Checkpoint trigger that fires at most once per lap.
#[derive(Debug)]
pub struct TrackCheckpoint {
    index: u32,
    armed: AtomicBool,
}

impl TrackCheckpoint {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            armed: AtomicBool::new(true),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Relaxed)
    }

    /// Consume the arm. Returns `true` only for the first trigger since the last reset.
    pub fn try_trigger(&self) -> bool {
        self.armed.swap(false, Ordering::Relaxed)
    }
}

impl Checkpoint for TrackCheckpoint {
    fn index(&self) -> u32 {
        self.index
    }

    fn reset_arm(&self) {
        self.armed.store(true, Ordering::Relaxed);
    }
}

/// Check that checkpoint indices are unique and form the sequence `0..N-1`.
///
/// Returns one message per problem; an empty list means the layout is usable.
pub fn validate_checkpoint_indices(indices: &[u32]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();

    for &index in indices {
        if !seen.insert(index) {
            problems.push(format!("checkpoint index {index} is used more than once"));
        }
    }

    let count = indices.len() as u32;
    for &index in indices {
        if index >= count {
            problems.push(format!(
                "checkpoint index {index} is out of range for {count} checkpoints"
            ));
        }
    }
    for expected in 0..count {
        if !seen.contains(&expected) {
            problems.push(format!("checkpoint index {expected} is missing"));
        }
    }

    problems
}
