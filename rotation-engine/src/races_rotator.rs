//! Race batching: which races share the next sail ordering.

use std::collections::VecDeque;

use crate::config::RotationStyle;
use crate::error::{Result, RotationError};

pub trait RacesRotator<T> {
    /// The next batch to assign. Empty once every queue is exhausted.
    fn next_races(&mut self, races_per_set: usize) -> Vec<T>;
}

/// Build the rotator for `style` over per-division race queues.
pub fn races_rotator<T: 'static>(
    style: RotationStyle,
    groups: Vec<Vec<T>>,
) -> Result<Box<dyn RacesRotator<T>>> {
    match style {
        RotationStyle::Similar => Ok(Box::new(SimilarStyle::new(groups))),
        RotationStyle::Navy => Ok(Box::new(NavyStyle::new(groups))),
        RotationStyle::Franny => Err(RotationError::Unsupported {
            what: "races rotation style",
            value: style.to_string(),
        }),
    }
}

// ─── Similar ──────────────────────────────────────────────────────────────────

/// One set holds the next block of races from every division at once.
pub struct SimilarStyle<T> {
    queues: Vec<VecDeque<T>>,
}

impl<T> SimilarStyle<T> {
    pub fn new(groups: Vec<Vec<T>>) -> Self {
        Self {
            queues: groups.into_iter().map(VecDeque::from).collect(),
        }
    }
}

impl<T> RacesRotator<T> for SimilarStyle<T> {
    fn next_races(&mut self, races_per_set: usize) -> Vec<T> {
        let mut batch = Vec::new();
        for queue in &mut self.queues {
            let take = races_per_set.min(queue.len());
            batch.extend(queue.drain(..take));
        }
        batch
    }
}

// ─── Navy ─────────────────────────────────────────────────────────────────────

/// One set holds a block from a single division; divisions take turns round-robin.
pub struct NavyStyle<T> {
    queues: VecDeque<VecDeque<T>>,
}

impl<T> NavyStyle<T> {
    pub fn new(groups: Vec<Vec<T>>) -> Self {
        Self {
            queues: groups.into_iter().map(VecDeque::from).collect(),
        }
    }
}

impl<T> RacesRotator<T> for NavyStyle<T> {
    fn next_races(&mut self, races_per_set: usize) -> Vec<T> {
        while let Some(mut queue) = self.queues.pop_front() {
            if queue.is_empty() {
                continue;
            }
            let take = races_per_set.min(queue.len());
            let batch: Vec<T> = queue.drain(..take).collect();
            if !queue.is_empty() {
                self.queues.push_back(queue);
            }
            return batch;
        }
        Vec::new()
    }
}
