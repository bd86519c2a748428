use std::collections::VecDeque;

use tracing::trace;

/// Onset gate over block energies (see [`crate::Spectrum::energy`]).
///
/// Each admitted energy joins a short history; a block passes when its
/// energy exceeds `sensitivity` times the history mean (the history includes
/// the block itself). With a history of two and a sensitivity of one this
/// passes exactly the blocks that are louder than their predecessor.
#[derive(Debug, Clone)]
pub struct EnergyGate {
    history: VecDeque<f32>,
    capacity: usize,
    sensitivity: f32,
}

impl EnergyGate {
    pub fn new(capacity: usize, sensitivity: f32) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            sensitivity,
        }
    }

    /// Records `energy` and reports whether the block should be displayed.
    pub fn admit(&mut self, energy: f32) -> bool {
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(energy);

        let average = self.history.iter().sum::<f32>() / self.history.len() as f32;
        let passed = energy > self.sensitivity * average;
        trace!(energy, average, passed, "energy gate");
        passed
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}
