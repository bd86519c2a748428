/// Per-channel attack/decay filter.
///
/// A rising level is taken immediately; a falling one decays geometrically
/// by `decay` per frame. Levels always stay in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalSmoother {
    levels: Vec<f32>,
    decay: f32,
    release_floor: f32,
}

impl TemporalSmoother {
    pub fn new(channels: usize, decay: f32) -> Self {
        Self {
            levels: vec![0.0; channels],
            decay: decay.clamp(0.0, 1.0),
            release_floor: 0.0,
        }
    }

    /// Decaying levels below `release_floor` snap to zero instead of
    /// lingering as a faint glow.
    pub fn with_release_floor(mut self, release_floor: f32) -> Self {
        self.release_floor = release_floor.max(0.0);
        self
    }

    /// Advances one frame. Channels missing from `raw` count as silent.
    pub fn update(&mut self, raw: &[f32]) -> &[f32] {
        for (index, level) in self.levels.iter_mut().enumerate() {
            let incoming = raw.get(index).copied().unwrap_or(0.0);
            let incoming = if incoming.is_nan() {
                0.0
            } else {
                incoming.clamp(0.0, 1.0)
            };

            *level = if incoming >= *level {
                incoming
            } else {
                let decayed = *level * self.decay;
                if decayed < self.release_floor {
                    0.0
                } else {
                    decayed
                }
            };
        }
        &self.levels
    }

    pub fn levels(&self) -> &[f32] {
        &self.levels
    }

    pub fn channels(&self) -> usize {
        self.levels.len()
    }

    pub fn reset(&mut self) {
        self.levels.iter_mut().for_each(|level| *level = 0.0);
    }

    /// Changes the channel count. All state is cleared.
    pub fn resize(&mut self, channels: usize) {
        self.levels = vec![0.0; channels];
    }
}
