//! Injectable randomness for the simulators.
//!
//! Every random decision in the core goes through [`DeltaSource`] so tests
//! can substitute a fixed sequence and replay identical runs.

/// Capability for drawing the random quantities the simulation needs.
pub trait DeltaSource {
    /// Uniform sample in `[lo, hi)`. Callers guarantee `lo <= hi`.
    fn uniform(&mut self, lo: f32, hi: f32) -> f32;

    /// Bernoulli trial with probability `p` (clamped to `[0, 1]`).
    fn chance(&mut self, p: f32) -> bool {
        if p <= 0.0 {
            return false;
        }
        self.uniform(0.0, 1.0) < p
    }

    /// Uniform index in `[0, len)`. Returns 0 for empty ranges.
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let idx = self.uniform(0.0, len as f32) as usize;
        idx.min(len - 1)
    }
}

/// Production source backed by `fastrand`, seedable for reproducible runs.
#[derive(Debug)]
pub struct FastrandSource {
    rng: fastrand::Rng,
}

impl FastrandSource {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl Default for FastrandSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DeltaSource for FastrandSource {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        lo + self.rng.f32() * (hi - lo)
    }
}

/// Test source replaying a fixed sequence of unit-interval samples.
///
/// Each stored value is interpreted as a fraction of the requested range,
/// so `0.0` maps to `lo` and values near `1.0` map to just under `hi`.
/// The sequence wraps around when exhausted.
#[derive(Debug)]
pub struct SequenceSource {
    samples: Vec<f32>,
    index: usize,
}

impl SequenceSource {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples, index: 0 }
    }

    /// Source that always returns the midpoint of the requested range.
    pub fn midpoint() -> Self {
        Self::new(vec![0.5])
    }
}

impl DeltaSource for SequenceSource {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if self.samples.is_empty() {
            return lo;
        }
        let frac = self.samples[self.index % self.samples.len()];
        self.index += 1;
        lo + frac.clamp(0.0, 1.0) * (hi - lo)
    }
}
