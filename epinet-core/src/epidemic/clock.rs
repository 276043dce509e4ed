//! Simulated time and random number generation for epidemic runs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Outcome of trying to move the clock forward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockAdvance {
    /// Clock moved to the contained time
    Advanced(f64),
    /// Candidate time lies past the horizon; the clock did not move
    PastHorizon(f64),
}

/// Continuous simulation clock bounded by a horizon.
///
/// Time starts at zero, only moves forward, and never exceeds the horizon.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    now: f64,
    horizon: f64,
}

impl SimulationClock {
    /// Creates a clock at time zero with the given horizon.
    pub fn new(horizon: f64) -> Self {
        Self { now: 0.0, horizon }
    }

    /// Returns current simulated time.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Returns the horizon.
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Advances by `delay` unless that would pass the horizon.
    ///
    /// Landing exactly on the horizon is allowed. Negative or NaN delays
    /// leave the clock untouched and report `PastHorizon`.
    pub fn try_advance(&mut self, delay: f64) -> ClockAdvance {
        let candidate = self.now + delay;
        if delay.is_nan() || delay < 0.0 || candidate > self.horizon {
            return ClockAdvance::PastHorizon(candidate);
        }
        self.now = candidate;
        ClockAdvance::Advanced(candidate)
    }
}

/// Seeded random source for one simulation run.
///
/// Uses ChaCha8 so that a run is fully determined by its seed,
/// independent of platform and thread scheduling.
#[derive(Debug, Clone)]
pub struct SimulationRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SimulationRng {
    /// Creates deterministic RNG from seed value.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates an RNG from a seed drawn from the thread-local generator.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::rng().random())
    }

    /// Returns the seed used for this RNG.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generates a uniform number in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Generates a uniform index in `[0, len)`. Returns `None` for `len == 0`.
    pub fn index_below(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            None
        } else {
            Some(self.rng.random_range(0..len))
        }
    }

    /// Draws an exponential waiting time with the given rate.
    ///
    /// Inverse CDF: `-ln(1 - U) / rate`. Since `U < 1` the logarithm is finite.
    pub fn exponential(&mut self, rate: f64) -> f64 {
        -(1.0 - self.unit()).ln() / rate
    }
}
