//! Injectable randomness.
//!
//! Every consumer owns its own source so that draws on one stream never
//! shift the sequence seen by another.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform draws in `[0, 1)`.
pub trait UniformSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Raw random bytes.
pub trait ByteSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]);
}

/// A `rand` generator guarded for shared use.
#[derive(Debug)]
pub struct RngSource<R = StdRng> {
    rng: Mutex<R>,
}

impl<R> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl RngSource<StdRng> {
    /// Fresh generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send> UniformSource for RngSource<R> {
    fn next_unit(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random::<f64>()
    }
}

impl<R: RngCore + Send> ByteSource for RngSource<R> {
    fn fill(&self, buf: &mut [u8]) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.fill_bytes(buf);
    }
}
