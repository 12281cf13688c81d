use std::hint::black_box;

use tracing::warn;

use super::LockTimeout;
use crate::random::UniformSource;

/// Square roots computed by [`SpinDelay::default`].
pub const DEFAULT_SPIN_ITERATIONS: u64 = 500_000;

/// Wait performed before an injected lock timeout is raised.
pub trait Delay: Send + Sync {
    fn wait(&self);
}

/// Busy wait burning a fixed amount of CPU, standing in for lock contention.
///
/// Blocks the calling thread; it is not a suspend point.
#[derive(Debug, Clone, Copy)]
pub struct SpinDelay {
    iterations: u64,
}

impl SpinDelay {
    pub fn new(iterations: u64) -> Self {
        Self { iterations }
    }
}

impl Default for SpinDelay {
    fn default() -> Self {
        Self::new(DEFAULT_SPIN_ITERATIONS)
    }
}

impl Delay for SpinDelay {
    fn wait(&self) {
        for i in 0..self.iterations {
            black_box((i as f64).sqrt());
        }
    }
}

/// No wait at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl Delay for NoDelay {
    fn wait(&self) {}
}

/// Probabilistically aborts a charge with [`LockTimeout`].
pub struct FailureInjector {
    draws: Box<dyn UniformSource>,
    delay: Box<dyn Delay>,
}

impl FailureInjector {
    pub fn new(draws: Box<dyn UniformSource>, delay: Box<dyn Delay>) -> Self {
        Self { draws, delay }
    }

    /// Draw once; if the draw falls under `probability`, wait and fail.
    ///
    /// A draw is taken on every call, even with `probability == 0`, so the
    /// stream advances at the same pace regardless of configuration.
    pub fn maybe_abort(&self, probability: f64) -> Result<(), LockTimeout> {
        let draw = self.draws.next_unit();
        if probability > 0.0 && draw < probability {
            self.delay.wait();
            warn!(probability, draw, "injecting lock timeout");
            return Err(LockTimeout);
        }
        Ok(())
    }
}

impl std::fmt::Debug for FailureInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureInjector").finish_non_exhaustive()
    }
}
