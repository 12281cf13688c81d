//! Charge processing.
//!
//! A charge runs through four steps in a fixed order:
//! - probe the gateway (failures only mark the charge as degraded)
//! - roll for an injected lock timeout (the only fatal outcome)
//! - append a retry record when degraded or forced to
//! - hand back a fresh transaction id
//!
//! Also supports an async stream of charges.

use std::sync::Arc;
use std::time::Duration;

use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::ChargeRequest;
use crate::config::FaultConfig;
use crate::random::RngSource;
use crate::store::RecordStore;

mod error;
pub use error::{ChargeError, GatewayError, LockTimeout};

mod gateway;
pub use gateway::{GatewayProbe, GatewaySimulator, StaticGateway, TcpGateway};

mod injector;
pub use injector::{DEFAULT_SPIN_ITERATIONS, Delay, FailureInjector, NoDelay, SpinDelay};

mod retry;
pub use retry::{RetryOutcome, RetryRecordStore};

mod txid;
pub use txid::{TRANSACTION_ID_LEN, TransactionId, TransactionIdGenerator};

/// The charge orchestrator.
///
/// Holds no per-call state, so one processor can serve concurrent charges;
/// the record store is the only shared resource.
#[derive(Debug)]
pub struct ChargeProcessor {
    gateway: GatewaySimulator,
    injector: FailureInjector,
    retry: RetryRecordStore,
    ids: TransactionIdGenerator,
}

/// Public API
impl ChargeProcessor {
    pub fn new(
        gateway: GatewaySimulator,
        injector: FailureInjector,
        retry: RetryRecordStore,
        ids: TransactionIdGenerator,
    ) -> Self {
        Self {
            gateway,
            injector,
            retry,
            ids,
        }
    }

    /// Processor with independently seeded random streams and the busy-wait delay.
    pub fn with_defaults(
        probe: Box<dyn GatewayProbe>,
        probe_timeout: Duration,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self::new(
            GatewaySimulator::new(probe, probe_timeout),
            FailureInjector::new(
                Box::new(RngSource::from_entropy()),
                Box::new(SpinDelay::default()),
            ),
            RetryRecordStore::new(store),
            TransactionIdGenerator::new(Box::new(RngSource::from_entropy())),
        )
    }

    /// The store retry records are appended to.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        self.retry.store()
    }

    /// Charge a single request.
    pub async fn charge(
        &self,
        req: &ChargeRequest,
        cfg: &FaultConfig,
    ) -> Result<TransactionId, ChargeError> {
        let probe_degraded = self.gateway.probe(req).await;

        // aborts before anything is persisted
        self.injector.maybe_abort(cfg.lock_timeout_probability)?;

        let degraded = probe_degraded || cfg.forced_degraded;
        let outcome = self.retry.record_if_degraded(req, degraded).await?;
        debug!(probe_degraded, forced = cfg.forced_degraded, ?outcome, "charge checked");

        Ok(self.ids.generate())
    }

    /// Run every charge of the stream in order, keyed by the caller's tag.
    ///
    /// A failed charge does not stop the stream.
    pub async fn run<K>(
        &self,
        mut stream: impl Stream<Item = (K, ChargeRequest)> + Unpin,
        cfg: &FaultConfig,
    ) -> Vec<(K, Result<TransactionId, ChargeError>)> {
        let mut outcomes = Vec::new();
        while let Some((key, req)) = stream.next().await {
            let result = self.charge(&req, cfg).await;
            if let Err(e) = &result {
                warn!(reason = %e, "charge failed");
            }
            outcomes.push((key, result));
        }
        outcomes
    }
}
