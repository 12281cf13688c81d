//! Error types for charge processing.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::store::StoreError;

/// Injected fatal failure standing in for a contended database lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Lock wait timeout exceeded; try restarting transaction")]
pub struct LockTimeout;

/// Top-level error returned by [`ChargeProcessor::charge`](super::ChargeProcessor::charge).
#[derive(Debug, Error)]
pub enum ChargeError {
    #[error(transparent)]
    LockTimeout(#[from] LockTimeout),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of the external dependency probe.
///
/// Never leaves the gateway simulator; it only marks the charge as degraded.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway unreachable: {0}")]
    Unreachable(#[from] io::Error),

    #[error("gateway did not answer within {0:?}")]
    Timeout(Duration),

    #[error("gateway rejected the call: {0}")]
    Rejected(String),
}
