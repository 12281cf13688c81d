use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{info, warn};

use super::GatewayError;
use crate::ChargeRequest;
use crate::card::{classify, masked_suffix};

/// The external dependency the simulator probes.
#[async_trait]
pub trait GatewayProbe: Send + Sync {
    async fn call(&self) -> Result<(), GatewayError>;
}

/// Stand-in gateway with a fixed answer.
#[derive(Debug, Clone)]
pub struct StaticGateway {
    failure: Option<String>,
    latency: Duration,
}

impl StaticGateway {
    pub fn healthy() -> Self {
        Self {
            failure: None,
            latency: Duration::ZERO,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            latency: Duration::ZERO,
        }
    }

    /// Delay every answer by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl GatewayProbe for StaticGateway {
    async fn call(&self) -> Result<(), GatewayError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        match &self.failure {
            Some(reason) => Err(GatewayError::Rejected(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Probe that opens a TCP connection to `addr` and drops it.
#[derive(Debug, Clone)]
pub struct TcpGateway {
    addr: String,
}

impl TcpGateway {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl GatewayProbe for TcpGateway {
    async fn call(&self) -> Result<(), GatewayError> {
        TcpStream::connect(self.addr.as_str()).await?;
        Ok(())
    }
}

/// Best-effort probe of the gateway, bounded by `timeout`.
pub struct GatewaySimulator {
    probe: Box<dyn GatewayProbe>,
    timeout: Duration,
}

impl GatewaySimulator {
    pub fn new(probe: Box<dyn GatewayProbe>, timeout: Duration) -> Self {
        Self { probe, timeout }
    }

    /// Return whether the charge is degraded. Never fails.
    pub async fn probe(&self, req: &ChargeRequest) -> bool {
        let result = match tokio::time::timeout(self.timeout, self.probe.call()).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.timeout)),
        };

        match result {
            Ok(()) => {
                info!(
                    card_type = classify(&req.card.number),
                    ending = masked_suffix(&req.card.number),
                    amount = %req.amount,
                    "Processing transaction"
                );
                false
            }
            Err(e) => {
                warn!(reason = %e, "gateway probe failed, charge degraded");
                true
            }
        }
    }
}

impl std::fmt::Debug for GatewaySimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySimulator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CreditCard, Money};

    fn request() -> ChargeRequest {
        ChargeRequest::new(
            Money::new("USD", 12, 0),
            CreditCard {
                number: "4111111111111111".to_string(),
                ..Default::default()
            },
        )
    }

    fn simulator(probe: impl GatewayProbe + 'static, timeout_ms: u64) -> GatewaySimulator {
        GatewaySimulator::new(Box::new(probe), Duration::from_millis(timeout_ms))
    }

    #[tokio::test]
    async fn healthy_gateway_is_not_degraded() {
        let sim = simulator(StaticGateway::healthy(), 100);
        assert!(!sim.probe(&request()).await);
    }

    #[tokio::test]
    async fn failing_gateway_degrades() {
        let sim = simulator(StaticGateway::unavailable("503"), 100);
        assert!(sim.probe(&request()).await);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_gateway_times_out_and_degrades() {
        let sim = simulator(
            StaticGateway::healthy().with_latency(Duration::from_secs(30)),
            50,
        );
        assert!(sim.probe(&request()).await);
    }

    #[tokio::test]
    async fn unreachable_tcp_gateway_degrades() {
        // bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sim = simulator(TcpGateway::new(addr.to_string()), 500);
        assert!(sim.probe(&request()).await);
    }

    #[tokio::test]
    async fn reachable_tcp_gateway_is_not_degraded() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let sim = simulator(TcpGateway::new(addr.to_string()), 500);
        assert!(!sim.probe(&request()).await);
    }
}
