//! Runtime configuration.
//!
//! Values are resolved once through a [`ConfigResolver`] and handed to the
//! charge flow as plain value objects. Resolution never fails: missing or
//! malformed values fall back to their defaults.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const FORCED_DEGRADED: &str = "FORCED_DEGRADED";
pub const LOCK_TIMEOUT_PROBABILITY: &str = "LOCK_TIMEOUT_PROBABILITY";
pub const GATEWAY_ADDR: &str = "GATEWAY_ADDR";
pub const GATEWAY_TIMEOUT_MS: &str = "GATEWAY_TIMEOUT_MS";
pub const RETRY_RECORDS_PATH: &str = "RETRY_RECORDS_PATH";

const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 2_000;

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Typed access to named configuration values.
pub struct ConfigResolver {
    lookup: Lookup,
}

impl ConfigResolver {
    /// Resolve against the process environment.
    pub fn from_env() -> Self {
        Self {
            lookup: Box::new(|name| env::var(name).ok()),
        }
    }

    /// Resolve against a fixed set of values.
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self {
            lookup: Box::new(move |name| values.get(name).cloned()),
        }
    }

    /// Raw value, `None` when absent or blank.
    fn raw(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    /// `"1"`, `"true"` and `"yes"` (any case) are true, anything else is false.
    pub fn resolve_bool(&self, name: &str, default: bool) -> bool {
        match self.raw(name) {
            Some(v) => {
                v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
            }
            None => default,
        }
    }

    pub fn resolve_double(&self, name: &str, default: f64) -> f64 {
        self.raw(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn resolve_u64(&self, name: &str, default: u64) -> u64 {
        self.raw(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn resolve_string(&self, name: &str) -> Option<String> {
        self.raw(name).map(|v| v.trim().to_string())
    }
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver").finish_non_exhaustive()
    }
}

/// Fault-injection knobs read once per charge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaultConfig {
    /// Take the retry path even when the gateway probe succeeds.
    pub forced_degraded: bool,
    /// Chance in `[0, 1]` that a charge aborts with a lock timeout.
    pub lock_timeout_probability: f64,
}

impl FaultConfig {
    pub fn new(forced_degraded: bool, lock_timeout_probability: f64) -> Self {
        Self {
            forced_degraded,
            lock_timeout_probability: clamp_probability(lock_timeout_probability),
        }
    }

    pub fn from_env() -> Self {
        Self::resolve(&ConfigResolver::from_env())
    }

    pub fn resolve(resolver: &ConfigResolver) -> Self {
        Self::new(
            resolver.resolve_bool(FORCED_DEGRADED, false),
            resolver.resolve_double(LOCK_TIMEOUT_PROBABILITY, 0.0),
        )
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

/// Process-wide settings for the charge binary.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub fault: FaultConfig,
    /// `host:port` probed by the gateway simulator; a healthy stand-in is
    /// used when unset.
    pub gateway_addr: Option<String>,
    pub gateway_timeout: Duration,
    /// Append retry records to this csv file instead of keeping them in memory.
    pub retry_records_path: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::resolve(&ConfigResolver::from_env())
    }

    pub fn resolve(resolver: &ConfigResolver) -> Self {
        Self {
            fault: FaultConfig::resolve(resolver),
            gateway_addr: resolver.resolve_string(GATEWAY_ADDR),
            gateway_timeout: Duration::from_millis(
                resolver.resolve_u64(GATEWAY_TIMEOUT_MS, DEFAULT_GATEWAY_TIMEOUT_MS),
            ),
            retry_records_path: resolver.resolve_string(RETRY_RECORDS_PATH).map(PathBuf::from),
        }
    }
}
