//! Per-provider circuit breaker.
//!
//! # States
//! - Closed: provider is offered calls
//! - Open: provider is skipped until the recovery timeout elapses
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= threshold (failures since last success)
//! Open → Closed: a success, an explicit reset, or recovery timeout elapsed
//!                (observed lazily on the next availability check)
//! ```
//!
//! # Design Decisions
//! - One record per provider name, created on first failure
//! - No half-open probe: once the timeout passes every caller may try again
//! - Time comes from `tokio::time::Instant` so paused-clock tests can drive it

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::time::Instant;

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;

#[derive(Debug, Clone, Default)]
struct CircuitRecord {
    failure_count: u32,
    /// Set exactly while the circuit is open.
    opened_at: Option<Instant>,
}

impl CircuitRecord {
    fn is_open(&self) -> bool {
        self.opened_at.is_some()
    }
}

/// Snapshot of one provider's breaker, suitable for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitStatus {
    pub open: bool,
    pub failure_count: u32,
    pub available: bool,
    /// Seconds left (rounded up) before an open circuit closes on its own.
    pub seconds_until_recovery: Option<u64>,
}

/// Failure tracker keyed by provider name.
#[derive(Debug)]
pub struct CircuitBreaker {
    records: DashMap<String, CircuitRecord>,
    failure_threshold: u32,
    recovery_timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            records: DashMap::new(),
            failure_threshold,
            recovery_timeout,
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self::new(
            config.failure_threshold,
            Duration::from_secs(config.recovery_timeout_secs),
        )
    }

    /// Whether `provider` may be offered a call.
    ///
    /// An open circuit whose recovery timeout has elapsed is closed here
    /// and its failure count cleared.
    pub fn is_available(&self, provider: &str) -> bool {
        let Some(mut record) = self.records.get_mut(provider) else {
            return true;
        };
        let Some(opened_at) = record.opened_at else {
            return true;
        };

        let recovered = opened_at.elapsed() >= self.recovery_timeout;

        if recovered {
            *record = CircuitRecord::default();
            drop(record);
            tracing::info!(provider = %provider, "Circuit recovered after timeout");
            metrics::record_circuit_state(provider, false);
            return true;
        }

        false
    }

    /// Count a failed call. Opens the circuit at the threshold.
    pub fn record_failure(&self, provider: &str) {
        let mut record = self.records.entry(provider.to_string()).or_default();
        record.failure_count = record.failure_count.saturating_add(1);

        if !record.is_open() && record.failure_count >= self.failure_threshold {
            record.opened_at = Some(Instant::now());
            let failures = record.failure_count;
            drop(record);
            tracing::warn!(
                provider = %provider,
                failures,
                recovery_secs = self.recovery_timeout.as_secs(),
                "Circuit opened"
            );
            metrics::record_circuit_state(provider, true);
        }
    }

    /// A success closes the circuit and clears the count.
    pub fn record_success(&self, provider: &str) {
        if let Some(mut record) = self.records.get_mut(provider) {
            let was_open = record.is_open();
            *record = CircuitRecord::default();
            drop(record);
            if was_open {
                tracing::info!(provider = %provider, "Circuit closed after success");
                metrics::record_circuit_state(provider, false);
            }
        }
    }

    /// Manually close one provider's circuit.
    pub fn reset(&self, provider: &str) {
        if self.records.remove(provider).is_some() {
            tracing::info!(provider = %provider, "Circuit manually reset");
            metrics::record_circuit_state(provider, false);
        }
    }

    /// Manually close every circuit.
    pub fn reset_all(&self) {
        for provider in self.known_providers() {
            self.reset(&provider);
        }
    }

    /// Breaker snapshot for `provider`. Unknown providers report closed.
    pub fn status(&self, provider: &str) -> CircuitStatus {
        let available = self.is_available(provider);
        let Some(record) = self.records.get(provider) else {
            return CircuitStatus {
                open: false,
                failure_count: 0,
                available,
                seconds_until_recovery: None,
            };
        };

        let seconds_until_recovery = record
            .opened_at
            .map(|at| {
                let remaining = self.recovery_timeout.saturating_sub(at.elapsed());
                remaining.as_secs_f64().ceil() as u64
            });

        CircuitStatus {
            open: record.is_open(),
            failure_count: record.failure_count,
            available,
            seconds_until_recovery,
        }
    }

    /// Providers that have ever recorded a failure since their last reset.
    pub fn known_providers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::from_config(&CircuitBreakerConfig::default())
    }
}
