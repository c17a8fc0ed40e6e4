//! Circuit breaker guarding remote labeler calls

use dashmap::DashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    /// Reset timeout elapsed, the next call is a trial
    HalfOpen,
}

#[derive(Debug, Clone)]
struct BreakerEntry {
    state: BreakerState,
    failure_count: usize,
    opened_at: Option<Instant>,
}

impl Default for BreakerEntry {
    fn default() -> Self {
        Self {
            state: BreakerState::Closed,
            failure_count: 0,
            opened_at: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: usize,
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(30),
        }
    }
}

/// Per-operation circuit breaker
#[derive(Debug)]
pub struct CircuitBreaker {
    breakers: DashMap<String, BreakerEntry>,
    config: CircuitBreakerConfig,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            breakers: DashMap::new(),
            config,
        }
    }

    /// Whether calls for `operation` should be rejected right now
    pub fn is_open(&self, operation: &str) -> bool {
        let Some(mut entry) = self.breakers.get_mut(operation) else {
            return false;
        };

        match entry.state {
            BreakerState::Closed | BreakerState::HalfOpen => false,
            BreakerState::Open => {
                let expired = entry
                    .opened_at
                    .map_or(true, |at| at.elapsed() >= self.config.reset_timeout);
                if expired {
                    entry.state = BreakerState::HalfOpen;
                }
                !expired
            }
        }
    }

    pub fn mark_success(&self, operation: &str) {
        self.breakers.remove(operation);
    }

    pub fn mark_failure(&self, operation: &str) {
        let mut entry = self.breakers.entry(operation.to_string()).or_default();
        entry.failure_count += 1;

        // A failed trial call reopens immediately.
        if entry.state == BreakerState::HalfOpen
            || entry.failure_count >= self.config.failure_threshold
        {
            entry.state = BreakerState::Open;
            entry.opened_at = Some(Instant::now());
        }
    }

    pub fn state(&self, operation: &str) -> BreakerState {
        self.breakers
            .get(operation)
            .map_or(BreakerState::Closed, |e| e.state)
    }

    pub fn failure_count(&self, operation: &str) -> usize {
        self.breakers
            .get(operation)
            .map_or(0, |e| e.failure_count)
    }
}
