// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Requeue decisions for failed reconcile attempts.

use crate::constants::retry::{BASE_DELAY_SECS, BUDGET, MAX_DELAY_SECS};
use crate::error::ControllerError;
use kube::runtime::controller::Action;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{error, warn};

/// Delay before retry number `attempt` (1-based): base * 2^(attempt-1), capped
pub fn calculate_backoff(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let delay_secs = BASE_DELAY_SECS.saturating_mul(2_u64.saturating_pow(exponent));
    Duration::from_secs(delay_secs.min(MAX_DELAY_SECS))
}

/// Consecutive failure count per resource key
#[derive(Default)]
pub struct RetryTracker {
    attempts: Mutex<HashMap<String, u32>>,
}

impl RetryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a failure and return the number of consecutive failures
    pub fn record_failure(&self, key: &str) -> u32 {
        let mut attempts = self.lock();
        let count = attempts.entry(key.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn reset(&self, key: &str) {
        self.lock().remove(key);
    }

    /// Forget failure counts of resources that no longer exist
    pub fn retain_keys(&self, live: &HashSet<String>) {
        self.lock().retain(|key, _| live.contains(key));
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, u32>> {
        self.attempts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Requeue action for a failed reconcile of `key`.
    ///
    /// Non-retryable errors wait for the next change of the object. Retryable
    /// errors back off exponentially; once the budget is used up the failure is
    /// reported and the count starts over at the maximum delay.
    pub fn requeue(&self, key: &str, error: &ControllerError) -> Action {
        if !error.is_retryable() {
            error!("Reconcile of {} failed permanently, waiting for a change: {}", key, error);
            self.reset(key);
            return Action::await_change();
        }

        let attempt = self.record_failure(key);
        if attempt >= BUDGET {
            error!(
                "Retry budget exhausted for {} after {} attempts: {}",
                key, attempt, error
            );
            self.reset(key);
            return Action::requeue(Duration::from_secs(MAX_DELAY_SECS));
        }

        let delay = calculate_backoff(attempt);
        warn!(
            "Reconcile of {} failed (attempt {}), retrying in {:?}: {}",
            key, attempt, delay, error
        );
        Action::requeue(delay)
    }
}
