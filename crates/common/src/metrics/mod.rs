//! Metrics for the admin client
//!
//! Admin API calls, wizard step outcomes and lookup cache usage.
//! Recording is a no-op until a recorder is installed.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all DocRepo metrics
pub const METRICS_PREFIX: &str = "docrepo";

const API_CALLS: &str = "docrepo_api_calls_total";
const API_LATENCY: &str = "docrepo_api_call_duration_seconds";
const WIZARD_STEPS: &str = "docrepo_wizard_steps_total";
const LOOKUPS: &str = "docrepo_lookups_total";

pub fn register_metrics() {
    describe_counter!(API_CALLS, Unit::Count, "Admin API calls by endpoint and HTTP status");
    describe_histogram!(API_LATENCY, Unit::Seconds, "Admin API call latency");
    describe_counter!(WIZARD_STEPS, Unit::Count, "Wizard step submissions by step and outcome");
    describe_counter!(LOOKUPS, Unit::Count, "Lookup cache reads by key and result");

    tracing::debug!(prefix = METRICS_PREFIX, "Metrics described");
}

/// Times one admin API call from send to response
pub struct ApiCallTimer {
    started: Instant,
    method: String,
    endpoint: String,
}

impl ApiCallTimer {
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            started: Instant::now(),
            method: method.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Status 0: no response (connect or timeout error)
    pub fn finish(self, status: u16) {
        let elapsed = self.started.elapsed().as_secs_f64();
        counter!(API_CALLS, "method" => self.method.clone(), "endpoint" => self.endpoint.clone(), "status" => status.to_string())
            .increment(1);
        histogram!(API_LATENCY, "method" => self.method, "endpoint" => self.endpoint).record(elapsed);
    }
}

pub fn record_wizard_step(step: u8, success: bool) {
    let outcome = if success { "ok" } else { "failed" };
    counter!(WIZARD_STEPS, "step" => step.to_string(), "outcome" => outcome).increment(1);
}

pub fn record_lookup(key: &str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!(LOOKUPS, "key" => key.to_string(), "result" => result).increment(1);
}
