//! Submission counters (lock-free atomics, zero allocation on hot path).
//!
//! One [`Metrics`] lives in `AppState` and feeds both `/metrics` and `/health`.

use crate::response::SubmissionStats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

#[derive(Default)]
pub struct Metrics {
    // --- Traffic ---
    pub submissions_total: AtomicU64,
    pub submissions_forwarded: AtomicU64,
    pub submissions_failed: AtomicU64,
    pub submissions_rejected: AtomicU64,

    // --- Latency (μs, updated via CAS) ---
    pub forward_duration_us_sum: AtomicU64,
    pub forward_duration_us_max: AtomicU64,
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            submissions_total: AtomicU64::new(0),
            submissions_forwarded: AtomicU64::new(0),
            submissions_failed: AtomicU64::new(0),
            submissions_rejected: AtomicU64::new(0),
            forward_duration_us_sum: AtomicU64::new(0),
            forward_duration_us_max: AtomicU64::new(0),
        }
    }

    pub fn record_forward_duration(&self, start: Instant) {
        let us = start.elapsed().as_micros() as u64;
        self.forward_duration_us_sum.fetch_add(us, Ordering::Relaxed);
        // CAS loop for max tracking
        let mut cur = self.forward_duration_us_max.load(Ordering::Relaxed);
        while us > cur {
            match self.forward_duration_us_max.compare_exchange_weak(
                cur,
                us,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Counter snapshot for the health endpoint.
    pub fn submissions(&self) -> SubmissionStats {
        SubmissionStats {
            received: self.submissions_total.load(Ordering::Relaxed),
            forwarded: self.submissions_forwarded.load(Ordering::Relaxed),
            failed: self.submissions_failed.load(Ordering::Relaxed),
            rejected: self.submissions_rejected.load(Ordering::Relaxed),
        }
    }

    /// Render in Prometheus text exposition format. Resets the max gauge.
    pub fn render(&self) -> String {
        let total = self.submissions_total.load(Ordering::Relaxed);
        let forwarded = self.submissions_forwarded.load(Ordering::Relaxed);
        let failed = self.submissions_failed.load(Ordering::Relaxed);
        let rejected = self.submissions_rejected.load(Ordering::Relaxed);
        let dur_sum = self.forward_duration_us_sum.load(Ordering::Relaxed);
        let dur_max = self.forward_duration_us_max.swap(0, Ordering::Relaxed);

        // Convert μs to seconds for Prometheus conventions
        let dur_sum_s = dur_sum as f64 / 1_000_000.0;
        let dur_max_s = dur_max as f64 / 1_000_000.0;

        format!(
            "\
# HELP relay_submissions_total Total form submissions received.\n\
# TYPE relay_submissions_total counter\n\
relay_submissions_total {total}\n\
# HELP relay_submissions_forwarded_total Submissions accepted downstream (HTTP 200).\n\
# TYPE relay_submissions_forwarded_total counter\n\
relay_submissions_forwarded_total {forwarded}\n\
# HELP relay_submissions_failed_total Submissions the downstream rejected or never received.\n\
# TYPE relay_submissions_failed_total counter\n\
relay_submissions_failed_total {failed}\n\
# HELP relay_submissions_rejected_total Malformed submissions (HTTP 400).\n\
# TYPE relay_submissions_rejected_total counter\n\
relay_submissions_rejected_total {rejected}\n\
# HELP relay_forward_duration_seconds_sum Total time spent forwarding (seconds).\n\
# TYPE relay_forward_duration_seconds_sum counter\n\
relay_forward_duration_seconds_sum {dur_sum_s:.6}\n\
# HELP relay_forward_duration_seconds_max Max forward time since last scrape (seconds).\n\
# TYPE relay_forward_duration_seconds_max gauge\n\
relay_forward_duration_seconds_max {dur_max_s:.6}\n"
        )
    }
}
