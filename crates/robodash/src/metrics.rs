//! Engine metrics collection.

#![allow(missing_docs)]

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub avg_ms: f64,
    pub last_ms: f64,
    pub calls: u64,
    total_ms: f64,
}

impl CallStats {
    pub fn record(&mut self, duration: Duration) {
        let ms = duration.as_secs_f64() * 1000.0;
        self.last_ms = ms;
        self.total_ms += ms;
        if self.calls == 0 {
            self.min_ms = ms;
            self.max_ms = ms;
        } else {
            if ms < self.min_ms {
                self.min_ms = ms;
            }
            if ms > self.max_ms {
                self.max_ms = ms;
            }
        }
        self.calls = self.calls.saturating_add(1);
        self.avg_ms = self.total_ms / self.calls as f64;
    }
}

impl Default for CallStats {
    fn default() -> Self {
        Self {
            min_ms: 0.0,
            max_ms: 0.0,
            avg_ms: 0.0,
            last_ms: 0.0,
            calls: 0,
            total_ms: 0.0,
        }
    }
}

/// Counters for the poll loop and the command stream.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EngineMetrics {
    pub polls_issued: u64,
    pub polls_ok: u64,
    pub polls_failed: u64,
    /// Completions that arrived for a deactivated poller.
    pub polls_stale: u64,
    /// Ticks skipped because too many polls were still outstanding.
    pub polls_throttled: u64,
    pub commands_issued: u64,
    /// Timer deadlines coalesced because the loop woke late.
    pub overruns: u64,
    pub poll_latency: CallStats,
}

impl EngineMetrics {
    pub fn record_overrun(&mut self, missed: u32) {
        self.overruns = self.overruns.saturating_add(u64::from(missed));
    }

    #[must_use]
    pub fn poll_failure_ratio(&self) -> f64 {
        let settled = self.polls_ok + self.polls_failed;
        if settled == 0 {
            return 0.0;
        }
        self.polls_failed as f64 / settled as f64
    }
}
