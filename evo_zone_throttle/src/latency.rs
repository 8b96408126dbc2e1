//! Decaying system-wide latency aggregator.
//!
//! Two instances exist for the life of the process: one for reads, one for
//! writes (see `engine::ThrottleContext`). Each smooths recent physical I/O
//! latency across multi-second cycles, weighting current-cycle activity 8x
//! over history so the average reacts quickly to changing load but doesn't
//! thrash on a single slow operation.

use evo_throttle_common::consts::{CYCLE_TIME_US, RESET_GENERATIONS};

/// The direction a physical I/O traveled, for latency accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoDirection {
    /// A physical read.
    Read,
    /// A physical write.
    Write,
}

/// A decaying average of recent I/O latency, in microseconds.
#[derive(Debug, Clone, Copy)]
pub struct LatencyAggregator {
    cycle_start: u64,
    cycle_cnt: u64,
    cycle_lat: u64,
    sys_avg_lat: u64,
}

impl Default for LatencyAggregator {
    fn default() -> Self {
        Self {
            cycle_start: 0,
            cycle_cnt: 0,
            cycle_lat: 0,
            sys_avg_lat: 0,
        }
    }
}

impl LatencyAggregator {
    /// A fresh aggregator with its window opened at `now`.
    pub fn new(now: u64) -> Self {
        Self {
            cycle_start: now,
            ..Self::default()
        }
    }

    /// Roll the accumulation window forward if a full cycle has elapsed.
    /// Returns `true` if a roll occurred.
    fn roll_forward(&mut self, now: u64) -> bool {
        let delta = now.saturating_sub(self.cycle_start);
        if delta < CYCLE_TIME_US {
            return false;
        }

        let generations = delta / CYCLE_TIME_US;
        if generations > RESET_GENERATIONS {
            self.sys_avg_lat = 0;
        } else {
            self.sys_avg_lat = (self.sys_avg_lat + self.cycle_lat) / (1 + self.cycle_cnt);
            for _ in 1..generations {
                self.sys_avg_lat /= 2;
            }
        }

        self.cycle_start = now;
        self.cycle_cnt = 0;
        self.cycle_lat = 0;
        true
    }

    /// Add one latency sample, in microseconds, at time `now`.
    pub fn sample(&mut self, now: u64, latency_us: u64) {
        self.roll_forward(now);
        self.cycle_cnt += 1;
        self.cycle_lat += latency_us;
    }

    /// Return the current smoothed latency estimate, in microseconds.
    pub fn average(&mut self, now: u64) -> u64 {
        if self.roll_forward(now) {
            self.sys_avg_lat
        } else {
            crate::probes::calc_wt_avg(self.sys_avg_lat, self.cycle_lat, self.cycle_cnt);
            // Recent activity counts 8x historical: tracks load swings fast
            // without discarding the smoothed baseline entirely.
            (self.sys_avg_lat + 8 * self.cycle_lat) / (1 + 8 * self.cycle_cnt)
        }
    }
}
