//! Timing constants and tunable defaults for the zone throttle.
//!
//! Single source of truth for these values. Do not duplicate them in
//! `evo_zone_throttle`.

/// Decay cycle for the system-wide latency aggregators, in microseconds.
pub const CYCLE_TIME_US: u64 = 1_000_000;

/// Decay cycle for the per-tenant operation counters, in microseconds.
///
/// Longer than [`CYCLE_TIME_US`] because a starved tenant can see a little
/// over two seconds of latency before an operation completes.
pub const ZONE_CYCLE_TIME_US: u64 = 2_000_000;

/// Minimum gap between delay re-evaluations, in microseconds.
pub const RECHECK_INTERVAL_US: u64 = 100_000;

/// Number of fully-elapsed, activity-free cycles after which a historical
/// average is reset to zero rather than further decayed.
pub const RESET_GENERATIONS: u64 = 5;

/// Default for [`crate::config::ThrottleConfig::delay_enable`].
pub const DEFAULT_DELAY_ENABLE: bool = true;

/// Default amount, in microseconds, the per-operation delay changes by on
/// each re-evaluation.
pub const DEFAULT_DELAY_STEP: u16 = 5;

/// Default maximum per-operation delay, in microseconds.
pub const DEFAULT_DELAY_CEILING: u16 = 100;

/// Latency floor substituted for a zero computed read latency, in
/// microseconds.
pub const READ_LATENCY_FLOOR_US: u64 = 1000;

/// Latency floor substituted for a zero computed write latency, in
/// microseconds.
pub const WRITE_LATENCY_FLOOR_US: u64 = 10;

/// Tenant identifier reserved for the privileged, never-throttled tenant.
pub const GLOBAL_TENANT_ID: u32 = 0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_times_are_consistent() {
        assert!(ZONE_CYCLE_TIME_US > CYCLE_TIME_US);
        assert!(RECHECK_INTERVAL_US < CYCLE_TIME_US);
    }

    #[test]
    fn defaults_are_sane() {
        assert!(DEFAULT_DELAY_STEP > 0);
        assert!(DEFAULT_DELAY_STEP <= DEFAULT_DELAY_CEILING);
        assert!(RESET_GENERATIONS > 1);
    }
}
