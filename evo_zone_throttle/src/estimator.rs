//! Utilization estimation.
//!
//! Converts each tenant's decaying I/O counters, combined with the
//! system-wide latency averages, into a single integer utilization scalar
//! per tenant, and an average across all currently-active tenants.

use std::ops::ControlFlow;

use crate::registry::{TenantIo, TenantRegistry};

/// Result of one utilization pass across all tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UtilizationStats {
    /// Sum of `io_util` across all active tenants.
    pub total_util: u64,
    /// Average `io_util` across active tenants (0 if none active).
    pub avg_util: u64,
    /// Number of tenants with nonzero utilization this pass.
    pub active_tenants: u32,
}

/// Compute per-tenant utilization and the cross-tenant average.
///
/// Skips the privileged global tenant. Each tenant's three counter
/// estimates are taken under its own lock; `avg_r_lat`/`avg_w_lat` are the
/// system-wide latency averages already floor-adjusted by the caller (see
/// `latency::LatencyAggregator::average` and the floor applied in
/// `engine::ThrottleContext::reevaluate`).
pub fn estimate_utilization<R: TenantRegistry>(
    registry: &R,
    now: u64,
    avg_r_lat: u64,
    avg_w_lat: u64,
) -> UtilizationStats {
    let mut stats = UtilizationStats::default();

    registry.for_each_active(|tenant| {
        if tenant.id().is_global() {
            return ControlFlow::Continue(());
        }

        let state = tenant.throttle_state();
        let mut counters = state.counters.lock().unwrap_or_else(|e| e.into_inner());
        let r_ops = counters.read.estimate(now);
        let w_ops = counters.write.estimate(now);
        let lw_ops = counters.logical_write.estimate(now);

        let io_util = if r_ops == 0 && w_ops == 0 && lw_ops == 0 {
            0
        } else {
            // Scaled by 1000 so the rest of the pipeline stays integer-only;
            // logical writes are weighted by the write-latency estimate
            // since they have not yet hit physical storage.
            1000 * (r_ops * avg_r_lat + w_ops * avg_w_lat + lw_ops * avg_w_lat)
        };
        counters.io_util = io_util;
        drop(counters);

        crate::probes::io_cnt(tenant.id(), r_ops, w_ops, lw_ops);
        crate::probes::utilization(tenant.id(), r_ops, w_ops, lw_ops, io_util);

        stats.total_util += io_util;
        if io_util > 0 {
            stats.active_tenants += 1;
        }

        ControlFlow::Continue(())
    });

    stats.avg_util = if stats.active_tenants > 0 {
        stats.total_util / stats.active_tenants as u64
    } else {
        0
    };

    stats
}
