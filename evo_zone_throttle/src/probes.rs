//! Tracing probes.
//!
//! Fire-and-forget observability hooks, one per named probe site.
//! Each is a thin wrapper around a `tracing` macro call: when the
//! corresponding level is filtered out, `tracing`'s callsite cache skips
//! the call at negligible cost, which is this crate's equivalent of a
//! DTrace is-enabled check — there is no separate "tracer disabled" flag
//! to thread through the engine.

use crate::counter::IopType;
use crate::tenant::TenantId;

pub fn calc_wt_avg(sys_avg: u64, cycle_lat: u64, cycle_cnt: u64) {
    tracing::trace!(sys_avg, cycle_lat, cycle_cnt, "zone_throttle.calc_wt_avg");
}

pub fn io_cnt(zone: TenantId, r: u64, w: u64, lw: u64) {
    tracing::trace!(zone = zone.0, r, w, lw, "zone_throttle.io_cnt");
}

pub fn sys_avg_lat(r: u64, w: u64) {
    tracing::debug!(r, w, "zone_throttle.sys_avg_lat");
}

pub fn utilization(zone: TenantId, r: u64, w: u64, lw: u64, util: u64) {
    tracing::trace!(zone = zone.0, r, w, lw, util, "zone_throttle.utilization");
}

pub fn throttle(zone: TenantId, old_delay: u16, new_delay: u16) {
    tracing::debug!(
        zone = zone.0,
        old_delay,
        new_delay,
        "zone_throttle.throttle"
    );
}

pub fn stats(avg_r_lat: u64, avg_w_lat: u64, active: u32, avg_util: u64) {
    tracing::debug!(
        avg_r_lat,
        avg_w_lat,
        active,
        avg_util,
        "zone_throttle.stats"
    );
}

pub fn wait(zone: TenantId, op: IopType, micros: u16) {
    tracing::trace!(zone = zone.0, ?op, micros, "zone_throttle.wait");
}

pub fn latency(zone: TenantId, micros: u64) {
    tracing::trace!(zone = zone.0, micros, "zone_throttle.latency");
}
