//! Entry points: the throttle's stable ABI with the storage pipeline.
//!
//! Every method here is infallible by design: a vanished tenant or an
//! aborted enumeration is silently tolerated rather than surfaced, and
//! the tolerated data race on `last_checked` means two concurrent callers
//! may both decide to re-evaluate around an interval boundary — at most
//! one cycle's worth of utilization/delay writes is clobbered, and the
//! next interval corrects it.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU64, Ordering};
use std::sync::Mutex;

use evo_throttle_common::config::ThrottleConfig;
use evo_throttle_common::consts::{READ_LATENCY_FLOOR_US, RECHECK_INTERVAL_US, WRITE_LATENCY_FLOOR_US};

use crate::counter::IopType;
use crate::latency::{IoDirection, LatencyAggregator};
use crate::registry::{Clock, Sleeper, TenantIo, TenantRegistry, ZioHandle};
use crate::tenant::TenantId;
use crate::{controller, estimator, probes};

/// A logical-level I/O request, as seen by the upper storage layer before
/// any physical work has happened.
///
/// Separate from [`IopType`] because the entry point only ever
/// distinguishes a logical read from a logical write — a logical read
/// bumps totals but never feeds a counter (see [`ZoneThrottle::on_logical_op`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// A logical (syscall-level) read.
    Read,
    /// A logical (syscall-level) write.
    Write,
}

/// Process-wide tunables, writable at any time and read without
/// synchronization — each field is its own atomic rather than a struct
/// behind a lock, so a writer never blocks a reader on the hot path.
#[derive(Debug)]
pub struct Tunables {
    pub delay_enable: AtomicBool,
    pub delay_step: AtomicU16,
    pub delay_ceiling: AtomicU16,
}

impl From<ThrottleConfig> for Tunables {
    fn from(config: ThrottleConfig) -> Self {
        Self {
            delay_enable: AtomicBool::new(config.delay_enable),
            delay_step: AtomicU16::new(config.delay_step),
            delay_ceiling: AtomicU16::new(config.delay_ceiling),
        }
    }
}

/// Process-wide throttle state: the two system latency aggregators, the
/// last re-evaluation timestamp, and the tunables.
///
/// Lives for the lifetime of the host process; construct exactly one per
/// storage subsystem instance.
///
/// The two aggregators are each behind their own [`Mutex`] rather than an
/// unsynchronized shared static updated "under a tenant lock" — Rust's
/// aliasing rules do not permit that for state shared *across* tenants.
/// An atomic or sharded aggregator would also preserve the decay
/// semantics; a per-direction mutex is the smallest change that keeps
/// this sound.
#[derive(Debug)]
pub struct ThrottleContext {
    rd_lat: Mutex<LatencyAggregator>,
    wr_lat: Mutex<LatencyAggregator>,
    last_checked: AtomicU64,
    pub tunables: Tunables,
}

impl ThrottleContext {
    /// A fresh context, with both aggregator windows opened at `now`.
    pub fn new(config: ThrottleConfig, now: u64) -> Self {
        Self {
            rd_lat: Mutex::new(LatencyAggregator::new(now)),
            wr_lat: Mutex::new(LatencyAggregator::new(now)),
            last_checked: AtomicU64::new(0),
            tunables: Tunables::from(config),
        }
    }

    fn floored_system_averages(&self, now: u64) -> (u64, u64) {
        let mut r = self.rd_lat.lock().unwrap_or_else(|e| e.into_inner()).average(now);
        let mut w = self.wr_lat.lock().unwrap_or_else(|e| e.into_inner()).average(now);
        if r == 0 {
            r = READ_LATENCY_FLOOR_US;
        }
        if w == 0 {
            w = WRITE_LATENCY_FLOOR_US;
        }
        probes::sys_avg_lat(r, w);
        (r, w)
    }

    /// Run one full re-evaluation pass: recompute each tenant's
    /// utilization from its counters and the current system latency
    /// averages, then adjust each tenant's delay toward or away from the
    /// cross-tenant average.
    pub fn reevaluate<R: TenantRegistry>(&self, registry: &R, now: u64) {
        let (avg_r_lat, avg_w_lat) = self.floored_system_averages(now);
        let stats = estimator::estimate_utilization(registry, now, avg_r_lat, avg_w_lat);

        probes::stats(avg_r_lat, avg_w_lat, stats.active_tenants, stats.avg_util);

        let step = self.tunables.delay_step.load(Ordering::Relaxed);
        let ceiling = self.tunables.delay_ceiling.load(Ordering::Relaxed);

        registry.for_each_active(|tenant| {
            if tenant.id().is_global() {
                return ControlFlow::Continue(());
            }
            let state = tenant.throttle_state();
            let io_util = state
                .counters
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .io_util;
            let old_delay = state.delay_us();
            let new_delay = controller::next_delay(
                old_delay,
                io_util,
                stats.avg_util,
                stats.active_tenants,
                step,
                ceiling,
            );
            if new_delay != old_delay {
                probes::throttle(tenant.id(), old_delay, new_delay);
                state.set_delay_us(new_delay);
            }
            ControlFlow::Continue(())
        });
    }
}

/// Ties [`ThrottleContext`] together with the host collaborators it needs
/// to drive the four entry points.
pub struct ZoneThrottle<R, C, S> {
    pub context: ThrottleContext,
    pub registry: R,
    pub clock: C,
    pub sleeper: S,
}

impl<R: TenantRegistry, C: Clock, S: Sleeper> ZoneThrottle<R, C, S> {
    pub fn new(config: ThrottleConfig, registry: R, clock: C, sleeper: S) -> Self {
        let now = clock.now_micros();
        Self {
            context: ThrottleContext::new(config, now),
            registry,
            clock,
            sleeper,
        }
    }

    /// Stamp the submitting tenant's identifier onto `zio` so that the
    /// completion hook — possibly run on an unrelated worker — can
    /// attribute latency correctly.
    pub fn on_zio_init(&self, zio: &ZioHandle, submitting_tenant: TenantId) {
        zio.stamp_zone(submitting_tenant);
    }

    /// Stamp a start timestamp on `zio`. No-op if throttling is disabled.
    pub fn on_physical_start(&self, zio: &ZioHandle) {
        if !self.context.tunables.delay_enable.load(Ordering::Relaxed) {
            return;
        }
        zio.stamp_start(self.clock.now_micros());
    }

    /// Called from the upper layer for a logical read or logical write.
    pub fn on_logical_op(&self, op: LogicalOp, size: u64, tenant_id: TenantId) {
        let now = self.clock.now_micros();

        let Some(tenant_ref) = self.registry.find(tenant_id) else {
            return;
        };
        let state = tenant_ref.throttle_state();

        match op {
            LogicalOp::Write => {
                {
                    let mut counters =
                        state.counters.lock().unwrap_or_else(|e| e.into_inner());
                    counters.logical_write.record(now);
                }
                state.totals.record_logical_write(size);
            }
            LogicalOp::Read => {
                state.totals.record_logical_read(size);
            }
        }
        drop(tenant_ref);

        if !self.context.tunables.delay_enable.load(Ordering::Relaxed) {
            return;
        }

        let last_checked = self.context.last_checked.load(Ordering::Relaxed);
        if now.saturating_sub(last_checked) > RECHECK_INTERVAL_US {
            // Tolerated race: concurrent callers may both pass this check
            // around the boundary. Worst case, one re-evaluation cycle's
            // writes are clobbered; the next interval self-heals.
            self.context.last_checked.store(now, Ordering::Relaxed);
            self.context.reevaluate(&self.registry, now);
        }

        if let Some(tenant_ref) = self.registry.find(tenant_id) {
            let wait = tenant_ref.throttle_state().delay_us();
            if wait > 0 {
                let op_type = match op {
                    LogicalOp::Write => IopType::LogicalWrite,
                    LogicalOp::Read => IopType::Read,
                };
                probes::wait(tenant_id, op_type, wait);
                drop(tenant_ref);
                self.sleeper.sleep_micros(wait as u64);
            }
        }
    }

    /// Record a physical I/O's completion: attribute its latency to the
    /// tenant stamped at init, and feed the system-wide latency average.
    pub fn on_physical_done(&self, zio: &ZioHandle) {
        if !self.context.tunables.delay_enable.load(Ordering::Relaxed) {
            return;
        }

        let Some(tenant_id) = zio.zone_id() else {
            return;
        };
        let Some(start) = zio.start() else {
            return;
        };
        let Some(tenant_ref) = self.registry.find(tenant_id) else {
            // Tenant removed mid-flight; nothing to attribute to.
            return;
        };

        let now = self.clock.now_micros();
        let latency = now.saturating_sub(start);
        let direction = zio.io_type.get().unwrap_or(IoDirection::Read);

        let state = tenant_ref.throttle_state();
        {
            let mut counters = state.counters.lock().unwrap_or_else(|e| e.into_inner());
            match direction {
                IoDirection::Read => counters.read.record(now),
                IoDirection::Write => counters.write.record(now),
            }
            let aggregator = match direction {
                IoDirection::Read => &self.context.rd_lat,
                IoDirection::Write => &self.context.wr_lat,
            };
            aggregator
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .sample(now, latency);
        }

        match direction {
            IoDirection::Read => state.totals.record_physical_read(zio.size.get()),
            IoDirection::Write => state.totals.record_physical_write(zio.size.get()),
        }

        probes::latency(tenant_id, latency);
    }
}
