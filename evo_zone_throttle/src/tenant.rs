//! Per-tenant throttle state.
//!
//! This module defines the fields the throttle reads and writes on a tenant
//! record; it does not own tenant storage or lifecycle — that belongs to
//! the host's tenant registry (see [`crate::registry::TenantRegistry`]).
//! `TenantState` is meant to be embedded in whatever struct the host uses
//! to represent a tenant.

use std::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use std::sync::Mutex;

use crate::counter::DecayingCounter;

/// Opaque tenant identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantId(pub u32);

impl TenantId {
    /// The privileged, never-throttled tenant.
    pub const GLOBAL: TenantId = TenantId(evo_throttle_common::consts::GLOBAL_TENANT_ID);

    /// Whether this is the privileged global tenant, excluded from
    /// utilization accounting and throttling.
    pub fn is_global(self) -> bool {
        self == Self::GLOBAL
    }
}

/// Observability totals: atomically updated, never read by the control
/// loop itself. Exposed so a host can report per-tenant I/O accounting
/// without taking the tenant's `io_lock`.
#[derive(Debug, Default)]
pub struct TenantIoTotals {
    pub logical_read_ops: AtomicU64,
    pub logical_read_bytes: AtomicU64,
    pub logical_write_ops: AtomicU64,
    pub logical_write_bytes: AtomicU64,
    pub physical_read_ops: AtomicU64,
    pub physical_read_bytes: AtomicU64,
    pub physical_write_ops: AtomicU64,
    pub physical_write_bytes: AtomicU64,
}

impl TenantIoTotals {
    fn bump(counter: &AtomicU64, bytes_counter: &AtomicU64, size: u64) {
        counter.fetch_add(1, Ordering::Relaxed);
        bytes_counter.fetch_add(size, Ordering::Relaxed);
    }

    pub fn record_logical_read(&self, size: u64) {
        Self::bump(&self.logical_read_ops, &self.logical_read_bytes, size);
    }

    pub fn record_logical_write(&self, size: u64) {
        Self::bump(&self.logical_write_ops, &self.logical_write_bytes, size);
    }

    pub fn record_physical_read(&self, size: u64) {
        Self::bump(&self.physical_read_ops, &self.physical_read_bytes, size);
    }

    pub fn record_physical_write(&self, size: u64) {
        Self::bump(&self.physical_write_ops, &self.physical_write_bytes, size);
    }
}

/// The three decaying counters for one tenant, plus the last computed
/// utilization. Guarded as a unit by `TenantState::io_lock`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TenantCounters {
    pub read: DecayingCounter,
    pub write: DecayingCounter,
    pub logical_write: DecayingCounter,
    /// Last computed utilization scalar (unitless, 1000x-scaled).
    pub io_util: u64,
}

/// Full per-tenant throttle state, owned by the host's tenant registry.
///
/// `io_delay` is deliberately outside the mutex: the throttle's fast path
/// (`on_logical_op`) reads it without synchronization, tolerating a torn
/// read that self-corrects on the next re-evaluation.
#[derive(Debug, Default)]
pub struct TenantState {
    /// Counters and utilization, guarded together since the delay
    /// controller reads utilization computed from a consistent snapshot
    /// of all three counters.
    pub counters: Mutex<TenantCounters>,
    /// Current per-operation delay in microseconds, `[0, delay_ceiling]`.
    /// Read/written without holding `counters`'s lock.
    pub io_delay: AtomicU16,
    /// Observability totals, independent of the control loop.
    pub totals: TenantIoTotals,
}

impl TenantState {
    /// Current delay, in microseconds. Safe to call from any thread without
    /// coordination; see the module docs on `io_delay`.
    pub fn delay_us(&self) -> u16 {
        self.io_delay.load(Ordering::Relaxed)
    }

    pub(crate) fn set_delay_us(&self, delay: u16) {
        self.io_delay.store(delay, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_tenant_is_excluded() {
        assert!(TenantId::GLOBAL.is_global());
        assert!(!TenantId(1).is_global());
    }

    #[test]
    fn totals_accumulate_independently_of_counters() {
        let state = TenantState::default();
        state.totals.record_logical_write(512);
        state.totals.record_logical_write(256);
        assert_eq!(state.totals.logical_write_ops.load(Ordering::Relaxed), 2);
        assert_eq!(
            state.totals.logical_write_bytes.load(Ordering::Relaxed),
            768
        );
        assert_eq!(state.delay_us(), 0);
    }

    #[test]
    fn delay_is_readable_without_the_counters_lock() {
        let state = TenantState::default();
        // Simulate the delay controller writing a new delay while a
        // reader (the throttle fast path) checks it concurrently; both
        // use independent synchronization.
        state.set_delay_us(42);
        assert_eq!(state.delay_us(), 42);
    }
}
