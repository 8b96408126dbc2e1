//! Host-provided collaborators.
//!
//! The throttling engine never owns tenant storage, a clock, or a sleep
//! primitive — it borrows them from the host storage stack through the
//! traits in this module. None of these traits require the engine to know
//! how tenants are stored or enumerated internally; `for_each_active` is a
//! higher-order callback rather than a C-style callback-plus-context-word,
//! and `TenantRef`'s `Drop` impl stands in for an explicit release call.

use std::cell::Cell;
use std::ops::{ControlFlow, Deref};

use crate::latency::IoDirection;
use crate::tenant::{TenantId, TenantState};

/// Anything the throttle can read a [`TenantState`] and identifier out of.
pub trait TenantIo {
    /// This tenant's identifier.
    fn id(&self) -> TenantId;
    /// This tenant's throttle state.
    fn throttle_state(&self) -> &TenantState;
}

/// The host's tenant directory: enumeration and point lookup.
///
/// Enumeration takes a closure instead of a callback plus a context
/// pointer, and releasing a looked-up tenant is just dropping the
/// returned reference rather than calling back into the host.
pub trait TenantRegistry {
    /// Concrete tenant record type this registry stores.
    type Tenant: TenantIo;
    /// A borrowed handle to a tenant, released on drop.
    type TenantRef<'a>: Deref<Target = Self::Tenant>
    where
        Self: 'a;

    /// Invoke `f` for each live tenant. Enumeration stops early if `f`
    /// returns [`ControlFlow::Break`].
    fn for_each_active<F>(&self, f: F)
    where
        F: FnMut(&Self::Tenant) -> ControlFlow<()>;

    /// Look up a tenant by identifier. Returns `None` if the tenant has
    /// since been destroyed.
    fn find(&self, id: TenantId) -> Option<Self::TenantRef<'_>>;
}

/// A monotonic microsecond clock, supplied by the host.
pub trait Clock {
    /// Current time, in microseconds, from an arbitrary but monotonic
    /// epoch.
    fn now_micros(&self) -> u64;
}

/// A blocking delay primitive, supplied by the host.
pub trait Sleeper {
    /// Block the calling thread for approximately `micros` microseconds.
    fn sleep_micros(&self, micros: u64);
}

/// Per-I/O bookkeeping the storage pipeline carries through its pipeline
/// stages, from submission to completion.
///
/// Stands in for the original `zio_t` fields the throttle touches
/// (`io_zoneid`, `io_start`, `io_type`, `io_size`); the storage pipeline
/// that owns the rest of the I/O request is out of scope for this crate.
#[derive(Debug, Default)]
pub struct ZioHandle {
    zone_id: Cell<Option<TenantId>>,
    start: Cell<Option<u64>>,
    /// Direction of this physical I/O.
    pub io_type: Cell<Option<IoDirection>>,
    /// Size of this physical I/O, in bytes.
    pub size: Cell<u64>,
}

impl ZioHandle {
    /// A handle for an I/O of the given direction and size, not yet
    /// stamped with a tenant or start time.
    pub fn new(io_type: IoDirection, size: u64) -> Self {
        Self {
            zone_id: Cell::new(None),
            start: Cell::new(None),
            io_type: Cell::new(Some(io_type)),
            size: Cell::new(size),
        }
    }

    pub(crate) fn stamp_zone(&self, id: TenantId) {
        self.zone_id.set(Some(id));
    }

    pub(crate) fn stamp_start(&self, now: u64) {
        self.start.set(Some(now));
    }

    pub(crate) fn zone_id(&self) -> Option<TenantId> {
        self.zone_id.get()
    }

    pub(crate) fn start(&self) -> Option<u64> {
        self.start.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zio_handle_starts_unstamped() {
        let zio = ZioHandle::new(IoDirection::Read, 4096);
        assert!(zio.zone_id().is_none());
        assert!(zio.start().is_none());
    }

    #[test]
    fn zio_handle_records_stamps() {
        let zio = ZioHandle::new(IoDirection::Write, 8192);
        zio.stamp_zone(TenantId(7));
        zio.stamp_start(1_234);
        assert_eq!(zio.zone_id(), Some(TenantId(7)));
        assert_eq!(zio.start(), Some(1_234));
    }
}
