//! Per-tenant I/O throttle.
//!
//! A storage stack embeds a [`engine::ZoneThrottle`] and calls its four
//! entry points (`on_zio_init`, `on_logical_op`, `on_physical_start`,
//! `on_physical_done`) from the points in its pipeline where a logical
//! operation is accepted, a physical I/O is queued, dispatched, and
//! completed. The throttle tracks decaying per-tenant read/write/logical-write
//! rates and a system-wide latency average, periodically recomputing each
//! tenant's utilization relative to its peers and nudging a per-tenant
//! delay up or down so that one noisy tenant cannot starve the others.
//!
//! The engine never owns tenant storage, timekeeping, or sleeping — see
//! [`registry::TenantRegistry`], [`registry::Clock`], and
//! [`registry::Sleeper`] for the interfaces a host implements.

pub mod controller;
pub mod counter;
pub mod engine;
pub mod estimator;
pub mod latency;
pub mod probes;
pub mod registry;
pub mod tenant;

pub use engine::{LogicalOp, ThrottleContext, Tunables, ZoneThrottle};
pub use registry::{Clock, Sleeper, TenantIo, TenantRegistry, ZioHandle};
pub use tenant::{TenantId, TenantState};
