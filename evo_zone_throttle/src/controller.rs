//! Delay controller.
//!
//! A bang-bang controller around the mean utilization: tenants above
//! average climb toward the ceiling one step at a time, tenants at or
//! below it drain back toward zero. There is no PID here — the throttle
//! only ever needs "push away from average", not a setpoint tracker.

/// Compute the next delay for one tenant, given its utilization, the
/// cross-tenant average, and how many tenants are currently active.
///
/// `active_tenants <= 1` always drains the delay: an isolated tenant has
/// nothing to be throttled relative to.
pub fn next_delay(
    current_delay: u16,
    io_util: u64,
    avg_util: u64,
    active_tenants: u32,
    step: u16,
    ceiling: u16,
) -> u16 {
    if io_util > avg_util && current_delay < ceiling && active_tenants > 1 {
        current_delay.saturating_add(step).min(ceiling)
    } else if io_util < avg_util || active_tenants <= 1 {
        current_delay.saturating_sub(step)
    } else {
        current_delay
    }
}
