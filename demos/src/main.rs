//! Zone throttle simulation
//!
//! Drives `evo_zone_throttle` through its entry points against a fake,
//! in-memory tenant registry: one heavy tenant and one light tenant
//! sharing a storage subsystem, so the delay controller's climb/drain
//! behavior is visible in the trace output.

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::ops::ControlFlow;
use std::time::{SystemTime, UNIX_EPOCH};

use evo_throttle_common::config::ThrottleConfig;
use evo_zone_throttle::latency::IoDirection;
use evo_zone_throttle::{
    Clock, LogicalOp, Sleeper, TenantId, TenantIo, TenantRegistry, TenantState, ZioHandle,
    ZoneThrottle,
};
use tracing::info;

struct SimTenant {
    id: TenantId,
    state: TenantState,
}
impl TenantIo for SimTenant {
    fn id(&self) -> TenantId {
        self.id
    }
    fn throttle_state(&self) -> &TenantState {
        &self.state
    }
}

struct SimRegistry {
    tenants: RefCell<HashMap<u32, SimTenant>>,
    order: Vec<u32>,
}

impl TenantRegistry for SimRegistry {
    type Tenant = SimTenant;
    type TenantRef<'a> = Ref<'a, SimTenant>;

    fn for_each_active<F>(&self, mut f: F)
    where
        F: FnMut(&Self::Tenant) -> ControlFlow<()>,
    {
        for id in &self.order {
            let tenants = self.tenants.borrow();
            if let Some(t) = tenants.get(id) {
                if f(t).is_break() {
                    break;
                }
            }
        }
    }

    fn find(&self, id: TenantId) -> Option<Self::TenantRef<'_>> {
        let tenants = self.tenants.borrow();
        if tenants.contains_key(&id.0) {
            Some(Ref::map(tenants, |m| m.get(&id.0).unwrap()))
        } else {
            None
        }
    }
}

/// A fake clock, stepped manually so the simulation runs instantly
/// instead of sleeping in real time.
struct SimClock {
    now: Cell<u64>,
}
impl Clock for SimClock {
    fn now_micros(&self) -> u64 {
        self.now.get()
    }
}

struct LoggingSleeper;
impl Sleeper for LoggingSleeper {
    fn sleep_micros(&self, micros: u64) {
        info!(micros, "simulated delay sleep");
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    info!("zone throttle simulation starting");

    let mut tenants = HashMap::new();
    tenants.insert(
        1,
        SimTenant {
            id: TenantId(1),
            state: TenantState::default(),
        },
    );
    tenants.insert(
        2,
        SimTenant {
            id: TenantId(2),
            state: TenantState::default(),
        },
    );

    let throttle = ZoneThrottle::new(
        ThrottleConfig::default(),
        SimRegistry {
            tenants: RefCell::new(tenants),
            order: vec![1, 2],
        },
        SimClock { now: Cell::new(epoch_now_micros()) },
        LoggingSleeper,
    );

    let mut now = throttle.clock.now.get();
    for round in 0..40 {
        now += 150_000;
        throttle.clock.now.set(now);

        // Tenant 1 is heavy: twenty writes per round.
        for _ in 0..20 {
            run_write(&throttle, TenantId(1), 400);
        }
        // Tenant 2 is light: one write per round.
        run_write(&throttle, TenantId(2), 400);

        let heavy_delay = throttle.registry.tenants.borrow()[&1].state.delay_us();
        let light_delay = throttle.registry.tenants.borrow()[&2].state.delay_us();
        info!(round, heavy_delay, light_delay, "throttle state");
    }
}

fn run_write(
    throttle: &ZoneThrottle<SimRegistry, SimClock, LoggingSleeper>,
    tenant: TenantId,
    latency_us: u64,
) {
    throttle.on_logical_op(LogicalOp::Write, 4096, tenant);
    let zio = ZioHandle::new(IoDirection::Write, 4096);
    throttle.on_zio_init(&zio, tenant);
    throttle.on_physical_start(&zio);
    throttle.clock.now.set(throttle.clock.now.get() + latency_us);
    throttle.on_physical_done(&zio);
}

fn epoch_now_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
