use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::ops::ControlFlow;

use criterion::{criterion_group, criterion_main, Criterion};

use evo_throttle_common::config::ThrottleConfig;
use evo_zone_throttle::{
    Clock, LogicalOp, Sleeper, TenantId, TenantIo, TenantRegistry, TenantState, ZoneThrottle,
};

struct BenchTenant {
    id: TenantId,
    state: TenantState,
}
impl TenantIo for BenchTenant {
    fn id(&self) -> TenantId {
        self.id
    }
    fn throttle_state(&self) -> &TenantState {
        &self.state
    }
}

struct BenchRegistry {
    tenants: RefCell<HashMap<u32, BenchTenant>>,
    order: Vec<u32>,
}

impl TenantRegistry for BenchRegistry {
    type Tenant = BenchTenant;
    type TenantRef<'a> = Ref<'a, BenchTenant>;

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

struct BenchClock {
    now: Cell<u64>,
}
impl Clock for BenchClock {
    fn now_micros(&self) -> u64 {
        self.now.get()
    }
}

struct BenchSleeper;
impl Sleeper for BenchSleeper {
    fn sleep_micros(&self, _micros: u64) {}
}

fn steady_state_logical_write(c: &mut Criterion) {
    let ids: Vec<u32> = (1..=16).collect();
    let mut map = HashMap::new();
    for &id in &ids {
        map.insert(
            id,
            BenchTenant {
                id: TenantId(id),
                state: TenantState::default(),
            },
        );
    }
    let eng = ZoneThrottle::new(
        ThrottleConfig::default(),
        BenchRegistry {
            tenants: RefCell::new(map),
            order: ids,
        },
        BenchClock { now: Cell::new(0) },
        BenchSleeper,
    );

    let mut now = 0u64;
    c.bench_function("on_logical_op steady state, 16 tenants", |b| {
        b.iter(|| {
            now += 10;
            eng.clock.now.set(now);
            eng.on_logical_op(LogicalOp::Write, 4096, TenantId(1 + (now % 16) as u32));
        })
    });
}

criterion_group!(benches, steady_state_logical_write);
criterion_main!(benches);
