use crate::{
    Error, FixedHostId, FlakeGenerator, FlakeId, HostResolutionError, HostResolver, MAX_HOST_ID,
    MAX_SEQUENCE, SystemClock, TimeSource,
};
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::scope;

struct MockTime {
    millis: u64,
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl TimeSource for SharedMockStepTime {
    fn current_millis(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

fn step_time(values: Vec<u64>) -> SharedMockStepTime {
    SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values,
            index: Cell::new(0),
        }),
    }
}

/// A clock threads can share and tests can move by hand.
#[derive(Clone)]
struct AtomicMockTime {
    millis: Arc<AtomicU64>,
}

impl TimeSource for AtomicMockTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::Relaxed)
    }
}

struct FailingResolver;

impl HostResolver for FailingResolver {
    fn resolve_host_id(&self) -> Result<u64, HostResolutionError> {
        Err(HostResolutionError::NoAddress {
            hostname: "nowhere".to_owned(),
        })
    }
}

/// Checks the per-generator ordering properties over ids in issue order.
fn assert_k_sorted(ids: &[FlakeId], host_id: u64) {
    for pair in ids.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        assert!(next > prev, "{next:?} not after {prev:?}");
        assert!(next.timestamp() >= prev.timestamp());
        if next.timestamp() == prev.timestamp() {
            assert!(next.sequence() > prev.sequence());
        }
    }
    assert!(ids.iter().all(|id| id.host_id() == host_id));
}

#[test]
fn sequence_increments_within_same_tick() {
    let generator = FlakeGenerator::with_resolver(&FixedHostId(5), MockTime { millis: 1000 })
        .expect("fixed resolver never fails");

    let id1 = generator.next_id();
    let id2 = generator.next_id();

    assert_eq!(id1.timestamp(), 1000);
    assert_eq!(id2.timestamp(), 1000);
    assert_eq!(id1.host_id(), 5);
    assert_eq!(id2.host_id(), 5);
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id1.to_raw(), (1000 << 23) | (5 << 13));
    assert!(id1 < id2);
}

#[test]
fn new_tick_resets_sequence() {
    let time = step_time(vec![42, 43]);
    let generator = FlakeGenerator::from_components(42, 1, 0, time.clone());

    for i in 0..3 {
        let id = generator.next_id();
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.sequence(), i);
    }

    time.clock.index.set(1);
    let id = generator.next_id();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn sequence_exhaustion_advances_virtual_clock() {
    let generator = FlakeGenerator::from_components(1000, 5, 0, MockTime { millis: 1000 });

    let mut ids = Vec::with_capacity(MAX_SEQUENCE as usize + 3);
    for i in 0..=MAX_SEQUENCE {
        let id = generator.next_id();
        assert_eq!(id.timestamp(), 1000);
        assert_eq!(id.sequence(), i);
        ids.push(id);
    }

    // The 8193rd call borrows the next millisecond.
    let rolled = generator.next_id();
    assert_eq!(rolled.timestamp(), 1001);
    assert_eq!(rolled.sequence(), 0);
    ids.push(rolled);

    // The clock is still at 1000, so it is clamped to the borrowed tick.
    let after = generator.next_id();
    assert_eq!(after.timestamp(), 1001);
    assert_eq!(after.sequence(), 1);
    ids.push(after);

    assert_k_sorted(&ids, 5);
    assert_eq!(generator.clock_regressions(), 0);
}

#[test]
fn catching_up_after_borrowed_tick_is_not_a_regression() {
    let time = step_time(vec![1000, 1000, 999]);
    let generator = FlakeGenerator::from_components(1000, 5, 0, time.clone());

    for _ in 0..=MAX_SEQUENCE {
        generator.next_id();
    }
    // Borrow 1001, then keep reading 1000 while the timestamp stays ahead.
    for _ in 0..3 {
        assert_eq!(generator.next_id().timestamp(), 1001);
    }
    assert_eq!(generator.clock_regressions(), 0);

    time.clock.index.set(1);
    generator.next_id();
    assert_eq!(generator.clock_regressions(), 0);

    // A reading below the previous one is a real step backwards.
    time.clock.index.set(2);
    let id = generator.next_id();
    assert_eq!(id.timestamp(), 1001);
    assert_eq!(generator.clock_regressions(), 1);

    // Staying at the regressed reading is not counted again.
    generator.next_id();
    assert_eq!(generator.clock_regressions(), 1);
}

#[test]
fn exhausted_state_rolls_on_first_call() {
    let generator =
        FlakeGenerator::from_components(7, 0, MAX_SEQUENCE + 1, MockTime { millis: 7 });
    let id = generator.next_id();
    assert_eq!(id.timestamp(), 8);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn clock_regression_reuses_last_timestamp() {
    let time = step_time(vec![1000, 900, 1002]);
    let generator = FlakeGenerator::with_resolver(&FixedHostId(3), time.clone()).unwrap();

    let first = generator.next_id();
    assert_eq!(first.timestamp(), 1000);
    assert_eq!(first.sequence(), 0);

    time.clock.index.set(1);
    let regressed = generator.next_id();
    assert_eq!(regressed.timestamp(), 1000);
    assert_eq!(regressed.sequence(), 1);
    assert!(regressed > first);

    time.clock.index.set(2);
    let recovered = generator.next_id();
    assert_eq!(recovered.timestamp(), 1002);
    assert_eq!(recovered.sequence(), 0);
    assert_eq!(generator.clock_regressions(), 1);
}

#[test]
fn clock_regression_before_first_call_uses_construction_time() {
    let time = step_time(vec![1000, 400]);
    let generator = FlakeGenerator::with_resolver(&FixedHostId(0), time.clone()).unwrap();

    time.clock.index.set(1);
    let id = generator.next_id();
    assert_eq!(id.timestamp(), 1000);
    assert_eq!(id.sequence(), 0);
    assert_eq!(generator.clock_regressions(), 1);
}

#[test]
fn construction_seeds_from_clock() {
    let generator = FlakeGenerator::with_resolver(&FixedHostId(9), MockTime { millis: 77 }).unwrap();
    assert_eq!(generator.host_id(), 9);
    assert_eq!(generator.time().current_millis(), 77);
    let debug = format!("{generator:?}");
    assert!(debug.contains("timestamp: 77"));
    assert!(debug.contains("sequence: 0"));
}

#[test]
fn max_host_id_is_accepted() {
    let generator =
        FlakeGenerator::with_resolver(&FixedHostId(MAX_HOST_ID), MockTime { millis: 1 }).unwrap();
    assert_eq!(generator.next_id().host_id(), MAX_HOST_ID);
}

#[test]
fn out_of_range_host_id_is_rejected() {
    let err = FlakeGenerator::with_resolver(&FixedHostId(MAX_HOST_ID + 1), MockTime { millis: 1 })
        .unwrap_err();
    assert!(matches!(
        err,
        Error::HostResolution(HostResolutionError::HostIdOutOfRange {
            host_id: 1024,
            max: 1023
        })
    ));
}

#[test]
fn resolver_failure_propagates() {
    let err = FlakeGenerator::with_resolver(&FailingResolver, MockTime { millis: 1 }).unwrap_err();
    assert!(matches!(
        err,
        Error::HostResolution(HostResolutionError::NoAddress { .. })
    ));
    assert_eq!(
        err.to_string(),
        "hostname `nowhere` did not resolve to any address"
    );
}

#[test]
fn from_components_truncates_host_id() {
    let generator = FlakeGenerator::from_components(1, MAX_HOST_ID + 6, 0, MockTime { millis: 1 });
    assert_eq!(generator.host_id(), 5);
}

#[test]
fn system_clock_ids_are_k_sorted() {
    const TOTAL_IDS: usize = 8192 * 64;

    let generator = FlakeGenerator::with_resolver(&FixedHostId(1), SystemClock::default()).unwrap();
    let ids: Vec<FlakeId> = (0..TOTAL_IDS).map(|_| generator.next_id()).collect();

    assert_k_sorted(&ids, 1);
}

#[test]
fn threaded_ids_are_unique_and_ordered_per_thread() {
    const THREADS: usize = 8;
    const IDS_PER_THREAD: usize = 8192 * 16;

    let generator = FlakeGenerator::with_resolver(&FixedHostId(2), SystemClock::default()).unwrap();

    let per_thread: Vec<Vec<FlakeId>> = scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    (0..IDS_PER_THREAD)
                        .map(|_| generator.next_id())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut seen = HashSet::with_capacity(THREADS * IDS_PER_THREAD);
    for ids in &per_thread {
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        for id in ids {
            assert_eq!(id.host_id(), 2);
            assert!(seen.insert(*id), "duplicate id {id:?}");
        }
    }
    assert_eq!(seen.len(), THREADS * IDS_PER_THREAD);
}

#[test]
fn threaded_fixed_clock_total_order() {
    const THREADS: usize = 4;
    const IDS_PER_THREAD: usize = 8192;

    let time = AtomicMockTime {
        millis: Arc::new(AtomicU64::new(500)),
    };
    let generator = FlakeGenerator::from_components(500, 4, 0, time);

    scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..IDS_PER_THREAD {
                    generator.next_id();
                }
            });
        }
    });

    // 4 * 8192 ids issued in one clock tick spill into exactly 4 virtual
    // ticks, so the next id lands at the start of the fifth.
    let next = generator.next_id();
    assert_eq!(next.timestamp(), 504);
    assert_eq!(next.sequence(), 0);
    assert_eq!(generator.clock_regressions(), 0);
}

#[test]
fn distinct_hosts_never_collide() {
    let time = AtomicMockTime {
        millis: Arc::new(AtomicU64::new(10)),
    };
    let a = FlakeGenerator::with_resolver(&FixedHostId(1), time.clone()).unwrap();
    let b = FlakeGenerator::with_resolver(&FixedHostId(2), time.clone()).unwrap();

    let mut seen = HashSet::new();
    for _ in 0..1000 {
        assert!(seen.insert(a.next_id()));
        assert!(seen.insert(b.next_id()));
    }

    time.millis.store(11, Ordering::Relaxed);
    assert_eq!(a.next_id().timestamp(), 11);
}
