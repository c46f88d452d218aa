use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use stablecall::{install, CallSite, UnitConfig};

/// A result that embeds its inputs, so any observer can verify that the pair
/// it got back is internally consistent.
fn mix(a: u64, b: u64) -> u64 {
    a.wrapping_mul(0x9e3779b97f4a7c15).wrapping_add(b)
}

/// Racing lock-free writers never let a caller observe a torn pair.
#[test]
fn test_no_torn_reads() {
    let entry = install(UnitConfig::stateful().lockfree(), |&(a, b): &(u64, u64)| {
        (a, b, mix(a, b))
    })
    .unwrap();

    thread::scope(|scope| {
        for writer in 0..4u64 {
            let entry = &entry;
            scope.spawn(move || {
                let mut state = writer + 1;
                for _ in 0..2000 {
                    // Cheap xorshift keeps the writers publishing fresh pairs.
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    let (a, b) = (state, state ^ writer);
                    let (ra, rb, rm) = entry.call((a, b));
                    assert_eq!((ra, rb), (a, b));
                    assert_eq!(rm, mix(ra, rb));
                }
            });
        }
        for reader in 0..4u64 {
            let entry = &entry;
            scope.spawn(move || {
                for i in 0..2000 {
                    let (ra, rb, rm) = entry.call((reader, i));
                    assert_eq!((ra, rb), (reader, i));
                    assert_eq!(rm, mix(ra, rb));
                }
            });
        }
    });

    // The unit settles into a stable generation once the churn stops.
    assert_eq!(entry.call((3, 4)), (3, 4, mix(3, 4)));
    assert_eq!(entry.call((3, 4)), (3, 4, mix(3, 4)));
}

/// Under the mutex mode, callers racing on equal arguments compute once.
#[test]
fn test_mutex_suppresses_duplicate_recompute() {
    static COUNT: AtomicU32 = AtomicU32::new(0);

    let entry = install(UnitConfig::stateful(), |&(x,): &(u64,)| {
        COUNT.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        x * 2
    })
    .unwrap();

    thread::scope(|scope| {
        for _ in 0..8 {
            let entry = &entry;
            scope.spawn(move || assert_eq!(entry.call((21,)), 42));
        }
    });

    assert_eq!(COUNT.load(Ordering::SeqCst), 1);
}

/// A pure lock-free unit may compute duplicates under a race, but every
/// caller gets the first published value and it never changes again.
#[test]
fn test_pure_first_publication_wins() {
    let entry = install(UnitConfig::pure().lockfree(), |&(x,): &(u32,)| {
        thread::sleep(Duration::from_millis(10));
        u64::from(x) << 32 | 1
    })
    .unwrap();

    let results: Vec<u64> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let entry = &entry;
                scope.spawn(move || entry.call((i,)))
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    let settled = entry.call((99,));
    for result in results {
        assert_eq!(result, settled);
    }
}

/// A mutex-mode pure unit computes exactly once under a race.
#[test]
fn test_pure_mutex_computes_once() {
    static COUNT: AtomicU32 = AtomicU32::new(0);

    let entry = install(UnitConfig::pure(), |&(x,): &(u32,)| {
        COUNT.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        x
    })
    .unwrap();

    thread::scope(|scope| {
        for i in 0..8u32 {
            let entry = &entry;
            scope.spawn(move || entry.call((i,)));
        }
    });

    assert_eq!(COUNT.load(Ordering::SeqCst), 1);
}

/// Racing first uses of a call site install its unit exactly once.
#[test]
fn test_install_once_under_race() {
    static SITE: CallSite<(u32,), u32> = CallSite::new();
    static INSTALLS: AtomicU32 = AtomicU32::new(0);
    static RUNS: AtomicU32 = AtomicU32::new(0);

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let result = SITE.invoke(
                    || {
                        INSTALLS.fetch_add(1, Ordering::SeqCst);
                        (UnitConfig::stateful(), |&(x,): &(u32,)| {
                            RUNS.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            x + 1
                        })
                    },
                    (5,),
                );
                assert_eq!(result, 6);
            });
        }
    });

    assert_eq!(INSTALLS.load(Ordering::SeqCst), 1);
    assert_eq!(RUNS.load(Ordering::SeqCst), 1);
}
