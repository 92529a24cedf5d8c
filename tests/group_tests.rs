//! Integration Tests for Groups
//!
//! Exercises groups through the public API, including concurrent callers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use mini_groupcache::{get_group, new_group, CacheError, GroupRegistry};
use tokio_test::{assert_err, assert_ok};

fn slow_loader(calls: Arc<AtomicUsize>) -> impl Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync {
    move |key: &str| -> anyhow::Result<Vec<u8>> {
        calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        if key.starts_with("bad") {
            anyhow::bail!("no row for {}", key);
        }
        Ok(format!("value-of-{}", key).into_bytes())
    }
}

#[test]
fn test_concurrent_gets_share_cache() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = GroupRegistry::new();
    let group = registry.new_group("concurrent", 0, slow_loader(calls.clone()));

    // Warm the keys, then hammer them from many threads
    for i in 0..10 {
        assert_ok!(group.get(&format!("key{}", i)));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 10);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let group = group.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    let key = format!("key{}", i);
                    let value = group.get(&key).unwrap();
                    assert_eq!(value.to_string(), format!("value-of-{}", key));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(calls.load(Ordering::SeqCst), 10);
    assert_eq!(group.stats().hits, 80);
}

#[test]
fn test_concurrent_misses_may_load_repeatedly() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = GroupRegistry::new();
    let group = registry.new_group("stampede", 0, slow_loader(calls.clone()));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let group = group.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                group.get("shared").unwrap().to_string()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "value-of-shared");
    }

    // No single-flight: between one and four loads, one cached entry
    let loads = calls.load(Ordering::SeqCst);
    assert!((1..=4).contains(&loads));
    assert_eq!(group.stats().entries, 1);
}

#[test]
fn test_slow_loader_does_not_block_hits() {
    let (started_tx, started_rx) = mpsc::channel::<()>();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let started_tx = Mutex::new(started_tx);
    let release_rx = Mutex::new(release_rx);

    let registry = GroupRegistry::new();
    // "cold" stays in the loader until the test thread lets it go
    let group = registry.new_group("nonblocking", 0, move |key: &str| -> anyhow::Result<Vec<u8>> {
        if key == "cold" {
            started_tx.lock().unwrap().send(())?;
            release_rx
                .lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(5))
                .map_err(|_| anyhow::anyhow!("cold load never released"))?;
        }
        Ok(format!("value-of-{}", key).into_bytes())
    });
    assert_ok!(group.get("hot"));

    let loading = {
        let group = group.clone();
        thread::spawn(move || group.get("cold").map(|v| v.to_string()))
    };
    started_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("cold load started");

    // Served while the "cold" loader is still parked
    let served = Instant::now();
    for _ in 0..100 {
        assert_eq!(assert_ok!(group.get("hot")).to_string(), "value-of-hot");
    }
    assert!(served.elapsed() < Duration::from_secs(2));
    assert!(!loading.is_finished());

    release_tx.send(()).unwrap();
    assert_eq!(loading.join().unwrap().unwrap(), "value-of-cold");
    assert_eq!(group.stats().hits, 100);
}

#[test]
fn test_errors_reach_the_caller() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = GroupRegistry::new();
    let group = registry.new_group("errors", 0, slow_loader(calls.clone()));

    let err = assert_err!(group.get("bad-row"));
    assert_eq!(err.to_string(), "no row for bad-row");
    assert!(matches!(assert_err!(group.get("")), CacheError::InvalidKey));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_eviction_reloads_from_loader() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = GroupRegistry::new();
    // "k1" + "value-of-k1" is 13 bytes, so two entries fit but not three
    let group = registry.new_group("small", 30, slow_loader(calls.clone()));

    assert_ok!(group.get("k1"));
    assert_ok!(group.get("k2"));
    assert_ok!(group.get("k3"));
    assert_eq!(group.stats().entries, 2);

    assert_ok!(group.get("k1"));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_global_registry_lookup() {
    let calls = Arc::new(AtomicUsize::new(0));
    new_group("global-scores", 1024, slow_loader(calls));

    let group = get_group("global-scores").expect("group registered");
    assert_eq!(group.name(), "global-scores");
    assert!(get_group("global-missing").is_none());
}
