// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Named Lock Function Tests
// Reference: MySQL 8.0 manual, "Locking Functions" (GET_LOCK, RELEASE_LOCK,
//            IS_FREE_LOCK, IS_USED_LOCK, RELEASE_ALL_LOCKS)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use embersql_rust::{AttributeValue, EmberError};

use super::common::{engine, eval, int, s, try_eval};

/// A second session cannot take a held lock without waiting, and can once it
/// is released.
/// Reference: GET_LOCK with timeout 0
#[test]
fn lock_mutual_exclusion() {
    let engine = engine();
    let a = engine.open_session();
    let b = engine.open_session();

    assert_eq!(eval(&engine, &a, "GET_LOCK", vec![s("x"), int(0)]), AttributeValue::Int(1));
    assert_eq!(eval(&engine, &b, "GET_LOCK", vec![s("x"), int(0)]), AttributeValue::Int(0));
    assert_eq!(eval(&engine, &a, "RELEASE_LOCK", vec![s("x")]), AttributeValue::Int(1));
    assert_eq!(eval(&engine, &b, "GET_LOCK", vec![s("x"), int(0)]), AttributeValue::Int(1));
}

/// Re-acquiring a lock the session already owns succeeds and does not nest.
#[test]
fn lock_reacquire_is_idempotent() {
    let engine = engine();
    let a = engine.open_session();
    assert_eq!(eval(&engine, &a, "get_lock", vec![s("x"), int(0)]), AttributeValue::Int(1));
    assert_eq!(eval(&engine, &a, "get_lock", vec![s("x"), int(0)]), AttributeValue::Int(1));
    assert_eq!(eval(&engine, &a, "release_lock", vec![s("x")]), AttributeValue::Int(1));
    assert_eq!(eval(&engine, &a, "is_free_lock", vec![s("x")]), AttributeValue::Int(1));
}

/// RELEASE_LOCK three-way result: 1 released, 0 not owner, NULL unknown.
/// Reference: RELEASE_LOCK
#[test]
fn lock_release_tri_state() {
    let engine = engine();
    let a = engine.open_session();
    let b = engine.open_session();

    assert_eq!(eval(&engine, &a, "get_lock", vec![s("x"), int(0)]), AttributeValue::Int(1));
    assert_eq!(eval(&engine, &b, "release_lock", vec![s("x")]), AttributeValue::Int(0));
    assert_eq!(
        eval(&engine, &b, "is_used_lock", vec![s("x")]),
        AttributeValue::UInt(a.session_id())
    );
    assert_eq!(eval(&engine, &b, "release_lock", vec![s("never")]), AttributeValue::Null);
    assert_eq!(eval(&engine, &a, "release_lock", vec![s("x")]), AttributeValue::Int(1));
    // released locks stay known, so a second release is "not owner" rather than unknown
    assert_eq!(eval(&engine, &a, "release_lock", vec![s("x")]), AttributeValue::Int(0));
}

/// Reference: IS_FREE_LOCK / IS_USED_LOCK
#[test]
fn lock_state_queries() {
    let engine = engine();
    let a = engine.open_session();
    assert_eq!(eval(&engine, &a, "is_free_lock", vec![s("q")]), AttributeValue::Int(1));
    assert_eq!(eval(&engine, &a, "is_used_lock", vec![s("q")]), AttributeValue::Null);

    eval(&engine, &a, "get_lock", vec![s("q"), int(0)]);
    assert_eq!(eval(&engine, &a, "is_free_lock", vec![s("q")]), AttributeValue::Int(0));
    assert_eq!(
        eval(&engine, &a, "is_used_lock", vec![s("q")]),
        AttributeValue::UInt(a.session_id())
    );
}

/// Reference: RELEASE_ALL_LOCKS returns the number of locks released
#[test]
fn lock_release_all_counts_and_is_idempotent() {
    let engine = engine();
    let a = engine.open_session();
    let b = engine.open_session();

    assert_eq!(eval(&engine, &a, "release_all_locks", vec![]), AttributeValue::Long(0));
    assert_eq!(eval(&engine, &a, "release_all_locks", vec![]), AttributeValue::Long(0));

    for name in ["l1", "l2", "l3"] {
        eval(&engine, &a, "get_lock", vec![s(name), int(0)]);
    }
    eval(&engine, &b, "get_lock", vec![s("other"), int(0)]);

    assert_eq!(eval(&engine, &a, "release_all_locks", vec![]), AttributeValue::Long(3));
    assert_eq!(eval(&engine, &a, "release_all_locks", vec![]), AttributeValue::Long(0));
    assert_eq!(eval(&engine, &a, "is_free_lock", vec![s("l2")]), AttributeValue::Int(1));
    assert_eq!(eval(&engine, &a, "is_free_lock", vec![s("other")]), AttributeValue::Int(0));
}

/// NULL name or timeout yields NULL; a non-string name is rejected.
#[test]
fn lock_argument_handling() {
    let engine = engine();
    let a = engine.open_session();
    assert_eq!(
        eval(&engine, &a, "get_lock", vec![AttributeValue::Null, int(0)]),
        AttributeValue::Null
    );
    assert_eq!(
        eval(&engine, &a, "get_lock", vec![s("x"), AttributeValue::Null]),
        AttributeValue::Null
    );
    assert_eq!(
        eval(&engine, &a, "release_lock", vec![AttributeValue::Null]),
        AttributeValue::Null
    );
    assert!(matches!(
        try_eval(&engine, &a, "get_lock", vec![int(7), int(0)]),
        Err(EmberError::IllegalArgumentType { .. })
    ));
    assert!(matches!(
        try_eval(&engine, &a, "get_lock", vec![s("x"), s("soon")]),
        Err(EmberError::InvalidArgument { .. })
    ));
    assert!(matches!(
        try_eval(&engine, &a, "is_free_lock", vec![]),
        Err(EmberError::InvalidArgumentNumber { .. })
    ));
}

/// A waiter with a positive timeout is granted the lock as soon as the owner
/// releases it.
#[test]
fn lock_waiter_wakes_on_release() {
    let engine = engine();
    let owner = engine.open_session();
    eval(&engine, &owner, "get_lock", vec![s("w"), int(0)]);

    let (started_tx, started_rx) = bounded(1);
    let waiter_engine = Arc::clone(&engine);
    let waiter = thread::spawn(move || {
        let ctx = waiter_engine.open_session();
        started_tx.send(()).unwrap();
        let start = Instant::now();
        let got = waiter_engine
            .evaluate(&ctx, "get_lock", vec![s("w"), int(10)])
            .unwrap();
        (got, start.elapsed())
    });

    started_rx.recv().unwrap();
    thread::sleep(Duration::from_millis(50));
    assert_eq!(eval(&engine, &owner, "release_lock", vec![s("w")]), AttributeValue::Int(1));

    let (got, waited) = waiter.join().unwrap();
    assert_eq!(got, AttributeValue::Int(1));
    assert!(waited < Duration::from_secs(5));
}

/// A positive timeout that expires returns 0.
#[test]
fn lock_timeout_returns_zero() {
    let engine = engine();
    let a = engine.open_session();
    let b = engine.open_session();
    eval(&engine, &a, "get_lock", vec![s("t"), int(0)]);

    let start = Instant::now();
    assert_eq!(eval(&engine, &b, "get_lock", vec![s("t"), int(1)]), AttributeValue::Int(0));
    assert!(start.elapsed() >= Duration::from_millis(900));
}

/// Killing the query of a waiting session interrupts GET_LOCK.
#[test]
fn lock_wait_is_cancellable() {
    let engine = engine();
    let owner = engine.open_session();
    eval(&engine, &owner, "get_lock", vec![s("c"), int(0)]);

    let waiter_ctx = engine.open_session();
    let cancellation = waiter_ctx.cancellation().clone();
    let waiter_engine = Arc::clone(&engine);
    let waiter = thread::spawn(move || {
        let start = Instant::now();
        let result = waiter_engine.evaluate(&waiter_ctx, "get_lock", vec![s("c"), int(-1)]);
        (result, start.elapsed())
    });

    thread::sleep(Duration::from_millis(50));
    cancellation.cancel();

    let (result, waited) = waiter.join().unwrap();
    assert!(matches!(result, Err(EmberError::Cancelled { .. })));
    assert!(waited < Duration::from_secs(2));
    assert_eq!(
        eval(&engine, &owner, "is_used_lock", vec![s("c")]),
        AttributeValue::UInt(owner.session_id())
    );
}

/// Closing a session frees its locks for everyone else.
#[test]
fn lock_close_session_releases() {
    let engine = engine();
    let a = engine.open_session();
    let b = engine.open_session();
    eval(&engine, &a, "get_lock", vec![s("s1"), int(0)]);
    eval(&engine, &a, "get_lock", vec![s("s2"), int(0)]);

    assert_eq!(engine.close_session(&a).unwrap(), 2);
    assert_eq!(eval(&engine, &b, "get_lock", vec![s("s1"), int(0)]), AttributeValue::Int(1));
}

/// Many sessions incrementing a shared counter under one named lock never
/// overlap.
#[test]
fn lock_serializes_critical_sections() {
    let engine = engine();
    let inside = Arc::new(AtomicUsize::new(0));
    let total = Arc::new(AtomicUsize::new(0));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let inside = Arc::clone(&inside);
            let total = Arc::clone(&total);
            thread::spawn(move || {
                let ctx = engine.open_session();
                for _ in 0..25 {
                    let got = engine
                        .evaluate(&ctx, "get_lock", vec![s("counter"), int(-1)])
                        .unwrap();
                    assert_eq!(got, AttributeValue::Int(1));
                    assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                    total.fetch_add(1, Ordering::SeqCst);
                    inside.fetch_sub(1, Ordering::SeqCst);
                    engine
                        .evaluate(&ctx, "release_lock", vec![s("counter")])
                        .unwrap();
                }
                engine.close_session(&ctx).unwrap();
            })
        })
        .collect();

    for w in workers {
        w.join().unwrap();
    }
    assert_eq!(total.load(Ordering::SeqCst), 200);
}
