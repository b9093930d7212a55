//! Scenario F (spec.md §8): two concurrent multi-lock requests for
//! overlapping index sets, issued in opposite orders, must both succeed
//! without deadlocking once dependency ordering resolves them to the same
//! total order.

use codanna_lci::coordinator::{IndexCoordinator, IndexType};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn opposite_order_multi_lock_requests_both_succeed_under_dependency_ordering() {
    let coordinator = Arc::new(IndexCoordinator::with_config(
        Duration::from_secs(2),
        codanna_lci::coordinator::LockOrderingStrategy::Dependency,
    ));

    let a = {
        let coordinator = Arc::clone(&coordinator);
        std::thread::spawn(move || {
            for _ in 0..20 {
                let guards = coordinator
                    .acquire_write_locks(&[IndexType::Symbol, IndexType::CallGraph])
                    .expect("dependency ordering must resolve this request");
                drop(guards);
            }
        })
    };

    let b = {
        let coordinator = Arc::clone(&coordinator);
        std::thread::spawn(move || {
            for _ in 0..20 {
                let guards = coordinator
                    .acquire_write_locks(&[IndexType::CallGraph, IndexType::Symbol])
                    .expect("dependency ordering must resolve this request");
                drop(guards);
            }
        })
    };

    a.join().expect("thread a must not deadlock or panic");
    b.join().expect("thread b must not deadlock or panic");
}
