/// Property-based tests for resolution
///
/// These tests verify that lifecycle, ordering and cycle behavior hold for
/// arbitrary identifiers, chain lengths and hook counts.

use ferrous_ioc::{Container, Definition, IocError};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// Property: a singleton resolves to the same instance however often it is requested
proptest! {
    #[test]
    fn singleton_resolution_consistency(id in "[a-z][a-z0-9_]{0,20}", value in "\\PC{0,50}", requests in 1usize..20) {
        let container = Container::new();
        container.register(id.clone(), Definition::instance(value.clone())).unwrap();

        let first = container.resolve::<String>(&id).unwrap();
        for _ in 0..requests {
            let again = container.resolve::<String>(&id).unwrap();
            prop_assert!(Arc::ptr_eq(&first, &again));
        }
        prop_assert_eq!(&*first, &value);
        prop_assert_eq!(container.singleton_count(), 1);
    }
}

// Property: a prototype factory runs exactly once per request
proptest! {
    #[test]
    fn prototype_factory_runs_per_request(requests in 1usize..50) {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();

        let container = Container::new();
        container
            .register("p", Definition::prototype(move |_| Ok(c.fetch_add(1, Ordering::SeqCst))))
            .unwrap();

        let values: Vec<usize> = (0..requests).map(|_| *container.resolve::<usize>("p").unwrap()).collect();
        prop_assert_eq!(values, (0..requests).collect::<Vec<_>>());
        prop_assert_eq!(calls.load(Ordering::SeqCst), requests);
    }
}

// Property: destroy hooks run in exact reverse of the order singletons were created
proptest! {
    #[test]
    fn destroy_order_reverses_creation(order in Just((0..8usize).collect::<Vec<_>>()).prop_shuffle()) {
        let destroyed = Arc::new(Mutex::new(Vec::new()));

        let container = Container::new();
        for n in 0..8usize {
            let d = destroyed.clone();
            container
                .register(
                    format!("s{}", n),
                    Definition::singleton(move |_| Ok(n)).destroy_hook("close", move |v: &usize| {
                        d.lock().unwrap().push(*v);
                        Ok(())
                    }),
                )
                .unwrap();
        }

        for n in &order {
            container.resolve::<usize>(&format!("s{}", n)).unwrap();
        }
        container.shutdown().unwrap();

        let mut expected = order.clone();
        expected.reverse();
        prop_assert_eq!(destroyed.lock().unwrap().clone(), expected);
    }
}

// Property: any ring of singletons is reported as a cycle starting and ending at the requested id
proptest! {
    #[test]
    fn ring_is_always_a_cycle(len in 1usize..12, start in 0usize..12) {
        let start = start % len;
        let container = Container::new();
        for n in 0..len {
            let next = format!("n{}", (n + 1) % len);
            container
                .register(format!("n{}", n), Definition::singleton(move |ctx| ctx.resolve::<u8>(&next).map(|v| *v)))
                .unwrap();
        }

        let requested = format!("n{}", start);
        match container.resolve::<u8>(&requested) {
            Err(IocError::CyclicDependency(path)) => {
                prop_assert_eq!(path.len(), len + 1);
                prop_assert_eq!(path.first(), Some(&requested));
                prop_assert_eq!(path.last(), Some(&requested));
            }
            other => prop_assert!(false, "expected cycle, got {:?}", other),
        }
        prop_assert_eq!(container.singleton_count(), 0);
    }
}

// Property: an acyclic chain resolves regardless of length and caches every link
proptest! {
    #[test]
    fn chain_resolves_and_caches_each_link(len in 1usize..40) {
        let container = Container::new();
        for n in 0..len {
            let def = if n + 1 == len {
                Definition::singleton(|_| Ok(0usize))
            } else {
                let next = format!("c{}", n + 1);
                Definition::singleton(move |ctx| Ok(*ctx.resolve::<usize>(&next)? + 1))
            };
            container.register(format!("c{}", n), def).unwrap();
        }

        prop_assert_eq!(*container.resolve::<usize>("c0").unwrap(), len - 1);
        prop_assert_eq!(container.singleton_count(), len);
    }
}

// Property: post-init hooks compose in registration order
proptest! {
    #[test]
    fn post_init_hooks_compose_in_order(tags in prop::collection::vec("[a-z]{1,3}", 0..6)) {
        let container = Container::new();
        container.register("word", Definition::prototype(|_| Ok(String::new()))).unwrap();
        for tag in tags.clone() {
            container.add_post_init_hook_for::<String, _>(move |_, s| Ok(Arc::new(format!("{}{}", s, tag))));
        }

        prop_assert_eq!(&*container.resolve::<String>("word").unwrap(), &tags.concat());
    }
}
