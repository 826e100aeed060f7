use ferrous_ioc::{
    BoxError, Container, Definition, Instance, IocError, IocResult, Lifetime, PeriodicalScope, Scope, ValidationError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

fn counting_color(counter: &Arc<AtomicU32>) -> Definition {
    let counter = counter.clone();
    Definition::scoped("periodical", move |_| Ok(counter.fetch_add(1, Ordering::SeqCst)))
}

#[test]
fn test_periodical_scope_reuses_within_period() {
    let built = Arc::new(AtomicU32::new(0));

    let container = Container::new();
    container.register_scope("periodical", Arc::new(PeriodicalScope::new(Duration::from_secs(3600))));
    container.register("color", counting_color(&built)).unwrap();

    let a = container.resolve::<u32>("color").unwrap();
    let b = container.resolve::<u32>("color").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_periodical_scope_refreshes_after_period() {
    let built = Arc::new(AtomicU32::new(0));

    let container = Container::new();
    container.register_scope("periodical", Arc::new(PeriodicalScope::new(Duration::from_millis(20))));
    container.register("color", counting_color(&built)).unwrap();

    let a = container.resolve::<u32>("color").unwrap();
    thread::sleep(Duration::from_millis(40));
    let b = container.resolve::<u32>("color").unwrap();

    assert_eq!((*a, *b), (0, 1));
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn test_scoped_objects_go_through_hooks() {
    let container = Container::new();
    container.register_scope("periodical", Arc::new(PeriodicalScope::new(Duration::from_secs(3600))));
    container
        .register("label", Definition::scoped("periodical", |_| Ok(String::from("red"))))
        .unwrap();
    container.add_post_init_hook_for::<String, _>(|_, s| Ok(Arc::new(s.to_uppercase())));

    assert_eq!(*container.resolve::<String>("label").unwrap(), "RED");
    // Scoped objects are not part of the singleton cache
    assert_eq!(container.singleton_count(), 0);
}

#[test]
fn test_scoped_objects_not_destroyed() {
    let destroyed = Arc::new(AtomicU32::new(0));
    let d = destroyed.clone();

    let container = Container::new();
    container.register_scope("periodical", Arc::new(PeriodicalScope::new(Duration::from_secs(3600))));
    container
        .register(
            "color",
            Definition::scoped("periodical", |_| Ok(1u8)).destroy_hook("close", move |_: &u8| {
                d.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        )
        .unwrap();

    container.resolve::<u8>("color").unwrap();
    container.shutdown().unwrap();
    assert_eq!(destroyed.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unknown_scope() {
    let container = Container::new();
    container
        .register("color", Definition::singleton(|_| Ok(1u8)).with_lifetime(Lifetime::Custom("request")))
        .unwrap();

    match container.resolve::<u8>("color") {
        Err(IocError::UnknownScope { id, scope }) => {
            assert_eq!(id, "color");
            assert_eq!(scope, "request");
        }
        other => panic!("expected UnknownScope, got {:?}", other),
    }

    let report = container.validate();
    assert_eq!(
        report.errors,
        vec![ValidationError::UnknownScope {
            id: "color".into(),
            scope: "request",
        }]
    );
}

#[test]
fn test_scoped_cycle_detected() {
    let container = Container::new();
    container.register_scope("periodical", Arc::new(PeriodicalScope::new(Duration::from_secs(3600))));
    container
        .register("a", Definition::scoped("periodical", |ctx| ctx.resolve::<u8>("b").map(|v| *v)))
        .unwrap();
    container
        .register("b", Definition::scoped("periodical", |ctx| ctx.resolve::<u8>("a").map(|v| *v)))
        .unwrap();

    match container.resolve::<u8>("a") {
        Err(IocError::CyclicDependency(path)) => assert_eq!(path, vec!["a", "b", "a"]),
        other => panic!("expected CyclicDependency, got {:?}", other),
    }
}

/// Scope keyed by an externally switched session name.
#[derive(Default)]
struct SessionScope {
    current: Mutex<String>,
    entries: Mutex<HashMap<(String, String), Instance>>,
}

impl Scope for SessionScope {
    fn get(&self, id: &str, create: &mut dyn FnMut() -> IocResult<Instance>) -> IocResult<Instance> {
        let key = (self.current.lock().unwrap().clone(), id.to_string());
        if let Some(hit) = self.entries.lock().unwrap().get(&key) {
            return Ok(hit.clone());
        }
        let value = create()?;
        self.entries.lock().unwrap().insert(key, value.clone());
        Ok(value)
    }

    fn remove(&self, id: &str) -> Option<Instance> {
        let key = (self.current.lock().unwrap().clone(), id.to_string());
        self.entries.lock().unwrap().remove(&key)
    }
}

#[test]
fn test_custom_scope_implementation() {
    let scope = Arc::new(SessionScope::default());
    let built = Arc::new(AtomicU32::new(0));
    let b = built.clone();

    let container = Container::new();
    container.register_scope("session", scope.clone());
    container
        .register(
            "cart",
            Definition::scoped("session", move |_| -> Result<Vec<String>, IocError> {
                b.fetch_add(1, Ordering::SeqCst);
                Ok(Vec::new())
            }),
        )
        .unwrap();

    *scope.current.lock().unwrap() = "alice".into();
    let alice_1 = container.resolve::<Vec<String>>("cart").unwrap();
    let alice_2 = container.resolve::<Vec<String>>("cart").unwrap();
    assert!(Arc::ptr_eq(&alice_1, &alice_2));

    *scope.current.lock().unwrap() = "bob".into();
    let bob = container.resolve::<Vec<String>>("cart").unwrap();
    assert!(!Arc::ptr_eq(&alice_1, &bob));
    assert_eq!(built.load(Ordering::SeqCst), 2);

    assert!(scope.remove("cart").is_some());
    container.resolve::<Vec<String>>("cart").unwrap();
    assert_eq!(built.load(Ordering::SeqCst), 3);
}

#[test]
fn test_scope_build_failure_not_cached() {
    let fail = Arc::new(AtomicBool::new(true));
    let f = fail.clone();

    let container = Container::new();
    container.register_scope("periodical", Arc::new(PeriodicalScope::new(Duration::from_secs(3600))));
    container.register("color", Definition::scoped("periodical", |_| Ok(5u8))).unwrap();
    container.add_pre_init_hook(move |_, instance| -> Result<Instance, BoxError> {
        if f.swap(false, Ordering::SeqCst) {
            return Err("not yet".into());
        }
        Ok(instance)
    });

    assert!(matches!(container.resolve::<u8>("color"), Err(IocError::HookFailure { .. })));
    assert_eq!(*container.resolve::<u8>("color").unwrap(), 5);
}
