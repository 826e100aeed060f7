//! Quoters: init hooks, a field-injecting pre-init hook, a profiling proxy
//! installed in the post-init pass and a listener that runs once everything
//! is wrapped.
//!
//! ```text
//! cargo run --example quoters
//! ```

use ferrous_ioc::{
    BoxError, Container, ContainerEvent, Definition, DefinitionRegistry, IocResult, LoggingObserver,
};
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

trait Quoter: Send + Sync {
    fn say_quote(&self);

    /// Setter used by the pre-init hook; quoters without a repeat count ignore it.
    fn inject_repeat(&self, _repeat: u32) {}
}

/// Quoter whose repeat count is injected by a pre-init hook.
struct TerminatorQuoter {
    message: String,
    repeat: AtomicU32,
}

impl Quoter for TerminatorQuoter {
    fn say_quote(&self) {
        for _ in 0..self.repeat.load(Ordering::SeqCst) {
            println!("message = {}", self.message);
        }
    }

    fn inject_repeat(&self, repeat: u32) {
        self.repeat.store(repeat, Ordering::SeqCst);
    }
}

/// Replacement picked by the definition processor.
struct T1000Quoter {
    inner: TerminatorQuoter,
}

impl Quoter for T1000Quoter {
    fn say_quote(&self) {
        self.inner.say_quote();
        println!("I am liquid");
    }

    fn inject_repeat(&self, repeat: u32) {
        self.inner.inject_repeat(repeat);
    }
}

/// Wraps a quoter and reports how long each call took.
struct ProfilingQuoter {
    target: Arc<Box<dyn Quoter>>,
}

impl Quoter for ProfilingQuoter {
    fn say_quote(&self) {
        let start = Instant::now();
        self.target.say_quote();
        tracing::info!(elapsed = ?start.elapsed(), "say_quote profiled");
    }
}

fn terminator(repeat: u32) -> TerminatorQuoter {
    TerminatorQuoter {
        message: "I'll be back".to_string(),
        repeat: AtomicU32::new(repeat),
    }
}

fn quoter_definition<Q: Quoter + 'static>(build: fn() -> Q) -> Definition {
    Definition::singleton(move |_| Ok(Box::new(build()) as Box<dyn Quoter>))
        .init_hook("afterPropertiesSet", |_: &Box<dyn Quoter>| {
            println!("Phase 2: init hook on the original object");
            Ok(())
        })
        .destroy_hook("close", |_: &Box<dyn Quoter>| {
            println!("Closing quoter");
            Ok(())
        })
        .eager()
}

fn main() -> IocResult<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let container = Container::new();
    container.add_observer(Arc::new(LoggingObserver::with_prefix("quoters")));

    container.register("terminatorQuoter", quoter_definition(|| terminator(0)))?;

    // Swaps the deprecated implementation before anything is built
    container.add_definition_processor(Arc::new(|registry: &mut DefinitionRegistry| -> Result<(), BoxError> {
        if registry.contains("terminatorQuoter") {
            registry.replace(
                "terminatorQuoter",
                quoter_definition(|| T1000Quoter { inner: terminator(0) }),
            )?;
        }
        Ok(())
    }));

    // Pre-init pass: inject a random repeat count into the raw object
    container.add_pre_init_hook_for::<Box<dyn Quoter>, _>(|id, quoter| {
        println!("Phase 1: pre-init hook on {}", id);
        quoter.inject_repeat(rand::thread_rng().gen_range(2..=5));
        Ok(quoter)
    });

    // Post-init pass: replace the object with a profiling proxy
    container.add_post_init_hook_for::<Box<dyn Quoter>, _>(|id, target| {
        println!("Wrapping {} in a profiling proxy", id);
        Ok(Arc::new(Box::new(ProfilingQuoter { target }) as Box<dyn Quoter>))
    });

    // Phase 3: runs once every object is fully wrapped
    container.add_listener(Arc::new(|event: &ContainerEvent, c: &Container| -> Result<(), BoxError> {
        if *event == ContainerEvent::Started {
            println!("Phase 3: listener sees the proxy");
            c.resolve::<Box<dyn Quoter>>("terminatorQuoter")?.say_quote();
        }
        Ok(())
    }));

    container.start()?;

    let report = container.validate();
    for warning in &report.warnings {
        tracing::warn!(%warning, "definition warning");
    }

    container.resolve::<Box<dyn Quoter>>("terminatorQuoter")?.say_quote();
    container.shutdown()
}
