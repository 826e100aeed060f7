//! Screensaver: a frame that repaints itself in a color which changes once
//! per period.
//!
//! The frame is a singleton, the color lives in a custom "periodical" scope.
//! The frame asks the container for the color on every repaint, so it keeps
//! picking up fresh colors even though the frame itself is built once.
//!
//! Run with `RUST_LOG=ferrous_ioc=debug cargo run --example screensaver` to
//! see the scope refresh.

use ferrous_ioc::{Container, Definition, IocResult, PeriodicalScope};
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Color {
    r: u8,
    g: u8,
    b: u8,
}

impl Color {
    fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            r: rng.gen(),
            g: rng.gen(),
            b: rng.gen(),
        }
    }
}

struct ColorFrame {
    width: usize,
}

impl ColorFrame {
    fn show_on_random_place(&self, container: &Container) -> IocResult<()> {
        let color = container.resolve::<Color>("color")?;
        let offset = rand::thread_rng().gen_range(0..self.width);
        // 24-bit ANSI background
        println!(
            "{}\x1b[48;2;{};{};{}m      \x1b[0m  #{:02x}{:02x}{:02x}",
            " ".repeat(offset),
            color.r,
            color.g,
            color.b,
            color.r,
            color.g,
            color.b
        );
        Ok(())
    }
}

fn main() -> IocResult<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let container = Container::new();
    container.register_scope("periodical", Arc::new(PeriodicalScope::new(Duration::from_secs(1))));
    container.register("color", Definition::scoped("periodical", |_| Ok(Color::random())))?;
    container.register("frame", Definition::singleton(|_| Ok(ColorFrame { width: 40 })))?;
    container.start()?;

    let frame = container.resolve::<ColorFrame>("frame")?;
    for _ in 0..30 {
        frame.show_on_random_place(&container)?;
        thread::sleep(Duration::from_millis(100));
    }

    container.shutdown()
}
