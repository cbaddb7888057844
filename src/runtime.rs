use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app loop.
#[derive(Clone, Debug)]
pub enum Event {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Production input source: a crossterm read loop feeding `tx`.
pub fn spawn_input_thread(tx: Sender<Event>) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(CtEvent::Key(key)) => {
                if tx.send(Event::Key(key)).is_err() {
                    break;
                }
            }
            Ok(CtEvent::Resize(_, _)) => {
                if tx.send(Event::Resize).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    });
}

/// The countdown's clock. While enabled it delivers one `Event::Tick` per
/// period; while disabled it delivers nothing, and re-enabling resumes at
/// the next period boundary without catching up on missed ticks.
pub trait TickSource {
    fn set_enabled(&self, enabled: bool);
    fn is_enabled(&self) -> bool;
}

/// Fixed-period tick producer backed by a sleeper thread. The gate is
/// checked after each sleep, so a pause mid-period drops that period's
/// tick rather than deferring it.
pub struct IntervalTick {
    enabled: Arc<AtomicBool>,
}

impl IntervalTick {
    pub fn spawn(period: Duration, tx: Sender<Event>) -> Self {
        let enabled = Arc::new(AtomicBool::new(false));
        let gate = Arc::clone(&enabled);

        thread::spawn(move || loop {
            thread::sleep(period);
            if !gate.load(Ordering::SeqCst) {
                continue;
            }
            if tx.send(Event::Tick).is_err() {
                break;
            }
        });

        Self { enabled }
    }
}

impl TickSource for IntervalTick {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

/// Thread-free tick source for unit tests: ticks fire only when the test
/// calls `fire`, and only while enabled.
pub struct ManualTick {
    enabled: AtomicBool,
    tx: Sender<Event>,
}

impl ManualTick {
    pub fn new(tx: Sender<Event>) -> Self {
        Self {
            enabled: AtomicBool::new(false),
            tx,
        }
    }

    /// Simulates one elapsed period. A disabled source swallows the tick,
    /// matching `IntervalTick`'s gating.
    pub fn fire(&self) {
        if self.enabled.load(Ordering::SeqCst) {
            let _ = self.tx.send(Event::Tick);
        }
    }
}

impl TickSource for ManualTick {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_manual_tick_is_gated_by_enabled() {
        let (tx, rx) = mpsc::channel();
        let tick = ManualTick::new(tx);

        tick.fire();
        assert!(rx.try_recv().is_err());

        tick.set_enabled(true);
        tick.fire();
        assert!(matches!(rx.try_recv(), Ok(Event::Tick)));

        tick.set_enabled(false);
        tick.fire();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_interval_tick_starts_disabled() {
        let (tx, rx) = mpsc::channel();
        let tick = IntervalTick::spawn(Duration::from_millis(1), tx);
        assert!(!tick.is_enabled());

        // A few periods pass; nothing may arrive while disabled.
        thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_interval_tick_delivers_while_enabled() {
        let (tx, rx) = mpsc::channel();
        let tick = IntervalTick::spawn(Duration::from_millis(1), tx);
        tick.set_enabled(true);
        assert!(tick.is_enabled());

        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(500)),
            Ok(Event::Tick)
        ));
    }

    #[test]
    fn test_interval_tick_stops_after_disable() {
        let (tx, rx) = mpsc::channel();
        let tick = IntervalTick::spawn(Duration::from_millis(1), tx);
        tick.set_enabled(true);
        rx.recv_timeout(Duration::from_millis(500)).unwrap();

        tick.set_enabled(false);
        // Drain the ticks that were already in flight when the gate closed.
        thread::sleep(Duration::from_millis(10));
        while rx.try_recv().is_ok() {}

        thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());
    }
}
