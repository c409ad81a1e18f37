//! Trailing debounce for resize events.

use gloo_timers::callback::Timeout;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Source of one-shot timers.
pub trait TimerHost {
    type Handle;

    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Handle;

    fn cancel(&self, handle: Self::Handle);
}

/// `setTimeout`-backed timers. Dropping a [`Timeout`] clears it.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimers;

impl TimerHost for BrowserTimers {
    type Handle = Timeout;

    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, callback)
    }

    fn cancel(&self, handle: Timeout) {
        drop(handle);
    }
}

/// Holds at most one pending timer; every restart replaces it.
///
/// After [`teardown`](Self::teardown) the debouncer is inert: restarts are
/// refused and a timer that slipped past cancellation does not run its callback.
pub struct ResizeDebouncer<H: TimerHost> {
    host: H,
    delay_ms: u32,
    pending: RefCell<Option<H::Handle>>,
    armed: Rc<Cell<bool>>,
    alive: Rc<Cell<bool>>,
}

impl<H: TimerHost> ResizeDebouncer<H> {
    pub fn new(host: H, delay_ms: u32) -> Self {
        Self {
            host,
            delay_ms,
            pending: RefCell::new(None),
            armed: Rc::new(Cell::new(false)),
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// Cancels the pending timer (if any) and starts a new one.
    /// Returns `false` once torn down.
    pub fn restart(&self, on_fire: impl FnOnce() + 'static) -> bool {
        if !self.alive.get() {
            return false;
        }
        self.cancel_pending();

        let armed = Rc::clone(&self.armed);
        let alive = Rc::clone(&self.alive);
        let handle = self.host.schedule(
            self.delay_ms,
            Box::new(move || {
                armed.set(false);
                if alive.get() {
                    on_fire();
                }
            }),
        );
        self.armed.set(true);
        *self.pending.borrow_mut() = Some(handle);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.armed.get()
    }

    pub fn is_torn_down(&self) -> bool {
        !self.alive.get()
    }

    pub fn teardown(&self) {
        self.alive.set(false);
        self.cancel_pending();
    }

    fn cancel_pending(&self) {
        if let Some(handle) = self.pending.borrow_mut().take() {
            self.host.cancel(handle);
        }
        self.armed.set(false);
    }
}

impl<H: TimerHost> Drop for ResizeDebouncer<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let clock = ManualClock::default();
        let debouncer = ResizeDebouncer::new(clock.clone(), 350);
        let fired = Rc::new(Cell::new(0));

        let f = Rc::clone(&fired);
        debouncer.restart(move || f.set(f.get() + 1));
        assert!(debouncer.is_pending());

        clock.advance(349);
        assert_eq!(fired.get(), 0);
        clock.advance(1);
        assert_eq!(fired.get(), 1);
        assert!(!debouncer.is_pending());

        clock.advance(1000);
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_restart_replaces_pending_timer() {
        let clock = ManualClock::default();
        let debouncer = ResizeDebouncer::new(clock.clone(), 350);
        let log = Rc::new(RefCell::new(Vec::new()));

        for step in 0..4 {
            let l = Rc::clone(&log);
            debouncer.restart(move || l.borrow_mut().push((step, ())));
            assert_eq!(clock.pending(), 1);
            clock.advance(100);
        }
        assert!(log.borrow().is_empty());

        clock.advance(250);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].0, 3);
        assert_eq!(clock.now(), 650);
    }

    #[test]
    fn test_teardown_cancels_and_refuses_restart() {
        let clock = ManualClock::default();
        let debouncer = ResizeDebouncer::new(clock.clone(), 350);
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        debouncer.restart(move || f.set(true));
        debouncer.teardown();
        assert_eq!(clock.pending(), 0);
        assert!(debouncer.is_torn_down());

        let f = Rc::clone(&fired);
        assert!(!debouncer.restart(move || f.set(true)));

        clock.advance(1000);
        assert!(!fired.get());
    }

    struct LeakyTimers(ManualClock);

    impl TimerHost for LeakyTimers {
        type Handle = u64;

        fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> u64 {
            self.0.schedule(delay_ms, callback)
        }

        fn cancel(&self, _handle: u64) {}
    }

    #[test]
    fn test_uncancelled_timer_is_inert_after_teardown() {
        let clock = ManualClock::default();
        let debouncer = ResizeDebouncer::new(LeakyTimers(clock.clone()), 350);
        let fired = Rc::new(Cell::new(false));

        let f = Rc::clone(&fired);
        debouncer.restart(move || f.set(true));
        debouncer.teardown();
        assert_eq!(clock.pending(), 1);

        clock.advance(350);
        assert!(!fired.get());
    }

    #[test]
    fn test_drop_cancels_pending_timer() {
        let clock = ManualClock::default();
        let fired = Rc::new(Cell::new(false));
        {
            let debouncer = ResizeDebouncer::new(clock.clone(), 350);
            let f = Rc::clone(&fired);
            debouncer.restart(move || f.set(true));
        }
        assert_eq!(clock.pending(), 0);
        clock.advance(350);
        assert!(!fired.get());
    }
}
