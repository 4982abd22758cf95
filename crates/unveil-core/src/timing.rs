//! Rate limiting for event handlers.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::host::{TimerId, Timers};

struct DebounceState<A> {
    timer: Option<TimerId>,
    pending: Option<A>,
}

/// Postpones `f` until calls have been quiet for `wait`.
///
/// Trailing mode (default) runs once with the latest arguments after the
/// quiet period. Leading mode (`immediate`) runs on the first call of a
/// burst and swallows the rest.
pub struct Debounced<T: Timers + 'static, A: 'static> {
    timers: Rc<T>,
    wait: Duration,
    immediate: bool,
    f: Rc<dyn Fn(A)>,
    state: Rc<RefCell<DebounceState<A>>>,
}

pub fn debounce<T: Timers + 'static, A: 'static>(
    timers: Rc<T>,
    wait: Duration,
    immediate: bool,
    f: impl Fn(A) + 'static,
) -> Debounced<T, A> {
    Debounced {
        timers,
        wait,
        immediate,
        f: Rc::new(f),
        state: Rc::new(RefCell::new(DebounceState {
            timer: None,
            pending: None,
        })),
    }
}

impl<T: Timers + 'static, A: 'static> Debounced<T, A> {
    pub fn call(&self, args: A) {
        let (call_now, previous) = {
            let mut s = self.state.borrow_mut();
            (self.immediate && s.timer.is_none(), s.timer.take())
        };
        if let Some(id) = previous {
            self.timers.clear_timeout(id);
        }

        let state = self.state.clone();
        let f = self.f.clone();
        let immediate = self.immediate;
        let id = self.timers.set_timeout(
            self.wait,
            Box::new(move || {
                let pending = {
                    let mut s = state.borrow_mut();
                    s.timer = None;
                    s.pending.take()
                };
                if !immediate && let Some(args) = pending {
                    f(args);
                }
            }),
        );

        {
            let mut s = self.state.borrow_mut();
            s.timer = Some(id);
            if !self.immediate {
                s.pending = Some(args);
                return;
            }
        }
        if call_now {
            (self.f)(args);
        }
    }

    /// Drops any pending trailing call.
    pub fn cancel(&self) {
        let timer = {
            let mut s = self.state.borrow_mut();
            s.pending = None;
            s.timer.take()
        };
        if let Some(id) = timer {
            self.timers.clear_timeout(id);
        }
    }
}

/// Runs `f` at most once per `limit`; calls inside the window are dropped.
pub struct Throttled<T: Timers + 'static, A: 'static> {
    timers: Rc<T>,
    limit: Duration,
    f: Rc<dyn Fn(A)>,
    blocked: Rc<Cell<bool>>,
}

pub fn throttle<T: Timers + 'static, A: 'static>(
    timers: Rc<T>,
    limit: Duration,
    f: impl Fn(A) + 'static,
) -> Throttled<T, A> {
    Throttled {
        timers,
        limit,
        f: Rc::new(f),
        blocked: Rc::new(Cell::new(false)),
    }
}

impl<T: Timers + 'static, A: 'static> Throttled<T, A> {
    pub fn call(&self, args: A) {
        if self.blocked.get() {
            return;
        }
        (self.f)(args);
        self.blocked.set(true);
        let blocked = self.blocked.clone();
        self.timers
            .set_timeout(self.limit, Box::new(move || blocked.set(false)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimHost;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn recorder() -> (Rc<RefCell<Vec<u32>>>, impl Fn(u32) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |v: u32| sink.borrow_mut().push(v))
    }

    #[test]
    fn trailing_debounce_uses_latest_args() {
        let host = Rc::new(SimHost::new());
        let (seen, f) = recorder();
        let d = debounce(host.clone(), ms(100), false, f);
        d.call(1);
        host.advance(ms(50));
        d.call(2);
        host.advance(ms(50));
        d.call(3);
        assert!(seen.borrow().is_empty());
        host.advance(ms(100));
        assert_eq!(*seen.borrow(), vec![3]);
        host.advance(ms(500));
        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn leading_debounce_fires_first_call_of_burst() {
        let host = Rc::new(SimHost::new());
        let (seen, f) = recorder();
        let d = debounce(host.clone(), ms(100), true, f);
        d.call(1);
        d.call(2);
        host.advance(ms(60));
        d.call(3);
        assert_eq!(*seen.borrow(), vec![1]);
        host.advance(ms(100));
        assert_eq!(*seen.borrow(), vec![1]);
        d.call(4);
        assert_eq!(*seen.borrow(), vec![1, 4]);
    }

    #[test]
    fn cancel_drops_trailing_call() {
        let host = Rc::new(SimHost::new());
        let (seen, f) = recorder();
        let d = debounce(host.clone(), ms(100), false, f);
        d.call(1);
        d.cancel();
        host.advance(ms(200));
        assert!(seen.borrow().is_empty());
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn throttle_drops_calls_inside_window() {
        let host = Rc::new(SimHost::new());
        let (seen, f) = recorder();
        let t = throttle(host.clone(), ms(100), f);
        t.call(1);
        t.call(2);
        host.advance(ms(96));
        t.call(3);
        host.advance(ms(16));
        t.call(4);
        assert_eq!(*seen.borrow(), vec![1, 4]);
    }
}
