//! Awaitable triggers: the only points where a task gives up control.
//!
//! Each trigger registers with the kernel on its first poll and completes
//! once the kernel has set its flag. Spurious polls before that return
//! `Pending` without registering again.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::scheduler::Shared;
use crate::signal::{Edge, SignalId};
use crate::time::SimTime;

/// Completes after a fixed amount of simulated time.
#[must_use = "triggers do nothing unless awaited"]
pub struct Timer {
    shared: Rc<Shared>,
    delay: SimTime,
    fired: Option<Rc<Cell<bool>>>,
}

impl Timer {
    pub(crate) fn new(shared: Rc<Shared>, delay: SimTime) -> Self {
        Self {
            shared,
            delay,
            fired: None,
        }
    }
}

impl Future for Timer {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        if let Some(flag) = &this.fired {
            return if flag.get() {
                Poll::Ready(())
            } else {
                Poll::Pending
            };
        }
        let flag = Rc::new(Cell::new(false));
        this.shared.kernel.borrow_mut().schedule_timer(
            this.delay,
            Rc::clone(&flag),
            cx.waker().clone(),
        );
        this.fired = Some(flag);
        Poll::Pending
    }
}

/// Completes on the next matching edge of a signal.
#[must_use = "triggers do nothing unless awaited"]
pub struct EdgeTrigger {
    shared: Rc<Shared>,
    signal: SignalId,
    edge: Edge,
    fired: Option<Rc<Cell<bool>>>,
}

impl EdgeTrigger {
    pub(crate) fn new(shared: Rc<Shared>, signal: SignalId, edge: Edge) -> Self {
        Self {
            shared,
            signal,
            edge,
            fired: None,
        }
    }
}

impl Future for EdgeTrigger {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();
        match this.fired.as_ref().map(|flag| flag.get()) {
            Some(true) => return Poll::Ready(()),
            Some(false) => return Poll::Pending,
            None => {}
        }
        let flag = Rc::new(Cell::new(false));
        this.shared.kernel.borrow_mut().wait_edge(
            this.signal,
            this.edge,
            Rc::clone(&flag),
            cx.waker().clone(),
        );
        this.fired = Some(flag);
        Poll::Pending
    }
}
