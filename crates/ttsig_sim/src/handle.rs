//! Handles used by test code: the device, its signals, and spawned tasks.

use std::future::Future;
use std::rc::Rc;

use ttsig_common::LogicArray;

use crate::error::SimError;
use crate::scheduler::{Shared, TaskId};
use crate::signal::{Edge, SignalId};
use crate::time::SimTime;
use crate::trigger::{EdgeTrigger, Timer};

/// Cloneable handle to the device under test.
///
/// Every task that touches the device holds one of these. Handles are cheap
/// to clone and only valid inside the [`Simulator`](crate::Simulator) that
/// created them.
#[derive(Clone)]
pub struct Dut {
    shared: Rc<Shared>,
}

impl Dut {
    pub(crate) fn new(shared: Rc<Shared>) -> Self {
        Self { shared }
    }

    /// Name of the device's top-level module.
    pub fn name(&self) -> String {
        self.shared.kernel.borrow().model_name().to_string()
    }

    /// Looks up a signal by name.
    pub fn signal(&self, name: &str) -> Result<Signal, SimError> {
        let kernel = self.shared.kernel.borrow();
        let id = kernel.signals().find(name)?;
        let width = kernel.signals().get(id).width();
        Ok(Signal {
            shared: Rc::clone(&self.shared),
            id,
            name: Rc::from(name),
            width,
        })
    }

    /// Current simulation time.
    pub fn now(&self) -> SimTime {
        self.shared.kernel.borrow().now()
    }

    /// Trigger that completes after `delay` of simulated time.
    pub fn timer(&self, delay: SimTime) -> Timer {
        Timer::new(Rc::clone(&self.shared), delay)
    }

    /// Schedules `task` to run concurrently with the caller.
    ///
    /// The task first runs at the next scheduling round. If it returns an
    /// error, the whole run fails with that error.
    pub fn start_soon<F>(&self, task: F) -> TaskHandle
    where
        F: Future<Output = Result<(), SimError>> + 'static,
    {
        let id = self.shared.spawn(Box::pin(task));
        TaskHandle {
            shared: Rc::clone(&self.shared),
            id,
        }
    }
}

/// Handle to one named signal of the device.
#[derive(Clone)]
pub struct Signal {
    shared: Rc<Shared>,
    id: SignalId,
    name: Rc<str>,
    width: u32,
}

impl Signal {
    /// Signal name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The device this signal belongs to.
    pub fn dut(&self) -> Dut {
        Dut::new(Rc::clone(&self.shared))
    }

    /// Drives an integer; negative values are written in two's complement.
    pub fn set(&self, value: i64) -> Result<(), SimError> {
        let bits = LogicArray::from_int(value, self.width).map_err(|source| SimError::Value {
            signal: self.name.to_string(),
            source,
        })?;
        self.set_logic(bits)
    }

    /// Drives a 4-state value.
    pub fn set_logic(&self, value: LogicArray) -> Result<(), SimError> {
        self.shared.kernel.borrow_mut().write_input(self.id, value)
    }

    /// Current 4-state value.
    pub fn value(&self) -> LogicArray {
        self.shared.kernel.borrow().signals().get(self.id).value
    }

    /// Current value as an unsigned integer.
    pub fn to_unsigned(&self) -> Result<u64, SimError> {
        let value = self.value();
        value.to_unsigned().ok_or_else(|| self.unresolvable(&value))
    }

    /// Current value as a two's-complement signed integer.
    pub fn to_signed(&self) -> Result<i64, SimError> {
        let value = self.value();
        value.to_signed().ok_or_else(|| self.unresolvable(&value))
    }

    fn unresolvable(&self, value: &LogicArray) -> SimError {
        SimError::Unresolvable {
            signal: self.name.to_string(),
            value: value.to_string(),
        }
    }

    /// Trigger for the next rising edge of bit 0.
    pub fn rising_edge(&self) -> EdgeTrigger {
        EdgeTrigger::new(Rc::clone(&self.shared), self.id, Edge::Rising)
    }

    /// Trigger for the next falling edge of bit 0.
    pub fn falling_edge(&self) -> EdgeTrigger {
        EdgeTrigger::new(Rc::clone(&self.shared), self.id, Edge::Falling)
    }

    /// Waits for `cycles` rising edges.
    pub async fn clock_cycles(&self, cycles: u32) {
        for _ in 0..cycles {
            self.rising_edge().await;
        }
    }
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("width", &self.width)
            .finish()
    }
}

/// Handle to a task started with [`Dut::start_soon`].
pub struct TaskHandle {
    shared: Rc<Shared>,
    id: TaskId,
}

impl TaskHandle {
    /// The task's ID.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Stops the task; it is dropped before the next task is polled.
    pub fn cancel(&self) {
        self.shared.cancel(self.id);
    }

    /// Returns `true` once the task's future has completed.
    pub fn is_finished(&self) -> bool {
        self.shared.is_finished(self.id)
    }
}
