//! Single-threaded cooperative scheduler.
//!
//! [`Simulator`] owns the kernel and a set of tasks (boxed futures). One
//! scheduling round polls every ready task in FIFO order, then settles the
//! kernel (which may wake edge waiters), and only when nothing is ready does
//! it advance time to the next timer. Exactly one task runs at a time, and a
//! task only yields at an `.await` on a trigger.
//!
//! The run ends as soon as the main test future completes. Background tasks
//! that are still pending (typically the free-running clock) are dropped.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Wake, Waker};

use crate::error::SimError;
use crate::handle::Dut;
use crate::kernel::Kernel;
use crate::model::DeviceModel;
use crate::time::SimTime;
use crate::waveform::WaveformRecorder;

/// Identifier of a spawned task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

type LocalTask = Pin<Box<dyn Future<Output = Result<(), SimError>>>>;
type ReadyQueue = Arc<Mutex<VecDeque<TaskId>>>;

/// State shared between the scheduler and every [`Dut`] handle.
pub(crate) struct Shared {
    pub(crate) kernel: RefCell<Kernel>,
    spawned: RefCell<Vec<(TaskId, LocalTask)>>,
    cancelled: RefCell<Vec<TaskId>>,
    finished: RefCell<HashSet<TaskId>>,
    ready: ReadyQueue,
    next_task: Cell<u64>,
}

impl Shared {
    pub(crate) fn spawn(&self, task: LocalTask) -> TaskId {
        let id = TaskId(self.next_task.get());
        self.next_task.set(id.0 + 1);
        self.spawned.borrow_mut().push((id, task));
        push_ready(&self.ready, id);
        id
    }

    pub(crate) fn cancel(&self, id: TaskId) {
        self.cancelled.borrow_mut().push(id);
    }

    pub(crate) fn is_finished(&self, id: TaskId) -> bool {
        self.finished.borrow().contains(&id)
    }
}

fn push_ready(queue: &ReadyQueue, id: TaskId) {
    queue
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push_back(id);
}

/// Waker that re-queues its task.
struct TaskWaker {
    id: TaskId,
    ready: ReadyQueue,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        push_ready(&self.ready, self.id);
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct SimOutcome<T> {
    /// What the test future returned.
    pub value: T,
    /// Simulation time when the test returned.
    pub final_time: SimTime,
    /// Delta cycles executed over the whole run.
    pub total_deltas: u64,
}

/// Owns a simulation and runs one test against it.
///
/// ```ignore
/// let sim = Simulator::new(MyModel::default())?;
/// let outcome = sim.run(|dut| async move {
///     let clk = dut.signal("clk")?;
///     dut.start_soon(Clock::new(clk.clone(), SimTime::from_us(10))?.start());
///     clk.clock_cycles(3).await;
///     Ok::<_, SimError>(())
/// })?;
/// ```
pub struct Simulator {
    shared: Rc<Shared>,
}

impl Simulator {
    /// Creates a simulator around a device model.
    pub fn new(model: impl DeviceModel + 'static) -> Result<Self, SimError> {
        let kernel = Kernel::new(Box::new(model))?;
        Ok(Self {
            shared: Rc::new(Shared {
                kernel: RefCell::new(kernel),
                spawned: RefCell::new(Vec::new()),
                cancelled: RefCell::new(Vec::new()),
                finished: RefCell::new(HashSet::new()),
                ready: Arc::new(Mutex::new(VecDeque::new())),
                next_task: Cell::new(0),
            }),
        })
    }

    /// Attaches a waveform recorder. Must be called before [`run`](Self::run).
    pub fn set_recorder(&mut self, recorder: Box<dyn WaveformRecorder>) {
        self.shared.kernel.borrow_mut().set_recorder(recorder);
    }

    /// Aborts the run with [`SimError::TimeLimitExceeded`] if time would pass `limit`.
    pub fn set_time_limit(&mut self, limit: SimTime) {
        self.shared.kernel.borrow_mut().set_time_limit(limit);
    }

    /// Overrides the per-time-step delta cycle limit.
    pub fn set_max_delta(&mut self, max: u32) {
        self.shared.kernel.borrow_mut().set_max_delta(max);
    }

    /// Returns a handle to the device, for use outside of `run`.
    pub fn dut(&self) -> Dut {
        Dut::new(Rc::clone(&self.shared))
    }

    /// Runs `test` to completion.
    ///
    /// Returns the test's value once its future completes. Fails if a
    /// background task returns an error, if the kernel fails, or if the test
    /// is waiting with nothing left to wake it.
    pub fn run<F, Fut, T>(self, test: F) -> Result<SimOutcome<T>, SimError>
    where
        F: FnOnce(Dut) -> Fut,
        Fut: Future<Output = T> + 'static,
        T: 'static,
    {
        let dut = self.dut();
        tracing::debug!(model = %dut.name(), "simulation start");
        self.shared.kernel.borrow_mut().initialize()?;

        let slot: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));
        let out = Rc::clone(&slot);
        let body = test(dut.clone());
        self.shared.spawn(Box::pin(async move {
            let value = body.await;
            *out.borrow_mut() = Some(value);
            Ok::<(), SimError>(())
        }));

        let result = self.event_loop(&slot);
        let flushed = self.shared.kernel.borrow_mut().finish_waveform();
        let value = result?;
        flushed?;

        let kernel = self.shared.kernel.borrow();
        tracing::debug!(time = %kernel.now(), deltas = kernel.total_deltas(), "simulation end");
        Ok(SimOutcome {
            value,
            final_time: kernel.now(),
            total_deltas: kernel.total_deltas(),
        })
    }

    fn event_loop<T>(&self, slot: &RefCell<Option<T>>) -> Result<T, SimError> {
        let mut tasks: HashMap<TaskId, LocalTask> = HashMap::new();
        let result = self.drive(&mut tasks, slot);
        // Pending tasks hold `Dut` handles back into `shared`; drop them here.
        drop(tasks);
        self.shared.spawned.borrow_mut().clear();
        result
    }

    fn drive<T>(
        &self,
        tasks: &mut HashMap<TaskId, LocalTask>,
        slot: &RefCell<Option<T>>,
    ) -> Result<T, SimError> {
        loop {
            while let Some(id) = self.next_ready(tasks) {
                let Some(task) = tasks.get_mut(&id) else {
                    continue;
                };
                let waker = Waker::from(Arc::new(TaskWaker {
                    id,
                    ready: Arc::clone(&self.shared.ready),
                }));
                let mut cx = Context::from_waker(&waker);
                if let Poll::Ready(done) = task.as_mut().poll(&mut cx) {
                    tasks.remove(&id);
                    self.shared.finished.borrow_mut().insert(id);
                    done?;
                }
                if let Some(value) = slot.borrow_mut().take() {
                    return Ok(value);
                }
            }

            self.shared.kernel.borrow_mut().settle()?;
            if self.has_ready() {
                continue;
            }

            let mut kernel = self.shared.kernel.borrow_mut();
            if !kernel.advance()? {
                return Err(SimError::Stalled {
                    time_fs: kernel.now().fs,
                });
            }
        }
    }

    /// Adopts newly spawned tasks, drops cancelled ones, and pops the next ready ID.
    fn next_ready(&self, tasks: &mut HashMap<TaskId, LocalTask>) -> Option<TaskId> {
        let spawned: Vec<_> = self.shared.spawned.borrow_mut().drain(..).collect();
        tasks.extend(spawned);
        let cancelled: Vec<_> = self.shared.cancelled.borrow_mut().drain(..).collect();
        for id in cancelled {
            if tasks.remove(&id).is_some() {
                tracing::trace!(?id, "task cancelled");
            }
        }
        self.shared
            .ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn has_ready(&self) -> bool {
        !self
            .shared
            .ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}
