//! Simulation kernel: signal table, timer queue, edge waiters and the
//! delta-cycle settle loop.
//!
//! The kernel owns all simulation state but never runs tasks itself; the
//! scheduler in [`crate::scheduler`] polls tasks and calls
//! [`Kernel::settle`] and [`Kernel::advance`] between rounds. Triggers
//! register themselves here with a completion flag and a [`Waker`]; firing
//! a trigger sets the flag and wakes the owning task.

use std::cell::Cell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::rc::Rc;
use std::task::Waker;

use ttsig_common::LogicArray;

use crate::error::SimError;
use crate::model::{DeviceModel, ModelContext};
use crate::signal::{Edge, PortDirection, SignalId, SignalTable};
use crate::time::SimTime;
use crate::waveform::{TraceVar, WaveformRecorder};

/// Default maximum delta cycles per time step.
pub const DEFAULT_MAX_DELTAS: u32 = 10_000;

/// A pending `Timer` wakeup.
struct TimerEntry {
    at: SimTime,
    /// Insertion order; breaks ties so same-time timers fire FIFO.
    seq: u64,
    fired: Rc<Cell<bool>>,
    waker: Waker,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at).then(self.seq.cmp(&other.seq))
    }
}

/// A task waiting for an edge on a single-bit signal.
struct EdgeWaiter {
    signal: SignalId,
    edge: Edge,
    fired: Rc<Cell<bool>>,
    waker: Waker,
}

/// All mutable simulation state.
pub(crate) struct Kernel {
    now: SimTime,
    signals: SignalTable,
    model: Box<dyn DeviceModel>,
    timers: BinaryHeap<Reverse<TimerEntry>>,
    edge_waiters: Vec<EdgeWaiter>,
    next_seq: u64,
    recorder: Option<Box<dyn WaveformRecorder>>,
    max_deltas: u32,
    deltas_this_step: u32,
    total_deltas: u64,
    time_limit: Option<SimTime>,
}

impl Kernel {
    /// Builds the signal table from the model's port list.
    pub(crate) fn new(model: Box<dyn DeviceModel>) -> Result<Self, SimError> {
        let signals = SignalTable::from_ports(model.ports())?;
        Ok(Self {
            now: SimTime::ZERO,
            signals,
            model,
            timers: BinaryHeap::new(),
            edge_waiters: Vec::new(),
            next_seq: 0,
            recorder: None,
            max_deltas: DEFAULT_MAX_DELTAS,
            deltas_this_step: 0,
            total_deltas: 0,
            time_limit: None,
        })
    }

    pub(crate) fn set_recorder(&mut self, recorder: Box<dyn WaveformRecorder>) {
        self.recorder = Some(recorder);
    }

    pub(crate) fn set_time_limit(&mut self, limit: SimTime) {
        self.time_limit = Some(limit);
    }

    pub(crate) fn set_max_delta(&mut self, max: u32) {
        self.max_deltas = max;
    }

    pub(crate) fn now(&self) -> SimTime {
        self.now
    }

    pub(crate) fn total_deltas(&self) -> u64 {
        self.total_deltas
    }

    pub(crate) fn signals(&self) -> &SignalTable {
        &self.signals
    }

    pub(crate) fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Declares traced signals, dumps initial values and lets the model
    /// drive its outputs for time zero.
    pub(crate) fn initialize(&mut self) -> Result<(), SimError> {
        if let Some(rec) = self.recorder.as_mut() {
            let vars: Vec<TraceVar> = self
                .signals
                .iter()
                .map(|(id, s)| TraceVar {
                    id,
                    name: s.name.clone(),
                    width: s.width(),
                })
                .collect();
            rec.declare(self.model.name(), &vars)?;
            for (id, s) in self.signals.iter() {
                rec.change(0, id, &s.value)?;
            }
        }
        self.model
            .evaluate(&mut ModelContext::new(&mut self.signals, &[]))
    }

    /// Applies a testbench write to an input port.
    pub(crate) fn write_input(&mut self, id: SignalId, value: LogicArray) -> Result<(), SimError> {
        self.signals.write(id, value, PortDirection::Input)
    }

    pub(crate) fn schedule_timer(&mut self, delay: SimTime, fired: Rc<Cell<bool>>, waker: Waker) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Reverse(TimerEntry {
            at: self.now + delay,
            seq,
            fired,
            waker,
        }));
    }

    pub(crate) fn wait_edge(
        &mut self,
        signal: SignalId,
        edge: Edge,
        fired: Rc<Cell<bool>>,
        waker: Waker,
    ) {
        self.edge_waiters.push(EdgeWaiter {
            signal,
            edge,
            fired,
            waker,
        });
    }

    /// Runs delta cycles until no signal changes: commit, record, evaluate
    /// the model, wake edge waiters.
    pub(crate) fn settle(&mut self) -> Result<(), SimError> {
        loop {
            let changed = self.signals.commit();
            if changed.is_empty() {
                return Ok(());
            }
            self.deltas_this_step += 1;
            self.total_deltas += 1;
            if self.deltas_this_step > self.max_deltas {
                return Err(SimError::DeltaCycleLimit {
                    fs: self.now.fs,
                    max_deltas: self.max_deltas,
                });
            }

            if let Some(rec) = self.recorder.as_mut() {
                for (id, _) in &changed {
                    rec.change(self.now.fs, *id, &self.signals.get(*id).settled)?;
                }
            }

            self.model
                .evaluate(&mut ModelContext::new(&mut self.signals, &changed))?;
            self.wake_edge_waiters(&changed);
        }
    }

    fn wake_edge_waiters(&mut self, changed: &[(SignalId, LogicArray)]) {
        let signals = &self.signals;
        self.edge_waiters.retain(|w| {
            let hit = changed.iter().any(|(id, prev)| {
                *id == w.signal
                    && Edge::between(prev.get(0), signals.get(*id).settled.get(0)) == Some(w.edge)
            });
            if hit {
                w.fired.set(true);
                w.waker.wake_by_ref();
            }
            !hit
        });
    }

    /// Moves time to the earliest pending timer and fires every timer due
    /// then. Returns `false` if no timer is pending.
    pub(crate) fn advance(&mut self) -> Result<bool, SimError> {
        let Some(Reverse(next)) = self.timers.peek() else {
            return Ok(false);
        };
        let at = next.at;
        if let Some(limit) = self.time_limit {
            if at > limit {
                return Err(SimError::TimeLimitExceeded { limit_fs: limit.fs });
            }
        }
        if at > self.now {
            tracing::trace!(from = %self.now, to = %at, "advancing time");
            self.now = at;
            self.deltas_this_step = 0;
        }
        while self.timers.peek().is_some_and(|Reverse(e)| e.at == at) {
            if let Some(Reverse(entry)) = self.timers.pop() {
                entry.fired.set(true);
                entry.waker.wake();
            }
        }
        Ok(true)
    }

    /// Flushes the waveform recorder, if any.
    pub(crate) fn finish_waveform(&mut self) -> Result<(), SimError> {
        match self.recorder.as_mut() {
            Some(rec) => rec.finish(),
            None => Ok(()),
        }
    }
}
