//! The boundary between the kernel and a device implementation.
//!
//! A [`DeviceModel`] stands in for the HDL of the design under test. The
//! kernel calls [`DeviceModel::evaluate`] once per delta cycle in which any
//! signal changed, passing a [`ModelContext`] that exposes the new values,
//! the edges that just happened, and write access to the device's outputs.

use ttsig_common::{Logic, LogicArray};

use crate::error::SimError;
use crate::signal::{Edge, PortDirection, PortSpec, SignalId, SignalTable};

/// A behavioral model of a device under test.
pub trait DeviceModel {
    /// Name of the top-level module, used as the waveform scope.
    fn name(&self) -> &str;

    /// Ports exposed by the device, in declaration order.
    fn ports(&self) -> Vec<PortSpec>;

    /// Reacts to signal changes. Called once at time zero with no edges,
    /// then after every delta cycle that changed at least one signal.
    fn evaluate(&mut self, ctx: &mut ModelContext<'_>) -> Result<(), SimError>;
}

/// View of the signal table handed to a [`DeviceModel`] during evaluation.
pub struct ModelContext<'a> {
    table: &'a mut SignalTable,
    changed: &'a [(SignalId, LogicArray)],
}

impl<'a> ModelContext<'a> {
    pub(crate) fn new(table: &'a mut SignalTable, changed: &'a [(SignalId, LogicArray)]) -> Self {
        Self { table, changed }
    }

    /// Current value of a signal.
    pub fn value(&self, name: &str) -> Result<LogicArray, SimError> {
        let id = self.table.find(name)?;
        Ok(self.table.get(id).value)
    }

    /// Bit 0 of a signal.
    pub fn bit(&self, name: &str) -> Result<Logic, SimError> {
        Ok(self.value(name)?.get(0))
    }

    /// Returns the edge `name` just went through in this delta, if any.
    pub fn edge(&self, name: &str) -> Result<Option<Edge>, SimError> {
        let id = self.table.find(name)?;
        let Some((_, prev)) = self.changed.iter().find(|(sid, _)| *sid == id) else {
            return Ok(None);
        };
        Ok(Edge::between(prev.get(0), self.table.get(id).settled.get(0)))
    }

    /// Returns `true` if `name` just rose.
    pub fn rose(&self, name: &str) -> Result<bool, SimError> {
        Ok(self.edge(name)? == Some(Edge::Rising))
    }

    /// Returns `true` if `name` changed in this delta.
    pub fn changed(&self, name: &str) -> Result<bool, SimError> {
        let id = self.table.find(name)?;
        Ok(self.changed.iter().any(|(sid, _)| *sid == id))
    }

    /// Drives one of the device's output ports.
    pub fn drive(&mut self, name: &str, value: LogicArray) -> Result<(), SimError> {
        let id = self.table.find(name)?;
        self.table.write(id, value, PortDirection::Output)
    }
}
