//! Signal table: port declarations, current values and edge detection.

use std::collections::HashMap;

use ttsig_common::{Logic, LogicArray};

use crate::error::SimError;

/// Opaque ID of a signal in the kernel's signal table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct SignalId(u32);

impl SignalId {
    /// Creates a `SignalId` from a raw index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// Which side of the device boundary drives a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PortDirection {
    /// Driven by the testbench, read by the device.
    Input,
    /// Driven by the device, read by the testbench.
    Output,
}

/// A port declared by a device model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSpec {
    /// Port name, e.g. `"ui_in"`.
    pub name: String,
    /// Width in bits.
    pub width: u32,
    /// Who drives the port.
    pub direction: PortDirection,
    /// Value at time zero.
    pub init: LogicArray,
}

impl PortSpec {
    /// An input port that starts as all-`Z` (undriven).
    pub fn input(name: &str, width: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            direction: PortDirection::Input,
            init: LogicArray::high_z(width),
        }
    }

    /// An output port that starts as all-`X` (register not yet reset).
    pub fn output(name: &str, width: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            direction: PortDirection::Output,
            init: LogicArray::unknown(width),
        }
    }
}

/// Direction of a single-bit transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Transition to `1`.
    Rising,
    /// Transition to `0`.
    Falling,
}

impl Edge {
    /// Classifies the transition of bit 0 from `prev` to `curr`.
    ///
    /// Any change ending in `1` is rising and any change ending in `0` is
    /// falling, so `X -> 1` counts as a rising edge.
    pub fn between(prev: Logic, curr: Logic) -> Option<Edge> {
        match (prev, curr) {
            (p, Logic::One) if p != Logic::One => Some(Edge::Rising),
            (p, Logic::Zero) if p != Logic::Zero => Some(Edge::Falling),
            _ => None,
        }
    }
}

/// Runtime state of one signal.
#[derive(Clone, Debug)]
pub struct SignalState {
    /// Port name.
    pub name: String,
    /// Who drives it.
    pub direction: PortDirection,
    /// Current value, including writes not yet settled.
    pub value: LogicArray,
    /// Value as of the last settled delta cycle.
    pub settled: LogicArray,
}

impl SignalState {
    /// Bit width.
    pub fn width(&self) -> u32 {
        self.value.width()
    }

    /// Returns `true` if the value changed since the last settle.
    pub fn is_dirty(&self) -> bool {
        self.value != self.settled
    }
}

/// All signals of one device, indexed by ID and by name.
#[derive(Debug, Default)]
pub struct SignalTable {
    signals: Vec<SignalState>,
    by_name: HashMap<String, SignalId>,
}

impl SignalTable {
    /// Builds a table from port declarations, rejecting duplicate names.
    pub fn from_ports(ports: Vec<PortSpec>) -> Result<Self, SimError> {
        let mut table = SignalTable::default();
        for port in ports {
            if table.by_name.contains_key(&port.name) {
                return Err(SimError::DuplicateSignal { name: port.name });
            }
            let id = SignalId::from_raw(table.signals.len() as u32);
            table.by_name.insert(port.name.clone(), id);
            table.signals.push(SignalState {
                name: port.name,
                direction: port.direction,
                value: port.init,
                settled: port.init,
            });
        }
        Ok(table)
    }

    /// Looks a signal up by name.
    pub fn find(&self, name: &str) -> Result<SignalId, SimError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownSignal {
                name: name.to_string(),
            })
    }

    /// Returns the state of a signal.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this table.
    pub fn get(&self, id: SignalId) -> &SignalState {
        &self.signals[id.0 as usize]
    }

    /// Writes a value, checking direction and width.
    pub fn write(
        &mut self,
        id: SignalId,
        value: LogicArray,
        writer: PortDirection,
    ) -> Result<(), SimError> {
        let sig = &mut self.signals[id.0 as usize];
        if sig.direction != writer {
            return Err(SimError::NotWritable {
                signal: sig.name.clone(),
            });
        }
        if value.width() != sig.width() {
            return Err(SimError::WidthMismatch {
                signal: sig.name.clone(),
                expected: sig.width(),
                actual: value.width(),
            });
        }
        sig.value = value;
        Ok(())
    }

    /// Commits every dirty signal and returns `(id, previous settled value)`
    /// for each one, in ID order.
    pub fn commit(&mut self) -> Vec<(SignalId, LogicArray)> {
        let mut changed = Vec::new();
        for (idx, sig) in self.signals.iter_mut().enumerate() {
            if sig.is_dirty() {
                changed.push((SignalId::from_raw(idx as u32), sig.settled));
                sig.settled = sig.value;
            }
        }
        changed
    }

    /// Iterates `(id, state)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (SignalId, &SignalState)> {
        self.signals
            .iter()
            .enumerate()
            .map(|(i, s)| (SignalId::from_raw(i as u32), s))
    }

    /// Number of signals.
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    /// Returns `true` if the table holds no signals.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
