//! Distinct-state decomposition
//!
//! A raw snapshot may differ from the previous one by several button and key
//! changes at once. [`DistinctStates`] turns a batch of raw snapshots into a
//! sequence in which every step after the first of each raw snapshot changes
//! exactly one button or key, so device modules never see two discrete changes
//! in a single step.

use std::collections::VecDeque;
use std::rc::Rc;
use std::vec;

use super::device::DeviceKind;
use super::state::InputState;

/// Lazy iterator over single-change snapshots
///
/// For every raw snapshot it first yields the continuous part (position and
/// wheel, with buttons and keys held at their previous values), then one
/// snapshot per button change and one per key change in device order. Each
/// raw snapshot is decomposed against the last snapshot yielded before it.
pub struct DistinctStates {
    last: InputState,
    raw: vec::IntoIter<InputState>,
    pending: VecDeque<InputState>,
    devices: Vec<DeviceKind>,
}

impl DistinctStates {
    pub fn new(last: &InputState, raw: Vec<InputState>, devices: impl IntoIterator<Item = DeviceKind>) -> Self {
        Self {
            last: last.detached(),
            raw: raw.into_iter(),
            pending: VecDeque::new(),
            devices: devices.into_iter().collect(),
        }
    }

    fn expand(&mut self, raw: &InputState) {
        let base = continuous_step(raw, &self.last);

        let mut steps = Vec::new();
        let mut previous = base.detached();
        for device in &self.devices {
            let start = steps.len();
            device.decompose(raw, &previous, &mut steps);
            if let Some(step) = steps[start..].last() {
                previous = step.detached();
            }
        }

        self.pending.push_back(base);
        self.pending.extend(steps);
    }
}

impl Iterator for DistinctStates {
    type Item = InputState;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(state) = self.pending.pop_front() {
                self.last = state.detached();
                return Some(state);
            }

            let raw = self.raw.next()?;
            self.expand(&raw);
        }
    }
}

/// The raw snapshot with its discrete state reverted to `last`
///
/// A missing sub-state is carried over from `last` with the wheel zeroed.
fn continuous_step(raw: &InputState, last: &InputState) -> InputState {
    let mut step = InputState::new();

    match (raw.pointer(), last.pointer()) {
        (Some(pointer), Some(previous)) if pointer.buttons != previous.buttons => {
            let mut pointer = pointer.clone();
            pointer.buttons = previous.buttons;
            step = step.with_pointer(pointer);
        }
        (Some(_), Some(_)) => step.set_pointer_rc(raw.pointer_rc().cloned()),
        (Some(pointer), None) => {
            let mut pointer = pointer.clone();
            pointer.buttons = Default::default();
            step = step.with_pointer(pointer);
        }
        (None, _) => {
            let mut carried = last.detached();
            carried.clear_wheel();
            step.set_pointer_rc(carried.pointer_rc().cloned());
        }
    }

    // Keys only change in the device steps
    let keyboard = match (raw.keyboard_rc(), last.keyboard_rc()) {
        (_, Some(previous)) => Some(Rc::clone(previous)),
        (Some(_), None) => Some(Rc::default()),
        (None, None) => None,
    };
    step.set_keyboard_rc(keyboard);

    step
}
