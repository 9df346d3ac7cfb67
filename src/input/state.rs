//! Raw input state snapshots

use std::rc::Rc;

use bitflags::bitflags;
use indexmap::IndexSet;

use super::events::{KeyCode, MouseButton};

/// Input state snapshot for a single distinct step
///
/// Sub-states are reference counted: deriving a new snapshot copies only the
/// sub-state it changes and shares the other one. A snapshot published by the
/// router is never mutated again.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keyboard: Option<Rc<KeyboardState>>,
    pointer: Option<Rc<PointerState>>,
    /// Previous published snapshot. Its own link is always cut.
    last: Option<Box<InputState>>,
}

/// Pointer input state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointerState {
    /// Logical screen coordinates
    pub position: [f32; 2],
    /// Where the first currently-held button went down
    pub press_origin: Option<[f32; 2]>,
    /// Pressed buttons
    pub buttons: MouseButtons,
    /// Scroll delta this step
    pub wheel_delta: [f32; 2],
}

bitflags! {
    /// Set of pressed mouse buttons
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        const LEFT = 1;
        const MIDDLE = 1 << 1;
        const RIGHT = 1 << 2;
        const BACK = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

impl From<MouseButton> for MouseButtons {
    fn from(button: MouseButton) -> Self {
        match button {
            MouseButton::Left => Self::LEFT,
            MouseButton::Middle => Self::MIDDLE,
            MouseButton::Right => Self::RIGHT,
            MouseButton::Back => Self::BACK,
            MouseButton::Forward => Self::FORWARD,
        }
    }
}

/// Keyboard input state
///
/// Keys keep the order in which they were pressed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    keys: IndexSet<KeyCode>,
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl InputState {
    /// Creates a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this state carrying the given pointer sub-state
    pub fn with_pointer(mut self, pointer: PointerState) -> Self {
        self.pointer = Some(Rc::new(pointer));
        self
    }

    /// Returns this state carrying the given keyboard sub-state
    pub fn with_keyboard(mut self, keyboard: KeyboardState) -> Self {
        self.keyboard = Some(Rc::new(keyboard));
        self
    }

    pub fn pointer(&self) -> Option<&PointerState> {
        self.pointer.as_deref()
    }

    pub fn keyboard(&self) -> Option<&KeyboardState> {
        self.keyboard.as_deref()
    }

    /// The snapshot this one replaced
    pub fn last(&self) -> Option<&InputState> {
        self.last.as_deref()
    }

    /// Mutable pointer sub-state, copied first if it is shared
    pub fn pointer_mut(&mut self) -> Option<&mut PointerState> {
        self.pointer.as_mut().map(Rc::make_mut)
    }

    /// Mutable keyboard sub-state, copied first if it is shared
    pub fn keyboard_mut(&mut self) -> Option<&mut KeyboardState> {
        self.keyboard.as_mut().map(Rc::make_mut)
    }

    /// Modifiers derived from the pressed keys
    pub fn modifiers(&self) -> Modifiers {
        self.keyboard()
            .map(KeyboardState::modifiers)
            .unwrap_or_default()
    }

    /// Copy of this snapshot without its link to the previous one
    ///
    /// Sub-states are shared, not cloned.
    pub fn detached(&self) -> Self {
        Self {
            keyboard: self.keyboard.clone(),
            pointer: self.pointer.clone(),
            last: None,
        }
    }

    /// Zeroes the wheel delta, copying the pointer sub-state only if needed
    pub(crate) fn clear_wheel(&mut self) {
        if self.pointer().is_some_and(|p| p.wheel_delta != [0.0, 0.0])
            && let Some(pointer) = self.pointer_mut()
        {
            pointer.wheel_delta = [0.0, 0.0];
        }
    }

    pub(crate) fn shares_pointer_with(&self, other: &InputState) -> bool {
        match (&self.pointer, &other.pointer) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn pointer_rc(&self) -> Option<&Rc<PointerState>> {
        self.pointer.as_ref()
    }

    pub(crate) fn keyboard_rc(&self) -> Option<&Rc<KeyboardState>> {
        self.keyboard.as_ref()
    }

    pub(crate) fn set_pointer_rc(&mut self, pointer: Option<Rc<PointerState>>) {
        self.pointer = pointer;
    }

    pub(crate) fn set_keyboard_rc(&mut self, keyboard: Option<Rc<KeyboardState>>) {
        self.keyboard = keyboard;
    }

    /// Links `last` as the previous snapshot, dropping whatever it pointed to
    pub(crate) fn link_last(&mut self, mut last: InputState) {
        last.last = None;
        self.last = Some(Box::new(last));
    }
}

impl PointerState {
    /// Creates a pointer state at `position` with no buttons held
    pub fn new(position: [f32; 2]) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Returns this state with `button` held
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.set_pressed(button, true);
        self
    }

    /// Returns this state with a wheel delta
    pub fn with_wheel(mut self, delta: [f32; 2]) -> Self {
        self.wheel_delta = delta;
        self
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons.contains(button.into())
    }

    pub fn set_pressed(&mut self, button: MouseButton, pressed: bool) {
        self.buttons.set(button.into(), pressed);
    }

    pub fn has_any_button_pressed(&self) -> bool {
        !self.buttons.is_empty()
    }
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state holding `keys`, in order
    pub fn from_keys(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Pressed keys in press order
    pub fn keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys.iter().copied()
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    /// Releases `key`, keeping the order of the remaining keys
    pub fn release(&mut self, key: KeyCode) {
        self.keys.shift_remove(&key);
    }

    pub fn modifiers(&self) -> Modifiers {
        let held = |a, b| self.is_pressed(a) || self.is_pressed(b);
        Modifiers {
            shift: held(KeyCode::LShift, KeyCode::RShift),
            ctrl: held(KeyCode::LControl, KeyCode::RControl),
            alt: held(KeyCode::LAlt, KeyCode::RAlt),
            meta: held(KeyCode::LSuper, KeyCode::RSuper),
        }
    }
}

/// Euclidean distance between two points
pub(crate) fn distance(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    (dx * dx + dy * dy).sqrt()
}
