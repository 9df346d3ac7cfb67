//! Discrete input events raised on scene elements

use super::state::Modifiers;

/// Discrete events raised by the device modules
///
/// Every event is delivered to at most one element: dispatch walks a target
/// queue and stops at the first element whose handler returns `true`.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer moved to a new position
    MouseMove { position: [f32; 2] },

    /// A button went down
    MouseDown {
        button: MouseButton,
        position: [f32; 2],
    },

    /// A button went up
    MouseUp {
        button: MouseButton,
        position: [f32; 2],
    },

    /// Primary button pressed and released without an invalidating drag
    Click { position: [f32; 2] },

    /// Second primary press inside the double-click window
    DoubleClick { position: [f32; 2] },

    /// Pointer left the press origin while a button was held
    DragStart {
        /// Position where the first button went down
        origin: [f32; 2],
        position: [f32; 2],
    },

    /// Pointer moved while an element is being dragged
    Drag {
        origin: [f32; 2],
        position: [f32; 2],
        /// Movement since the previous pass
        delta: [f32; 2],
    },

    /// Last button released while an element was being dragged
    DragEnd {
        origin: [f32; 2],
        position: [f32; 2],
    },

    /// Scroll wheel moved
    Wheel {
        delta: [f32; 2],
        position: [f32; 2],
    },

    /// Pointer entered the element
    Hover { position: [f32; 2] },

    /// Pointer left the element
    HoverLost { position: [f32; 2] },

    /// Key went down, or is auto-repeating
    KeyDown {
        key: KeyCode,
        repeat: bool,
        modifiers: Modifiers,
    },

    /// Key went up
    KeyUp { key: KeyCode, modifiers: Modifiers },

    /// Element gained focus
    Focus,

    /// Element lost focus
    FocusLost,
}

impl InputEvent {
    /// Fieldless tag of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MouseMove { .. } => EventKind::MouseMove,
            Self::MouseDown { .. } => EventKind::MouseDown,
            Self::MouseUp { .. } => EventKind::MouseUp,
            Self::Click { .. } => EventKind::Click,
            Self::DoubleClick { .. } => EventKind::DoubleClick,
            Self::DragStart { .. } => EventKind::DragStart,
            Self::Drag { .. } => EventKind::Drag,
            Self::DragEnd { .. } => EventKind::DragEnd,
            Self::Wheel { .. } => EventKind::Wheel,
            Self::Hover { .. } => EventKind::Hover,
            Self::HoverLost { .. } => EventKind::HoverLost,
            Self::KeyDown { .. } => EventKind::KeyDown,
            Self::KeyUp { .. } => EventKind::KeyUp,
            Self::Focus => EventKind::Focus,
            Self::FocusLost => EventKind::FocusLost,
        }
    }
}

/// Event tag without payload, handy for filtering and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseMove,
    MouseDown,
    MouseUp,
    Click,
    DoubleClick,
    DragStart,
    Drag,
    DragEnd,
    Wheel,
    Hover,
    HoverLost,
    KeyDown,
    KeyUp,
    Focus,
    FocusLost,
}

/// Mouse button identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

impl MouseButton {
    /// Every button, in the fixed order used for state decomposition
    pub const ALL: [MouseButton; 5] = [
        MouseButton::Left,
        MouseButton::Middle,
        MouseButton::Right,
        MouseButton::Back,
        MouseButton::Forward,
    ];

    /// The button that drives clicks and double-clicks
    pub const PRIMARY: MouseButton = MouseButton::Left;
}

impl TryFrom<winit::event::MouseButton> for MouseButton {
    type Error = ();

    fn try_from(button: winit::event::MouseButton) -> Result<Self, Self::Error> {
        use winit::event::MouseButton as WB;
        match button {
            WB::Left => Ok(Self::Left),
            WB::Middle => Ok(Self::Middle),
            WB::Right => Ok(Self::Right),
            WB::Back => Ok(Self::Back),
            WB::Forward => Ok(Self::Forward),
            WB::Other(_) => Err(()),
        }
    }
}

/// Key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    // Common keys
    Space,
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Home,
    End,

    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Numbers
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Arrows
    Left,
    Right,
    Up,
    Down,

    // Modifiers
    LControl,
    RControl,
    LShift,
    RShift,
    LAlt,
    RAlt,
    LSuper,
    RSuper,

    /// Physical key without a dedicated variant
    Unidentified(winit::keyboard::KeyCode),
}

impl KeyCode {
    /// Modifier keys are reported once per press and never auto-repeat
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Self::LControl
                | Self::RControl
                | Self::LShift
                | Self::RShift
                | Self::LAlt
                | Self::RAlt
                | Self::LSuper
                | Self::RSuper
        )
    }
}

/// Convert from winit key code
impl From<winit::keyboard::KeyCode> for KeyCode {
    fn from(key: winit::keyboard::KeyCode) -> Self {
        use winit::keyboard::KeyCode as WK;
        match key {
            WK::Space => Self::Space,
            WK::Enter => Self::Enter,
            WK::Escape => Self::Escape,
            WK::Backspace => Self::Backspace,
            WK::Tab => Self::Tab,
            WK::Delete => Self::Delete,
            WK::Home => Self::Home,
            WK::End => Self::End,

            WK::KeyA => Self::A,
            WK::KeyB => Self::B,
            WK::KeyC => Self::C,
            WK::KeyD => Self::D,
            WK::KeyE => Self::E,
            WK::KeyF => Self::F,
            WK::KeyG => Self::G,
            WK::KeyH => Self::H,
            WK::KeyI => Self::I,
            WK::KeyJ => Self::J,
            WK::KeyK => Self::K,
            WK::KeyL => Self::L,
            WK::KeyM => Self::M,
            WK::KeyN => Self::N,
            WK::KeyO => Self::O,
            WK::KeyP => Self::P,
            WK::KeyQ => Self::Q,
            WK::KeyR => Self::R,
            WK::KeyS => Self::S,
            WK::KeyT => Self::T,
            WK::KeyU => Self::U,
            WK::KeyV => Self::V,
            WK::KeyW => Self::W,
            WK::KeyX => Self::X,
            WK::KeyY => Self::Y,
            WK::KeyZ => Self::Z,

            WK::Digit0 => Self::Num0,
            WK::Digit1 => Self::Num1,
            WK::Digit2 => Self::Num2,
            WK::Digit3 => Self::Num3,
            WK::Digit4 => Self::Num4,
            WK::Digit5 => Self::Num5,
            WK::Digit6 => Self::Num6,
            WK::Digit7 => Self::Num7,
            WK::Digit8 => Self::Num8,
            WK::Digit9 => Self::Num9,

            WK::F1 => Self::F1,
            WK::F2 => Self::F2,
            WK::F3 => Self::F3,
            WK::F4 => Self::F4,
            WK::F5 => Self::F5,
            WK::F6 => Self::F6,
            WK::F7 => Self::F7,
            WK::F8 => Self::F8,
            WK::F9 => Self::F9,
            WK::F10 => Self::F10,
            WK::F11 => Self::F11,
            WK::F12 => Self::F12,

            WK::ArrowLeft => Self::Left,
            WK::ArrowRight => Self::Right,
            WK::ArrowUp => Self::Up,
            WK::ArrowDown => Self::Down,

            WK::ControlLeft => Self::LControl,
            WK::ControlRight => Self::RControl,
            WK::ShiftLeft => Self::LShift,
            WK::ShiftRight => Self::RShift,
            WK::AltLeft => Self::LAlt,
            WK::AltRight => Self::RAlt,
            WK::SuperLeft => Self::LSuper,
            WK::SuperRight => Self::RSuper,

            other => Self::Unidentified(other),
        }
    }
}
