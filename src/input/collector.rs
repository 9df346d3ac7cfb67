//! Raw input collection from winit events

use tracing::trace;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

use super::events::{KeyCode, MouseButton};
use super::state::{InputState, KeyboardState, PointerState};

/// Pixels scrolled per wheel line
const LINE_HEIGHT: f32 = 20.0;

/// Polling layer feeding raw snapshots to the router
pub trait InputSource {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Whether the underlying device is connected
    fn is_active(&self) -> bool {
        true
    }

    fn is_enabled(&self) -> bool {
        true
    }

    /// Raw snapshots produced since the last poll, oldest first
    fn pending_states(&mut self) -> Vec<InputState>;
}

/// Collects raw input from winit events into snapshots
///
/// Every discrete change (button or key) closes a snapshot so that the order
/// of presses survives. Motion and wheel are coalesced into the snapshot
/// handed out at the next poll.
pub struct InputCollector {
    pointer: PointerState,
    keyboard: KeyboardState,
    pending: Vec<InputState>,
    /// Continuous change waiting for the next poll
    dirty: bool,
    scale_factor: f32,
    enabled: bool,
}

impl InputCollector {
    /// Creates a new input collector
    pub fn new() -> Self {
        Self {
            pointer: PointerState::default(),
            keyboard: KeyboardState::new(),
            pending: Vec::new(),
            dirty: false,
            scale_factor: 1.0,
            enabled: true,
        }
    }

    /// Update scale factor (DPI scaling)
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = scale_factor;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Pointer moved to `position`, in logical coordinates
    pub fn cursor_moved(&mut self, position: [f32; 2]) {
        self.pointer.position = position;
        self.dirty = true;
    }

    pub fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if self.pointer.is_pressed(button) == pressed {
            return;
        }
        self.pointer.set_pressed(button, pressed);
        self.push_snapshot();
    }

    /// Accumulates a wheel delta in pixels
    pub fn mouse_wheel(&mut self, delta: [f32; 2]) {
        self.pointer.wheel_delta[0] += delta[0];
        self.pointer.wheel_delta[1] += delta[1];
        self.dirty = true;
    }

    pub fn key(&mut self, key: KeyCode, pressed: bool) {
        if self.keyboard.is_pressed(key) == pressed {
            return;
        }
        if pressed {
            self.keyboard.press(key);
        } else {
            self.keyboard.release(key);
        }
        self.push_snapshot();
    }

    /// Releases every held button and key
    pub fn release_all(&mut self) {
        for button in MouseButton::ALL {
            self.mouse_button(button, false);
        }
        let held: Vec<KeyCode> = self.keyboard.keys().collect();
        for key in held {
            self.key(key, false);
        }
    }

    /// Handle a winit window event
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved([
                    position.x as f32 / self.scale_factor,
                    position.y as f32 / self.scale_factor,
                ]);
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Ok(button) = MouseButton::try_from(*button) {
                    self.mouse_button(button, *state == ElementState::Pressed);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let pixel_delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => [*x * LINE_HEIGHT, *y * LINE_HEIGHT],
                    MouseScrollDelta::PixelDelta(pos) => [
                        pos.x as f32 / self.scale_factor,
                        pos.y as f32 / self.scale_factor,
                    ],
                };
                self.mouse_wheel(pixel_delta);
            }

            WindowEvent::KeyboardInput { event, .. } => self.handle_key_event(event),

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.set_scale_factor(*scale_factor as f32);
            }

            // Release events never arrive for keys held while unfocused
            WindowEvent::Focused(false) => self.release_all(),

            _ => {}
        }
    }

    fn handle_key_event(&mut self, event: &KeyEvent) {
        // Repeats are synthesized by the keyboard module
        if event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        self.key(KeyCode::from(code), event.state == ElementState::Pressed);
    }

    fn push_snapshot(&mut self) {
        let state = InputState::new()
            .with_pointer(self.pointer.clone())
            .with_keyboard(self.keyboard.clone());
        self.pending.push(state);
        self.pointer.wheel_delta = [0.0, 0.0];
        self.dirty = false;
    }

    /// Snapshots collected since the last call, oldest first
    pub fn take_states(&mut self) -> Vec<InputState> {
        if self.dirty {
            self.push_snapshot();
        }
        trace!(count = self.pending.len(), "collected input snapshots");
        std::mem::take(&mut self.pending)
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for InputCollector {
    fn name(&self) -> &str {
        "winit"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn pending_states(&mut self) -> Vec<InputState> {
        self.take_states()
    }
}
