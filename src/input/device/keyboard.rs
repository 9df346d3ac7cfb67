//! Keyboard device module

use tracing::debug;

use super::{DeviceUpdate, UpdateContext};
use crate::config::InputConfig;
use crate::input::element::ElementId;
use crate::input::error::InputError;
use crate::input::events::{InputEvent, KeyCode};
use crate::input::state::{InputState, KeyboardState};

/// Raises key-down, key-up and key-repeat events
///
/// The focused element gets the first try at every key event, then the live
/// queue front to back.
pub struct KeyboardModule {
    enabled: bool,
    config: InputConfig,
    queue: Vec<ElementId>,
    /// Milliseconds until the next repeat of a held key
    repeat_timer: f64,
    /// Clock time of the previous processed pass
    last_update: Option<f64>,
}

impl KeyboardModule {
    pub fn new(config: InputConfig) -> Self {
        Self {
            enabled: true,
            config,
            queue: Vec::new(),
            repeat_timer: 0.0,
            last_update: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            // Keys held across a disabled stretch wait a full initial delay
            self.last_update = None;
            self.repeat_timer = self.config.key_repeat_initial_delay;
        }
    }

    pub fn queue(&self) -> &[ElementId] {
        &self.queue
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn set_up_queue(&mut self, queue: Vec<ElementId>) {
        self.queue = queue;
    }

    pub fn repeat_timer(&self) -> f64 {
        self.repeat_timer
    }

    pub(crate) fn update(&mut self, cx: &mut UpdateContext<'_>) -> Result<DeviceUpdate, InputError> {
        let state = cx.state;
        let (Some(keyboard), Some(last)) = (state.keyboard(), state.last().and_then(InputState::keyboard))
        else {
            return Ok(DeviceUpdate::Skipped);
        };

        let elapsed = self.last_update.map_or(0.0, |previous| (cx.now - previous).max(0.0));
        self.last_update = Some(cx.now);

        let mut action_time = None;

        for key in last.keys().filter(|&key| !keyboard.is_pressed(key)) {
            self.handle_key_up(cx, key)?;
        }

        let mut repeat_due = false;
        for key in keyboard.keys() {
            if last.is_pressed(key) {
                // Held keys are repeated below, once per pass
                if !key.is_modifier() {
                    repeat_due = true;
                }
                continue;
            }

            if !key.is_modifier() {
                self.repeat_timer = self.config.key_repeat_initial_delay;
                repeat_due = false;
            }
            action_time = Some(cx.now);
            self.handle_key_down(cx, key, false)?;
        }

        if repeat_due {
            self.repeat_timer -= elapsed;
            if self.repeat_timer <= 0.0
                && let Some(key) = repeating_key(keyboard, last)
            {
                self.repeat_timer = self.config.key_repeat_interval;
                self.handle_key_down(cx, key, true)?;
            }
        }

        if keyboard.is_empty() {
            self.repeat_timer = 0.0;
        }

        Ok(DeviceUpdate::Processed { action_time })
    }

    fn handle_key_down(&self, cx: &mut UpdateContext<'_>, key: KeyCode, repeat: bool) -> Result<bool, InputError> {
        if key == KeyCode::Escape {
            debug!("escape pressed, clearing focus");
            cx.focus.change_focus(cx.scene, None, cx.state)?;
            return Ok(true);
        }

        let event = InputEvent::KeyDown {
            key,
            repeat,
            modifiers: cx.state.modifiers(),
        };
        self.dispatch(cx, &event)
    }

    fn handle_key_up(&self, cx: &mut UpdateContext<'_>, key: KeyCode) -> Result<bool, InputError> {
        let event = InputEvent::KeyUp {
            key,
            modifiers: cx.state.modifiers(),
        };
        self.dispatch(cx, &event)
    }

    fn dispatch(&self, cx: &mut UpdateContext<'_>, event: &InputEvent) -> Result<bool, InputError> {
        let focused = if cx.focus.unfocus_if_no_longer_valid(cx.scene, cx.state)? {
            None
        } else {
            cx.focus.focused()
        };

        if let Some(id) = focused
            && cx.trigger(id, event)
        {
            return Ok(true);
        }

        let rest = self.queue.iter().copied().filter(|&id| Some(id) != focused);
        Ok(cx.first_responder(rest, event).is_some())
    }
}

/// Most recently pressed non-modifier key held across both passes
fn repeating_key(keyboard: &KeyboardState, last: &KeyboardState) -> Option<KeyCode> {
    keyboard
        .keys()
        .filter(|&key| !key.is_modifier() && last.is_pressed(key))
        .last()
}

/// Keyboard half of the distinct-state decomposition
///
/// Releases come first in the order of the previous key set, then presses in
/// the order of the raw key set.
pub(crate) fn decompose(raw: &InputState, last: &InputState, out: &mut Vec<InputState>) {
    let Some(target) = raw.keyboard() else {
        return;
    };

    let mut previous = last.detached();
    previous.clear_wheel();

    let before: Vec<KeyCode> = previous.keyboard().map(|k| k.keys().collect()).unwrap_or_default();

    let releases = before.iter().copied().filter(|&key| !target.is_pressed(key));
    let presses = target.keys().filter(|key| !before.contains(key));

    let changes: Vec<(KeyCode, bool)> = releases
        .map(|key| (key, false))
        .chain(presses.map(|key| (key, true)))
        .collect();

    for (key, pressed) in changes {
        let mut keyboard = previous.keyboard().cloned().unwrap_or_default();
        if pressed {
            keyboard.press(key);
        } else {
            keyboard.release(key);
        }

        let next = previous.detached().with_keyboard(keyboard);
        previous = next.detached();
        out.push(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::state::PointerState;

    fn keys(state: &InputState) -> Vec<KeyCode> {
        state.keyboard().map(|k| k.keys().collect()).unwrap_or_default()
    }

    #[test]
    fn test_decompose_releases_before_presses() {
        let last = InputState::new().with_keyboard(KeyboardState::from_keys([KeyCode::A, KeyCode::B]));
        let raw = InputState::new().with_keyboard(KeyboardState::from_keys([KeyCode::C, KeyCode::B, KeyCode::D]));

        let mut out = Vec::new();
        decompose(&raw, &last, &mut out);

        let steps: Vec<_> = out.iter().map(keys).collect();
        assert_eq!(
            steps,
            vec![
                vec![KeyCode::B],
                vec![KeyCode::B, KeyCode::C],
                vec![KeyCode::B, KeyCode::C, KeyCode::D],
            ]
        );
    }

    #[test]
    fn test_decompose_zeroes_wheel() {
        let last = InputState::new()
            .with_pointer(PointerState::new([0.0, 0.0]).with_wheel([0.0, 3.0]))
            .with_keyboard(KeyboardState::new());
        let raw = InputState::new().with_keyboard(KeyboardState::from_keys([KeyCode::Space]));

        let mut out = Vec::new();
        decompose(&raw, &last, &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].pointer().map(|p| p.wheel_delta), Some([0.0, 0.0]));
        assert_eq!(last.pointer().map(|p| p.wheel_delta), Some([0.0, 3.0]));
    }

    #[test]
    fn test_repeating_key_skips_modifiers_and_fresh_keys() {
        let last = KeyboardState::from_keys([KeyCode::A, KeyCode::LShift]);
        let now = KeyboardState::from_keys([KeyCode::A, KeyCode::LShift, KeyCode::B]);
        assert_eq!(repeating_key(&now, &last), Some(KeyCode::A));

        let last = KeyboardState::from_keys([KeyCode::LShift]);
        assert_eq!(repeating_key(&now, &last), None);
    }
}
