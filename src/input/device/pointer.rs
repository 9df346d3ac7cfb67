//! Pointer device module
//!
//! Raises move, button, wheel, click, double-click, drag and hover events.
//!
//! Two queues are in play. The live queue is rebuilt every step from the
//! scene. The press queue is a copy of the live queue taken when a button goes
//! down; it is kept until the last button goes up, so release, drag-start and
//! click reach the elements that saw the press even if the scene changed in
//! between.

use tracing::debug;

use super::{DeviceUpdate, UpdateContext};
use crate::config::InputConfig;
use crate::input::element::ElementId;
use crate::input::error::InputError;
use crate::input::events::{InputEvent, MouseButton};
use crate::input::focus::click_focus_target;
use crate::input::state::{InputState, PointerState, distance};

pub struct PointerModule {
    enabled: bool,
    config: InputConfig,
    /// Live queue, front-most first
    queue: Vec<ElementId>,
    /// Live queue as it was when the last button went down
    press_queue: Option<Vec<ElementId>>,
    drag_started: bool,
    dragging: Option<ElementId>,
    valid_click: bool,
    last_click_time: Option<f64>,
    hovered: Vec<ElementId>,
    /// Element whose hover handler stopped the last hover walk
    hover_claimant: Option<ElementId>,
}

impl PointerModule {
    pub fn new(config: InputConfig) -> Self {
        Self {
            enabled: true,
            config,
            queue: Vec::new(),
            press_queue: None,
            drag_started: false,
            dragging: None,
            valid_click: false,
            last_click_time: None,
            hovered: Vec::new(),
            hover_claimant: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn queue(&self) -> &[ElementId] {
        &self.queue
    }

    /// Clears the live queue; the press queue survives
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn set_up_queue(&mut self, queue: Vec<ElementId>) {
        self.queue = queue;
    }

    /// Hovered elements, front-most first
    pub fn hovered(&self) -> &[ElementId] {
        &self.hovered
    }

    /// Element currently being dragged
    pub fn dragging(&self) -> Option<ElementId> {
        self.dragging
    }

    pub(crate) fn update(&mut self, cx: &mut UpdateContext<'_>) -> Result<DeviceUpdate, InputError> {
        let state = cx.state;
        let (Some(pointer), Some(last)) = (state.pointer(), state.last().and_then(InputState::pointer))
        else {
            return Ok(DeviceUpdate::Skipped);
        };

        let position = pointer.position;
        let mut action_time = None;

        if position != last.position {
            cx.first_responder(self.queue.iter().copied(), &InputEvent::MouseMove { position });
            if self.drag_started {
                self.handle_drag(cx, pointer, last);
            }
        }

        for button in MouseButton::ALL {
            let was_pressed = last.is_pressed(button);
            if was_pressed != pointer.is_pressed(button) {
                if was_pressed {
                    self.handle_mouse_up(cx, button, position);
                } else {
                    self.handle_mouse_down(cx, button, position);
                }
            }
        }

        if pointer.wheel_delta != [0.0, 0.0] {
            let event = InputEvent::Wheel {
                delta: pointer.wheel_delta,
                position,
            };
            cx.first_responder(self.queue.iter().copied(), &event);
        }

        if pointer.has_any_button_pressed() {
            let origin = pointer.press_origin.unwrap_or(position);

            if !last.has_any_button_pressed() {
                action_time = Some(cx.now);

                if pointer.is_pressed(MouseButton::PRIMARY) {
                    self.valid_click = true;

                    match self.last_click_time {
                        Some(last_click) if cx.now - last_click < self.config.double_click_time => {
                            // A handled double-click replaces the click of this press
                            if self.handle_double_click(cx, position) {
                                self.valid_click = false;
                            }
                            self.last_click_time = None;
                        }
                        _ => self.last_click_time = Some(cx.now),
                    }
                }
            }

            if !self.drag_started && distance(origin, position) > self.config.drag_start_distance {
                self.drag_started = true;
                self.handle_drag_start(cx, origin, position);
            }
        } else if last.has_any_button_pressed() {
            let origin = last.press_origin.unwrap_or(position);

            if self.valid_click
                && (self.dragging.is_none()
                    || distance(origin, position) < self.config.click_drag_distance)
            {
                self.handle_click(cx, position)?;
            }

            self.press_queue = None;
            self.valid_click = false;

            if self.drag_started {
                self.drag_started = false;
                self.handle_drag_end(cx, origin, position);
            }
        }

        self.update_hover(cx, position);
        self.update_high_frequency(cx, position);

        Ok(DeviceUpdate::Processed { action_time })
    }

    fn handle_mouse_down(&mut self, cx: &mut UpdateContext<'_>, button: MouseButton, position: [f32; 2]) -> bool {
        self.press_queue = Some(self.queue.clone());
        let event = InputEvent::MouseDown { button, position };
        cx.first_responder(self.queue.iter().copied(), &event).is_some()
    }

    fn handle_mouse_up(&self, cx: &mut UpdateContext<'_>, button: MouseButton, position: [f32; 2]) -> bool {
        let Some(press_queue) = &self.press_queue else {
            return false;
        };

        let event = InputEvent::MouseUp { button, position };
        // The press queue may be stale
        press_queue
            .iter()
            .any(|&id| cx.scene.is_alive(id) && cx.scene.is_present(id) && cx.trigger(id, &event))
    }

    fn handle_click(&self, cx: &mut UpdateContext<'_>, position: [f32; 2]) -> Result<bool, InputError> {
        let press_queue = self.press_queue.as_deref().unwrap_or_default();
        let event = InputEvent::Click { position };

        let mut clicked = None;
        for &id in &self.queue {
            if !press_queue.contains(&id) {
                continue;
            }
            let under_pointer = cx.scene.element(id).is_some_and(|e| e.contains(position));
            if under_pointer && cx.trigger(id, &event) {
                clicked = Some(id);
                break;
            }
        }

        let target = clicked.and_then(|id| click_focus_target(&*cx.scene, id, cx.focus.focused()));
        cx.focus.change_focus(cx.scene, target, cx.state)?;

        Ok(clicked.is_some())
    }

    fn handle_double_click(&self, cx: &mut UpdateContext<'_>, position: [f32; 2]) -> bool {
        let event = InputEvent::DoubleClick { position };
        cx.first_responder(self.queue.iter().copied(), &event).is_some()
    }

    fn handle_drag_start(&mut self, cx: &mut UpdateContext<'_>, origin: [f32; 2], position: [f32; 2]) {
        let event = InputEvent::DragStart { origin, position };
        self.dragging = self.press_queue.as_ref().and_then(|queue| {
            queue
                .iter()
                .copied()
                .find(|&id| cx.scene.is_alive(id) && cx.trigger(id, &event))
        });

        debug!(element = ?self.dragging, ?origin, "drag started");
    }

    fn handle_drag(&self, cx: &mut UpdateContext<'_>, pointer: &PointerState, last: &PointerState) -> bool {
        let Some(id) = self.dragging else {
            return false;
        };

        let position = pointer.position;
        let event = InputEvent::Drag {
            origin: pointer.press_origin.unwrap_or(position),
            position,
            delta: [position[0] - last.position[0], position[1] - last.position[1]],
        };
        cx.trigger(id, &event)
    }

    fn handle_drag_end(&mut self, cx: &mut UpdateContext<'_>, origin: [f32; 2], position: [f32; 2]) -> bool {
        let Some(id) = self.dragging.take() else {
            return false;
        };

        debug!(element = %id, "drag ended");
        cx.trigger(id, &InputEvent::DragEnd { origin, position })
    }

    fn update_hover(&mut self, cx: &mut UpdateContext<'_>, position: [f32; 2]) {
        let last_claimant = self.hover_claimant.take();
        let previous = std::mem::take(&mut self.hovered);

        for &id in &self.queue {
            self.hovered.push(id);

            if cx.scene.is_hovered(id) {
                // Assume the previous claimant would claim hover again
                if Some(id) == last_claimant {
                    self.hover_claimant = Some(id);
                    break;
                }
                continue;
            }

            if let Some(element) = cx.scene.element_mut(id) {
                element.set_hovered(true);
            }
            if cx.trigger(id, &InputEvent::Hover { position }) {
                self.hover_claimant = Some(id);
                break;
            }
        }

        for id in previous {
            if self.hovered.contains(&id) {
                continue;
            }
            if let Some(element) = cx.scene.element_mut(id) {
                element.set_hovered(false);
            }
            cx.trigger(id, &InputEvent::HoverLost { position });
        }
    }

    fn update_high_frequency(&self, cx: &mut UpdateContext<'_>, position: [f32; 2]) {
        let event = InputEvent::MouseMove { position };
        for &id in &self.queue {
            let wants = cx
                .scene
                .element(id)
                .is_some_and(|e| e.wants_high_frequency_position());
            if wants && cx.trigger(id, &event) {
                break;
            }
        }
    }
}

/// Pointer half of the distinct-state decomposition
///
/// One step per button whose state differs, in [`MouseButton::ALL`] order.
pub(crate) fn decompose(raw: &InputState, last: &InputState, out: &mut Vec<InputState>) {
    let Some(target) = raw.pointer() else {
        return;
    };

    let mut previous = last.detached();
    previous.clear_wheel();

    for button in MouseButton::ALL {
        let was_pressed = previous.pointer().is_some_and(|p| p.is_pressed(button));
        if was_pressed == target.is_pressed(button) {
            continue;
        }

        let mut pointer = previous
            .pointer()
            .cloned()
            .unwrap_or_else(|| PointerState::new(target.position));
        pointer.set_pressed(button, !was_pressed);

        let next = previous.detached().with_pointer(pointer);
        previous = next.detached();
        out.push(next);
    }
}

/// Fills in the press origin of a snapshot about to be published
///
/// The origin is the position where the first held button went down and is
/// carried over from `previous` while any button stays held.
pub(crate) fn stamp_press_origin(state: &mut InputState, previous: &InputState) {
    let Some(pointer) = state.pointer() else {
        return;
    };

    let origin = if pointer.has_any_button_pressed() {
        previous
            .pointer()
            .filter(|p| p.has_any_button_pressed())
            .and_then(|p| p.press_origin)
            .or(Some(pointer.position))
    } else {
        None
    };

    if pointer.press_origin != origin
        && let Some(pointer) = state.pointer_mut()
    {
        pointer.press_origin = origin;
    }
}
