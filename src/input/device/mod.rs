//! Device modules
//!
//! Each module turns the difference between the current and previous snapshot
//! into discrete events for its own target queue. Only two kinds exist, so
//! they are a closed enum rather than trait objects.

mod keyboard;
mod pointer;

use tracing::trace;

pub use keyboard::KeyboardModule;
pub use pointer::PointerModule;
pub(crate) use pointer::stamp_press_origin;

use super::element::{ElementId, EventContext, SceneGraph};
use super::error::InputError;
use super::events::InputEvent;
use super::focus::FocusManager;
use super::state::InputState;

/// Device class, used to pick each module's targets from the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Pointer,
    Keyboard,
}

impl DeviceKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Pointer => "pointer",
            Self::Keyboard => "keyboard",
        }
    }

    /// Appends the single-change steps leading from `last` to `raw`
    ///
    /// Does nothing when `raw` carries no sub-state for this device.
    pub(crate) fn decompose(self, raw: &InputState, last: &InputState, out: &mut Vec<InputState>) {
        match self {
            Self::Pointer => pointer::decompose(raw, last, out),
            Self::Keyboard => keyboard::decompose(raw, last, out),
        }
    }
}

/// Outcome of one module update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceUpdate {
    /// A required sub-state was missing, nothing was raised
    Skipped,
    Processed {
        /// Clock time of a discrete user action seen in this step
        action_time: Option<f64>,
    },
}

/// Everything a module may touch during one update
pub(crate) struct UpdateContext<'a> {
    pub scene: &'a mut dyn SceneGraph,
    pub focus: &'a mut FocusManager,
    pub state: &'a InputState,
    pub now: f64,
}

impl UpdateContext<'_> {
    /// Raises `event` on one element
    ///
    /// Focus requests made by the handler are deferred to the router.
    pub fn trigger(&mut self, id: ElementId, event: &InputEvent) -> bool {
        let Some(element) = self.scene.element_mut(id) else {
            return false;
        };

        let mut cx = EventContext::new(self.state);
        let handled = element.handle_event(event, &mut cx);
        if let Some(request) = cx.take_focus_request() {
            self.focus.defer(request);
        }

        trace!(element = %id, event = ?event.kind(), handled, "dispatched");
        handled
    }

    /// Raises `event` along `queue` until an element handles it
    pub fn first_responder(
        &mut self,
        queue: impl IntoIterator<Item = ElementId>,
        event: &InputEvent,
    ) -> Option<ElementId> {
        for id in queue {
            if self.trigger(id, event) {
                return Some(id);
            }
        }
        None
    }
}

/// A registered device module
pub enum DeviceModule {
    Pointer(PointerModule),
    Keyboard(KeyboardModule),
}

impl DeviceModule {
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Pointer(_) => DeviceKind::Pointer,
            Self::Keyboard(_) => DeviceKind::Keyboard,
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Pointer(module) => module.is_enabled(),
            Self::Keyboard(module) => module.is_enabled(),
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            Self::Pointer(module) => module.set_enabled(enabled),
            Self::Keyboard(module) => module.set_enabled(enabled),
        }
    }

    /// Live target queue, front-most first
    pub fn queue(&self) -> &[ElementId] {
        match self {
            Self::Pointer(module) => module.queue(),
            Self::Keyboard(module) => module.queue(),
        }
    }

    pub fn clear_queue(&mut self) {
        match self {
            Self::Pointer(module) => module.clear_queue(),
            Self::Keyboard(module) => module.clear_queue(),
        }
    }

    pub fn set_up_queue(&mut self, queue: Vec<ElementId>) {
        match self {
            Self::Pointer(module) => module.set_up_queue(queue),
            Self::Keyboard(module) => module.set_up_queue(queue),
        }
    }

    /// First element in the live queue asking for focus
    pub fn focus_target(&self, scene: &dyn SceneGraph) -> Option<ElementId> {
        self.queue()
            .iter()
            .copied()
            .find(|&id| scene.requests_focus(id))
    }

    pub(crate) fn update(&mut self, cx: &mut UpdateContext<'_>) -> Result<DeviceUpdate, InputError> {
        match self {
            Self::Pointer(module) => module.update(cx),
            Self::Keyboard(module) => module.update(cx),
        }
    }
}
