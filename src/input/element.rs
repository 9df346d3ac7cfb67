//! Scene graph contracts consumed by the router

use std::fmt;

use super::device::DeviceKind;
use super::events::InputEvent;
use super::state::InputState;

/// Handle to an element owned by the scene graph
///
/// Handles are only meaningful for the pass that produced them. A handle that
/// no longer resolves is treated as neither alive nor present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Focus change asked for by an element handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequest {
    Focus(ElementId),
    Clear,
}

impl FocusRequest {
    pub fn target(self) -> Option<ElementId> {
        match self {
            Self::Focus(id) => Some(id),
            Self::Clear => None,
        }
    }
}

/// Context handed to an element while it handles an event
pub struct EventContext<'a> {
    state: &'a InputState,
    focus_request: Option<FocusRequest>,
}

impl<'a> EventContext<'a> {
    pub(crate) fn new(state: &'a InputState) -> Self {
        Self {
            state,
            focus_request: None,
        }
    }

    /// The snapshot being processed
    pub fn state(&self) -> &InputState {
        self.state
    }

    /// Ask the router to move focus once this handler returns
    ///
    /// Doing this while handling [`InputEvent::FocusLost`] is a programming
    /// error and aborts the focus change.
    pub fn request_focus(&mut self, target: Option<ElementId>) {
        self.focus_request = Some(match target {
            Some(id) => FocusRequest::Focus(id),
            None => FocusRequest::Clear,
        });
    }

    pub(crate) fn take_focus_request(&mut self) -> Option<FocusRequest> {
        self.focus_request.take()
    }
}

/// A visual element able to receive input
pub trait Element {
    /// Still attached to the scene
    fn is_alive(&self) -> bool {
        true
    }

    /// Visible and enabled
    fn is_present(&self) -> bool;

    fn accepts_focus(&self) -> bool {
        false
    }

    /// Wants focus when nothing else holds it
    fn requests_focus(&self) -> bool {
        false
    }

    fn parent(&self) -> Option<ElementId>;

    /// Hit test in screen space
    fn contains(&self, position: [f32; 2]) -> bool;

    /// Receives a move event every pass, not only when the pointer moves
    fn wants_high_frequency_position(&self) -> bool {
        false
    }

    fn is_hovered(&self) -> bool;

    /// Only the pointer module's hover maintenance calls this
    fn set_hovered(&mut self, hovered: bool);

    fn set_focused(&mut self, focused: bool);

    /// Handle an event
    ///
    /// # Returns
    /// * `true` if the event was consumed (stops propagation to the rest of the queue)
    /// * `false` if the event was not handled
    fn handle_event(&mut self, event: &InputEvent, cx: &mut EventContext<'_>) -> bool;
}

/// Read and dispatch access to the scene graph
pub trait SceneGraph {
    /// Append every alive and present element that takes input from `device`,
    /// in scene traversal order (back-most first)
    fn build_input_queue(&self, device: DeviceKind, state: &InputState, queue: &mut Vec<ElementId>);

    fn element(&self, id: ElementId) -> Option<&dyn Element>;

    fn element_mut(&mut self, id: ElementId) -> Option<&mut dyn Element>;

    fn is_alive(&self, id: ElementId) -> bool {
        self.element(id).is_some_and(|e| e.is_alive())
    }

    fn is_present(&self, id: ElementId) -> bool {
        self.element(id).is_some_and(|e| e.is_present())
    }

    fn accepts_focus(&self, id: ElementId) -> bool {
        self.element(id).is_some_and(|e| e.accepts_focus())
    }

    fn requests_focus(&self, id: ElementId) -> bool {
        self.element(id).is_some_and(|e| e.requests_focus())
    }

    fn is_hovered(&self, id: ElementId) -> bool {
        self.element(id).is_some_and(|e| e.is_hovered())
    }

    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).and_then(|e| e.parent())
    }
}

/// Walks the parent chain of `id`, nearest ancestor first
pub(crate) fn ancestors(
    scene: &dyn SceneGraph,
    id: ElementId,
) -> impl Iterator<Item = ElementId> + '_ {
    std::iter::successors(scene.parent(id), move |&parent| scene.parent(parent))
}
