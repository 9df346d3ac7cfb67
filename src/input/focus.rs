//! Focus ownership and focus-change policy

use tracing::{debug, error, warn};

use super::element::{EventContext, ElementId, FocusRequest, SceneGraph, ancestors};
use super::error::InputError;
use super::events::InputEvent;
use super::state::InputState;

/// Owns the focused element
///
/// The focused element, when there is one, is alive, present, accepts focus
/// and has only present ancestors. [`FocusManager::unfocus_if_no_longer_valid`]
/// drops focus as soon as that stops holding.
#[derive(Debug, Default)]
pub struct FocusManager {
    focused: Option<ElementId>,
    /// Request made by an element handler, applied after the current device update
    deferred: Option<FocusRequest>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    pub(crate) fn defer(&mut self, request: FocusRequest) {
        self.deferred = Some(request);
    }

    /// Moves focus to `target`, or clears it when `target` is `None`
    ///
    /// Returns `Ok(false)` without touching anything if `target` is not present
    /// or does not accept focus. Fails if the element losing focus asks for a
    /// focus change from its focus-loss handler.
    pub fn change_focus(
        &mut self,
        scene: &mut dyn SceneGraph,
        target: Option<ElementId>,
        state: &InputState,
    ) -> Result<bool, InputError> {
        if target == self.focused {
            return Ok(true);
        }

        if let Some(id) = target
            && !(scene.is_present(id) && scene.accepts_focus(id))
        {
            debug!(element = %id, "focus rejected");
            return Ok(false);
        }

        let previous = self.focused.take();

        if let Some(previous) = previous
            && let Some(element) = scene.element_mut(previous)
        {
            element.set_focused(false);
            let mut cx = EventContext::new(state);
            element.handle_event(&InputEvent::FocusLost, &mut cx);

            if cx.take_focus_request().is_some() {
                error!(element = %previous, "focus change requested during focus loss");
                return Err(InputError::ReentrantFocusChange { element: previous });
            }
        }

        self.focused = target;

        if let Some(id) = target
            && let Some(element) = scene.element_mut(id)
        {
            element.set_focused(true);
            let mut cx = EventContext::new(state);
            element.handle_event(&InputEvent::Focus, &mut cx);

            if let Some(request) = cx.take_focus_request() {
                self.deferred = Some(request);
            }
        }

        debug!(from = ?previous, to = ?target, "focus changed");
        Ok(true)
    }

    /// Drops focus if the focused element stopped being a valid target
    ///
    /// Returns `true` if nothing holds focus afterwards.
    pub fn unfocus_if_no_longer_valid(
        &mut self,
        scene: &mut dyn SceneGraph,
        state: &InputState,
    ) -> Result<bool, InputError> {
        let Some(id) = self.focused else {
            return Ok(true);
        };

        if is_valid_focus(scene, id) {
            return Ok(false);
        }

        debug!(element = %id, "focused element no longer valid");
        self.change_focus(scene, None, state)?;
        Ok(true)
    }

    /// Applies the pending handler request, if any
    pub(crate) fn apply_deferred(
        &mut self,
        scene: &mut dyn SceneGraph,
        state: &InputState,
    ) -> Result<(), InputError> {
        if let Some(request) = self.deferred.take()
            && !self.change_focus(scene, request.target(), state)?
        {
            warn!(?request, "deferred focus request rejected");
        }
        Ok(())
    }
}

fn is_valid_focus(scene: &dyn SceneGraph, id: ElementId) -> bool {
    scene.is_alive(id)
        && scene.is_present(id)
        && scene.accepts_focus(id)
        && ancestors(scene, id).all(|ancestor| scene.is_present(ancestor))
}

/// Element that should hold focus after `clicked` handled a click
///
/// Falls back to the nearest focus-accepting ancestor. Focus stays on
/// `previous` when that ancestor also contains the previously focused element.
pub(crate) fn click_focus_target(
    scene: &dyn SceneGraph,
    clicked: ElementId,
    previous: Option<ElementId>,
) -> Option<ElementId> {
    if scene.accepts_focus(clicked) {
        return Some(clicked);
    }

    let candidate = ancestors(scene, clicked).find(|&ancestor| scene.accepts_focus(ancestor))?;

    if let Some(previous) = previous
        && std::iter::once(previous)
            .chain(ancestors(scene, previous))
            .any(|id| id == candidate)
    {
        return Some(previous);
    }

    Some(candidate)
}
