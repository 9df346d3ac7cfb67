//! Per-tick reconciliation of raw input against the scene graph

use tracing::{debug, info, trace};

use super::clock::Clock;
use super::collector::InputSource;
use super::device::{DeviceKind, DeviceModule, DeviceUpdate, KeyboardModule, PointerModule, UpdateContext, stamp_press_origin};
use super::distinct::DistinctStates;
use super::element::{ElementId, SceneGraph};
use super::error::InputError;
use super::focus::FocusManager;
use super::state::{InputState, KeyboardState, PointerState};
use crate::config::InputConfig;

/// Hook run on every snapshot before it is published
pub type StateTransform = Box<dyn FnMut(&mut InputState)>;

/// Root of the input system
///
/// Owns the published snapshot, the device modules and the focus. Call
/// [`InputRouter::update`] once per frame, after the scene has been laid out.
pub struct InputRouter {
    config: InputConfig,
    sources: Vec<Box<dyn InputSource>>,
    /// Device modules in registration order
    devices: Vec<DeviceModule>,
    focus: FocusManager,
    current: InputState,
    transform: Option<StateTransform>,
    last_action_time: Option<f64>,
    /// Debug: distinct snapshots processed by the last update
    last_step_count: usize,
}

impl InputRouter {
    /// Creates a router with a pointer and a keyboard module
    pub fn new(config: InputConfig) -> Self {
        Self {
            config,
            sources: Vec::new(),
            devices: vec![
                DeviceModule::Pointer(PointerModule::new(config)),
                DeviceModule::Keyboard(KeyboardModule::new(config)),
            ],
            focus: FocusManager::new(),
            current: InputState::new()
                .with_pointer(PointerState::default())
                .with_keyboard(KeyboardState::new()),
            transform: None,
            last_action_time: None,
            last_step_count: 0,
        }
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Adds a polling source; sources are drained in registration order
    pub fn register_source(&mut self, source: Box<dyn InputSource>) {
        info!(source = source.name(), "registered input source");
        self.sources.push(source);
    }

    /// Installs a hook that may rewrite each snapshot before it is published
    pub fn set_state_transform(&mut self, transform: impl FnMut(&mut InputState) + 'static) {
        self.transform = Some(Box::new(transform));
    }

    pub fn clear_state_transform(&mut self) {
        self.transform = None;
    }

    pub fn set_device_enabled(&mut self, kind: DeviceKind, enabled: bool) {
        for device in self.devices.iter_mut().filter(|d| d.kind() == kind) {
            device.set_enabled(enabled);
        }
        debug!(device = kind.name(), enabled, "device toggled");
    }

    /// Runs one reconciliation pass
    ///
    /// Drains every source, walks the resulting distinct snapshots through the
    /// device modules and settles focus.
    pub fn update(&mut self, scene: &mut dyn SceneGraph, clock: &dyn Clock) -> Result<(), InputError> {
        let now = clock.now();

        let mut pending = self.collect_pending_states();
        if pending.is_empty() {
            // Modules still need a pass for hover and key repeat
            pending.push(InputState::new());
        }

        self.focus.unfocus_if_no_longer_valid(scene, &self.current)?;

        let kinds: Vec<DeviceKind> = self.devices.iter().map(DeviceModule::kind).collect();
        let steps = DistinctStates::new(&self.current, pending, kinds);

        self.last_step_count = 0;
        for step in steps {
            self.last_step_count += 1;
            self.publish(step);
            self.rebuild_queues(scene);

            for device in self.devices.iter_mut().filter(|d| d.is_enabled()) {
                let mut cx = UpdateContext {
                    scene: &mut *scene,
                    focus: &mut self.focus,
                    state: &self.current,
                    now,
                };

                if let DeviceUpdate::Processed {
                    action_time: Some(time),
                } = device.update(&mut cx)?
                {
                    self.last_action_time = Some(time);
                }

                self.focus.apply_deferred(scene, &self.current)?;
            }
        }

        self.focus.unfocus_if_no_longer_valid(scene, &self.current)?;
        if self.focus.focused().is_none() {
            self.focus_top_most_requesting(scene)?;
        }

        trace!(steps = self.last_step_count, "input update finished");
        Ok(())
    }

    /// Moves focus to `target`, or clears it
    ///
    /// Returns `Ok(false)` if the target is not present or does not accept focus.
    pub fn change_focus(&mut self, scene: &mut dyn SceneGraph, target: Option<ElementId>) -> Result<bool, InputError> {
        let changed = self.focus.change_focus(scene, target, &self.current)?;
        self.focus.apply_deferred(scene, &self.current)?;
        Ok(changed)
    }

    /// Drops focus and hands it to the front-most element requesting it
    pub fn trigger_focus_contention(&mut self, scene: &mut dyn SceneGraph) -> Result<(), InputError> {
        self.focus.change_focus(scene, None, &self.current)?;
        self.rebuild_queues(scene);
        self.focus_top_most_requesting(scene)
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focus.focused()
    }

    /// Hovered elements, front-most first
    pub fn hovered_elements(&self) -> &[ElementId] {
        self.devices
            .iter()
            .find_map(|device| match device {
                DeviceModule::Pointer(pointer) => Some(pointer.hovered()),
                DeviceModule::Keyboard(_) => None,
            })
            .unwrap_or(&[])
    }

    /// Last published snapshot
    pub fn current_state(&self) -> &InputState {
        &self.current
    }

    /// Clock time of the most recent button or key press
    pub fn last_action_time(&self) -> Option<f64> {
        self.last_action_time
    }

    pub fn device(&self, kind: DeviceKind) -> Option<&DeviceModule> {
        self.devices.iter().find(|d| d.kind() == kind)
    }

    /// Get debug information about the registered sources
    pub fn debug_sources(&self) -> Vec<(String, bool)> {
        self.sources
            .iter()
            .map(|s| (s.name().to_string(), s.is_active() && s.is_enabled()))
            .collect()
    }

    /// Get the number of distinct snapshots processed by the last update
    pub fn debug_last_step_count(&self) -> usize {
        self.last_step_count
    }

    /// Drains every source; snapshots of inactive or disabled sources are dropped
    fn collect_pending_states(&mut self) -> Vec<InputState> {
        let mut states = Vec::new();
        for source in &mut self.sources {
            let pending = source.pending_states();
            if source.is_active() && source.is_enabled() {
                states.extend(pending);
            } else if !pending.is_empty() {
                trace!(source = source.name(), dropped = pending.len(), "discarded input from inactive source");
            }
        }
        states
    }

    fn publish(&mut self, mut state: InputState) {
        let previous = std::mem::take(&mut self.current);
        state.link_last(previous);

        if let Some(transform) = self.transform.as_mut() {
            transform(&mut state);
        }

        let last = state.last().map(InputState::detached).unwrap_or_default();
        stamp_press_origin(&mut state, &last);

        self.current = state;
    }

    /// Rebuilds every live queue, front-most element first
    fn rebuild_queues(&mut self, scene: &dyn SceneGraph) {
        for device in &mut self.devices {
            let mut queue = Vec::new();
            scene.build_input_queue(device.kind(), &self.current, &mut queue);
            queue.reverse();
            device.set_up_queue(queue);
        }
    }

    fn focus_top_most_requesting(&mut self, scene: &mut dyn SceneGraph) -> Result<(), InputError> {
        let candidate = self
            .devices
            .iter()
            .filter(|device| device.is_enabled())
            .find_map(|device| device.focus_target(&*scene));

        if let Some(id) = candidate {
            debug!(element = %id, "focusing top-most requesting element");
            self.focus.change_focus(scene, Some(id), &self.current)?;
            self.focus.apply_deferred(scene, &self.current)?;
        }
        Ok(())
    }
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ManualClock;
    use crate::input::events::MouseButton;
    use crate::sandbox::{Rect, SandboxScene, ScriptedSource};

    fn pointer_at(position: [f32; 2]) -> InputState {
        InputState::new().with_pointer(PointerState::new(position))
    }

    #[test]
    fn test_idle_update_processes_one_step() {
        let mut router = InputRouter::default();
        let mut scene = SandboxScene::new();
        let clock = ManualClock::new();

        router.update(&mut scene, &clock).unwrap();
        assert_eq!(router.debug_last_step_count(), 1);
        assert!(router.current_state().last().is_some());
    }

    #[test]
    fn test_last_link_is_cut() {
        let mut router = InputRouter::default();
        let mut scene = SandboxScene::new();
        let clock = ManualClock::new();

        for _ in 0..3 {
            router.update(&mut scene, &clock).unwrap();
        }
        let current = router.current_state();
        assert!(current.last().is_some());
        assert!(current.last().and_then(InputState::last).is_none());
    }

    #[test]
    fn test_disabled_source_is_drained_but_ignored() {
        let mut router = InputRouter::default();
        let mut scene = SandboxScene::new();
        let clock = ManualClock::new();
        let source = ScriptedSource::new("script");
        router.register_source(Box::new(source.clone()));

        source.set_enabled(false);
        source.push(pointer_at([5.0, 5.0]));
        router.update(&mut scene, &clock).unwrap();

        assert_eq!(source.remaining(), 0);
        assert_eq!(router.current_state().pointer().map(|p| p.position), Some([0.0, 0.0]));
        assert_eq!(router.debug_sources(), vec![("script".to_string(), false)]);
    }

    #[test]
    fn test_state_transform_runs_before_dispatch() {
        let mut router = InputRouter::default();
        let mut scene = SandboxScene::new();
        let target = scene.add_root("target", Rect::new(100.0, 100.0, 10.0, 10.0));
        let clock = ManualClock::new();
        let source = ScriptedSource::new("script");
        router.register_source(Box::new(source.clone()));

        // Shift every position into the target
        router.set_state_transform(|state| {
            if let Some(pointer) = state.pointer_mut() {
                pointer.position[0] += 100.0;
                pointer.position[1] += 100.0;
            }
        });
        source.push(pointer_at([5.0, 5.0]));
        router.update(&mut scene, &clock).unwrap();
        assert_eq!(router.hovered_elements(), &[target]);

        router.clear_state_transform();
        source.push(pointer_at([6.0, 6.0]));
        router.update(&mut scene, &clock).unwrap();
        assert!(router.hovered_elements().is_empty());
        assert_eq!(router.current_state().pointer().map(|p| p.position), Some([6.0, 6.0]));
    }

    #[test]
    fn test_press_origin_is_stamped() {
        let mut router = InputRouter::default();
        let mut scene = SandboxScene::new();
        let clock = ManualClock::new();
        let source = ScriptedSource::new("script");
        router.register_source(Box::new(source.clone()));

        source.push(InputState::new().with_pointer(PointerState::new([3.0, 4.0]).with_button(MouseButton::Left)));
        router.update(&mut scene, &clock).unwrap();
        source.push(InputState::new().with_pointer(PointerState::new([9.0, 9.0]).with_button(MouseButton::Left)));
        router.update(&mut scene, &clock).unwrap();

        let pointer = router.current_state().pointer().unwrap();
        assert_eq!(pointer.press_origin, Some([3.0, 4.0]));
        assert_eq!(router.last_action_time(), Some(0.0));
    }

    #[test]
    fn test_device_toggle() {
        let mut router = InputRouter::default();
        router.set_device_enabled(DeviceKind::Keyboard, false);
        assert!(!router.device(DeviceKind::Keyboard).unwrap().is_enabled());
        assert!(router.device(DeviceKind::Pointer).unwrap().is_enabled());
    }
}
