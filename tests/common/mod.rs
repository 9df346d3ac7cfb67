//! Shared harness for the routing integration tests

#![allow(dead_code)]

use scene_input::config::InputConfig;
use scene_input::input::{
    InputError, InputEvent, InputRouter, InputState, KeyCode, KeyboardState, ManualClock, MouseButton,
    PointerState, SceneGraph,
};
use scene_input::sandbox::{SandboxScene, ScriptedSource};

/// Router wired to a sandbox scene, a scripted source and a manual clock
pub struct Harness {
    pub router: InputRouter,
    pub scene: SandboxScene,
    pub source: ScriptedSource,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new(scene: SandboxScene) -> Self {
        Self::with_config(scene, InputConfig::default())
    }

    pub fn with_config(scene: SandboxScene, config: InputConfig) -> Self {
        let mut router = InputRouter::new(config);
        let source = ScriptedSource::new("script");
        router.register_source(Box::new(source.clone()));
        Self {
            router,
            scene,
            source,
            clock: ManualClock::new(),
        }
    }

    /// Feeds `states` at clock time `at` and runs one update
    pub fn try_step(&mut self, at: f64, states: Vec<InputState>) -> Result<(), InputError> {
        self.clock.set(at);
        self.source.push_batch(states);
        self.router.update(&mut self.scene, &self.clock)
    }

    pub fn step(&mut self, at: f64, states: Vec<InputState>) {
        self.try_step(at, states).unwrap();
        self.assert_focus_invariant();
    }

    /// Runs one update without new input
    pub fn idle(&mut self, at: f64) {
        self.step(at, Vec::new());
    }

    pub fn assert_focus_invariant(&self) {
        if let Some(id) = self.router.focused() {
            assert!(self.scene.is_alive(id), "focused element {id} is dead");
            assert!(self.scene.is_present(id), "focused element {id} is not present");
            assert!(self.scene.accepts_focus(id), "focused element {id} does not accept focus");
            let mut parent = self.scene.parent(id);
            while let Some(ancestor) = parent {
                assert!(
                    self.scene.is_present(ancestor),
                    "ancestor {ancestor} of focused element {id} is not present"
                );
                parent = self.scene.parent(ancestor);
            }
        }
    }

    /// Events delivered to anyone since the last drain
    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        self.scene.take_journal().into_iter().map(|r| r.event).collect()
    }
}

pub fn pointer(position: [f32; 2], buttons: &[MouseButton]) -> InputState {
    let pointer = buttons
        .iter()
        .fold(PointerState::new(position), |p, &button| p.with_button(button));
    InputState::new().with_pointer(pointer)
}

pub fn keys(keys: &[KeyCode]) -> InputState {
    InputState::new().with_keyboard(KeyboardState::from_keys(keys.iter().copied()))
}
