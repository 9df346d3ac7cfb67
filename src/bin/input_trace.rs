//! Replays scripted input against a sandbox scene and logs every dispatch.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use scene_input::config::InputConfig;
use scene_input::input::{
    EventKind, InputRouter, InputState, KeyCode, KeyboardState, ManualClock, MouseButton, PointerState,
};
use scene_input::sandbox::{Rect, SandboxScene, ScriptedSource};

#[derive(Parser, Debug)]
#[command(name = "input-trace")]
#[command(about = "Replay scripted input through the input router")]
struct Args {
    /// Scenario to replay
    #[arg(long, value_enum, default_value = "all")]
    scenario: Scenario,

    /// Configuration profile to load from config/
    #[arg(long, default_value = "debug")]
    profile: String,

    /// Milliseconds between idle ticks
    #[arg(long, default_value = "16")]
    tick_ms: f64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Scenario {
    Click,
    Drag,
    DoubleClick,
    KeyRepeat,
    Hover,
    All,
}

impl Scenario {
    const EACH: [Scenario; 5] = [
        Scenario::Click,
        Scenario::Drag,
        Scenario::DoubleClick,
        Scenario::KeyRepeat,
        Scenario::Hover,
    ];
}

/// Raw snapshots to feed at a given clock time
struct Frame {
    at: f64,
    states: Vec<InputState>,
}

impl Frame {
    fn new(at: f64, states: Vec<InputState>) -> Self {
        Self { at, states }
    }

    fn idle(at: f64) -> Self {
        Self::new(at, Vec::new())
    }
}

fn pointer(position: [f32; 2], buttons: &[MouseButton]) -> InputState {
    let pointer = buttons
        .iter()
        .fold(PointerState::new(position), |p, &button| p.with_button(button));
    InputState::new().with_pointer(pointer)
}

fn keys(keys: &[KeyCode]) -> InputState {
    InputState::new().with_keyboard(KeyboardState::from_keys(keys.iter().copied()))
}

fn click_scenario() -> (SandboxScene, Vec<Frame>) {
    let mut scene = SandboxScene::new();
    let button = scene.add_root("button", Rect::new(0.0, 0.0, 40.0, 20.0));
    if let Some(widget) = scene.widget_mut(button) {
        widget.handle([EventKind::Click]).set_accepts_focus(true);
    }

    let frames = vec![
        Frame::new(0.0, vec![pointer([10.0, 10.0], &[])]),
        Frame::new(16.0, vec![pointer([10.0, 10.0], &[MouseButton::Left])]),
        Frame::new(32.0, vec![pointer([10.0, 10.0], &[])]),
    ];
    (scene, frames)
}

fn drag_scenario() -> (SandboxScene, Vec<Frame>) {
    let mut scene = SandboxScene::new();
    let slider = scene.add_root("slider", Rect::new(0.0, 0.0, 100.0, 20.0));
    if let Some(widget) = scene.widget_mut(slider) {
        widget.handle([EventKind::DragStart, EventKind::Drag, EventKind::DragEnd]);
    }

    let frames = vec![
        Frame::new(0.0, vec![pointer([0.0, 0.0], &[MouseButton::Left])]),
        Frame::new(16.0, vec![pointer([25.0, 0.0], &[MouseButton::Left])]),
        Frame::new(32.0, vec![pointer([50.0, 0.0], &[MouseButton::Left])]),
        Frame::new(48.0, vec![pointer([50.0, 0.0], &[])]),
    ];
    (scene, frames)
}

fn double_click_scenario() -> (SandboxScene, Vec<Frame>) {
    let mut scene = SandboxScene::new();
    let icon = scene.add_root("icon", Rect::new(0.0, 0.0, 32.0, 32.0));
    if let Some(widget) = scene.widget_mut(icon) {
        widget.handle([EventKind::Click, EventKind::DoubleClick]);
    }

    let at = [10.0, 10.0];
    let frames = vec![
        Frame::new(0.0, vec![pointer(at, &[MouseButton::Left])]),
        Frame::new(50.0, vec![pointer(at, &[])]),
        Frame::new(200.0, vec![pointer(at, &[MouseButton::Left])]),
        Frame::new(250.0, vec![pointer(at, &[])]),
    ];
    (scene, frames)
}

fn key_repeat_scenario(tick_ms: f64) -> (SandboxScene, Vec<Frame>) {
    let mut scene = SandboxScene::new();
    let field = scene.add_root("field", Rect::new(0.0, 0.0, 100.0, 20.0));
    if let Some(widget) = scene.widget_mut(field) {
        widget
            .handle([EventKind::KeyDown, EventKind::KeyUp])
            .set_accepts_focus(true)
            .set_requests_focus(true);
    }

    let mut frames = vec![Frame::new(0.0, vec![keys(&[KeyCode::A])])];
    let mut at = tick_ms;
    while at < 400.0 {
        frames.push(Frame::idle(at));
        at += tick_ms;
    }
    frames.push(Frame::new(400.0, vec![keys(&[])]));
    (scene, frames)
}

fn hover_scenario() -> (SandboxScene, Vec<Frame>) {
    let mut scene = SandboxScene::new();
    let panel = scene.add_root("panel", Rect::new(0.0, 0.0, 200.0, 100.0));
    let card = scene.add_child(panel, "card", Rect::new(50.0, 25.0, 50.0, 50.0));
    if let Some(widget) = scene.widget_mut(card) {
        widget.handle([EventKind::Hover]);
    }

    let frames = vec![
        Frame::new(0.0, vec![pointer([10.0, 10.0], &[])]),
        Frame::new(16.0, vec![pointer([60.0, 30.0], &[])]),
        Frame::new(32.0, vec![pointer([70.0, 40.0], &[])]),
        Frame::new(48.0, vec![pointer([150.0, 50.0], &[])]),
        Frame::new(64.0, vec![pointer([300.0, 300.0], &[])]),
    ];
    (scene, frames)
}

fn replay(scenario: Scenario, config: InputConfig, tick_ms: f64) -> Result<()> {
    let (mut scene, frames) = match scenario {
        Scenario::Click => click_scenario(),
        Scenario::Drag => drag_scenario(),
        Scenario::DoubleClick => double_click_scenario(),
        Scenario::KeyRepeat => key_repeat_scenario(tick_ms),
        Scenario::Hover => hover_scenario(),
        Scenario::All => anyhow::bail!("`all` is not a single scenario"),
    };

    info!(?scenario, frames = frames.len(), "replaying");

    let mut router = InputRouter::new(config);
    let source = ScriptedSource::new(format!("{scenario:?}"));
    router.register_source(Box::new(source.clone()));
    let clock = ManualClock::new();

    for frame in frames {
        clock.set(frame.at);
        source.push_batch(frame.states);
        router
            .update(&mut scene, &clock)
            .with_context(|| format!("input update at {}ms failed", frame.at))?;

        for record in scene.take_journal() {
            let name = scene
                .widget(record.element)
                .map(|w| w.name().to_string())
                .unwrap_or_else(|| record.element.to_string());
            info!(
                at = frame.at,
                element = %name,
                event = ?record.event,
                handled = record.handled,
                "dispatch"
            );
        }
    }

    info!(
        ?scenario,
        focused = ?router.focused(),
        hovered = ?router.hovered_elements(),
        "scenario finished"
    );
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.tick_ms > 0.0, "--tick-ms must be positive");

    let config = InputConfig::load(&args.profile)
        .with_context(|| format!("failed to load input config for profile '{}'", args.profile))?;
    info!(profile = %args.profile, ?config, "loaded input config");

    let scenarios: &[Scenario] = match args.scenario {
        Scenario::All => &Scenario::EACH,
        ref single => std::slice::from_ref(single),
    };

    for &scenario in scenarios {
        replay(scenario, config, args.tick_ms)?;
    }

    Ok(())
}
