//! Integration tests for pointer routing: clicks, drags, wheel and hover

mod common;

use common::{Harness, keys, pointer};
use scene_input::input::{EventKind, InputEvent, KeyCode, MouseButton};
use scene_input::sandbox::{Rect, SandboxScene};

const LEFT: &[MouseButton] = &[MouseButton::Left];

#[test]
fn test_click_raises_click_and_focuses() {
    let mut scene = SandboxScene::new();
    let button = scene.add_root("button", Rect::new(0.0, 0.0, 40.0, 20.0));
    scene
        .widget_mut(button)
        .unwrap()
        .handle([EventKind::Click])
        .set_accepts_focus(true);

    let mut h = Harness::new(scene);
    h.step(0.0, vec![pointer([10.0, 10.0], &[])]);
    h.step(16.0, vec![pointer([10.0, 10.0], LEFT)]);
    h.step(32.0, vec![pointer([10.0, 10.0], &[])]);

    assert_eq!(h.scene.handled_by(EventKind::Click), vec![button]);
    assert_eq!(h.scene.count(EventKind::Click), 1);
    assert_eq!(h.router.focused(), Some(button));
    assert!(h.scene.widget(button).unwrap().is_focused());
}

#[test]
fn test_press_and_release_in_one_poll() {
    let mut scene = SandboxScene::new();
    let button = scene.add_root("button", Rect::new(0.0, 0.0, 40.0, 20.0));
    scene.widget_mut(button).unwrap().handle([EventKind::Click]);

    let mut h = Harness::new(scene);
    h.step(
        0.0,
        vec![pointer([10.0, 10.0], LEFT), pointer([10.0, 10.0], &[])],
    );

    let kinds: Vec<_> = h
        .scene
        .journal()
        .iter()
        .map(|r| r.event.kind())
        .filter(|k| matches!(k, EventKind::MouseDown | EventKind::MouseUp | EventKind::Click))
        .collect();
    assert_eq!(
        kinds,
        vec![EventKind::MouseDown, EventKind::MouseUp, EventKind::Click]
    );
}

#[test]
fn test_unhandled_click_clears_focus() {
    let mut scene = SandboxScene::new();
    let field = scene.add_root("field", Rect::new(0.0, 0.0, 40.0, 20.0));
    scene.widget_mut(field).unwrap().set_accepts_focus(true);

    let mut h = Harness::new(scene);
    assert_eq!(h.router.change_focus(&mut h.scene, Some(field)), Ok(true));

    h.step(0.0, vec![pointer([100.0, 100.0], LEFT)]);
    h.step(16.0, vec![pointer([100.0, 100.0], &[])]);

    assert_eq!(h.router.focused(), None);
    assert!(h.scene.received(field).contains(&EventKind::FocusLost));
}

fn slider_scene() -> (SandboxScene, scene_input::input::ElementId) {
    let mut scene = SandboxScene::new();
    let slider = scene.add_root("slider", Rect::new(0.0, 0.0, 100.0, 20.0));
    scene.widget_mut(slider).unwrap().handle([
        EventKind::DragStart,
        EventKind::Drag,
        EventKind::DragEnd,
        EventKind::Click,
    ]);
    (scene, slider)
}

#[test]
fn test_drag_past_threshold_suppresses_click() {
    let (scene, slider) = slider_scene();
    let mut h = Harness::new(scene);

    h.step(0.0, vec![pointer([0.0, 0.0], LEFT)]);
    h.step(16.0, vec![pointer([41.0, 0.0], LEFT)]);
    h.step(32.0, vec![pointer([41.0, 0.0], &[])]);

    assert_eq!(h.scene.count(EventKind::DragStart), 1);
    assert_eq!(h.scene.count(EventKind::Click), 0);
    assert_eq!(h.scene.handled_by(EventKind::DragEnd), vec![slider]);
}

#[test]
fn test_short_drag_still_clicks() {
    let (scene, slider) = slider_scene();
    let mut h = Harness::new(scene);

    h.step(0.0, vec![pointer([0.0, 0.0], LEFT)]);
    h.step(16.0, vec![pointer([30.0, 0.0], LEFT)]);
    h.step(32.0, vec![pointer([30.0, 0.0], &[])]);

    assert_eq!(h.scene.handled_by(EventKind::Click), vec![slider]);
    assert_eq!(h.scene.handled_by(EventKind::DragEnd), vec![slider]);
}

#[test]
fn test_drag_updates_go_to_drag_target() {
    let (mut scene, slider) = slider_scene();
    // Front-most, but never takes the drag
    let overlay = scene.add_root("overlay", Rect::new(0.0, 0.0, 100.0, 20.0));
    let mut h = Harness::new(scene);

    h.step(0.0, vec![pointer([0.0, 0.0], LEFT)]);
    h.step(16.0, vec![pointer([25.0, 0.0], LEFT)]);
    h.step(32.0, vec![pointer([50.0, 0.0], LEFT)]);
    h.step(48.0, vec![pointer([50.0, 0.0], &[])]);

    let journal = h.scene.journal();
    let drags: Vec<_> = journal
        .iter()
        .filter(|r| r.event.kind() == EventKind::Drag)
        .collect();
    assert_eq!(drags.len(), 1);
    assert_eq!(drags[0].element, slider);
    assert_eq!(
        drags[0].event,
        InputEvent::Drag {
            origin: [0.0, 0.0],
            position: [50.0, 0.0],
            delta: [25.0, 0.0],
        }
    );

    assert!(!h.scene.received(overlay).contains(&EventKind::Drag));
    assert!(h.scene.received(overlay).contains(&EventKind::DragStart));
    assert_eq!(h.scene.count(EventKind::DragEnd), 1);
    assert_eq!(h.scene.count(EventKind::Click), 0);
}

#[test]
fn test_double_click_suppresses_second_click() {
    let mut scene = SandboxScene::new();
    let icon = scene.add_root("icon", Rect::new(0.0, 0.0, 32.0, 32.0));
    scene
        .widget_mut(icon)
        .unwrap()
        .handle([EventKind::Click, EventKind::DoubleClick]);

    let mut h = Harness::new(scene);
    let at = [10.0, 10.0];
    h.step(0.0, vec![pointer(at, LEFT)]);
    h.step(50.0, vec![pointer(at, &[])]);
    h.step(200.0, vec![pointer(at, LEFT)]);
    h.step(250.0, vec![pointer(at, &[])]);

    assert_eq!(h.scene.count(EventKind::DoubleClick), 1);
    assert_eq!(h.scene.count(EventKind::Click), 1);

    // A third press starts a new pair
    h.step(300.0, vec![pointer(at, LEFT)]);
    h.step(350.0, vec![pointer(at, &[])]);
    assert_eq!(h.scene.count(EventKind::DoubleClick), 1);
    assert_eq!(h.scene.count(EventKind::Click), 2);
}

#[test]
fn test_unhandled_double_click_keeps_click() {
    let mut scene = SandboxScene::new();
    let icon = scene.add_root("icon", Rect::new(0.0, 0.0, 32.0, 32.0));
    scene.widget_mut(icon).unwrap().handle([EventKind::Click]);

    let mut h = Harness::new(scene);
    let at = [10.0, 10.0];
    h.step(0.0, vec![pointer(at, LEFT)]);
    h.step(50.0, vec![pointer(at, &[])]);
    h.step(100.0, vec![pointer(at, LEFT)]);
    h.step(150.0, vec![pointer(at, &[])]);

    assert_eq!(h.scene.count(EventKind::DoubleClick), 1);
    assert_eq!(h.scene.count(EventKind::Click), 2);
}

#[test]
fn test_slow_second_press_is_not_double_click() {
    let mut scene = SandboxScene::new();
    let icon = scene.add_root("icon", Rect::new(0.0, 0.0, 32.0, 32.0));
    scene.widget_mut(icon).unwrap().handle([EventKind::Click, EventKind::DoubleClick]);

    let mut h = Harness::new(scene);
    let at = [10.0, 10.0];
    h.step(0.0, vec![pointer(at, LEFT)]);
    h.step(50.0, vec![pointer(at, &[])]);
    h.step(400.0, vec![pointer(at, LEFT)]);
    h.step(450.0, vec![pointer(at, &[])]);

    assert_eq!(h.scene.count(EventKind::DoubleClick), 0);
    assert_eq!(h.scene.count(EventKind::Click), 2);
}

#[test]
fn test_release_reaches_press_targets() {
    let mut scene = SandboxScene::new();
    let button = scene.add_root("button", Rect::new(0.0, 0.0, 40.0, 20.0));
    scene
        .widget_mut(button)
        .unwrap()
        .handle([EventKind::MouseDown, EventKind::MouseUp, EventKind::Click]);

    let mut h = Harness::new(scene);
    h.step(0.0, vec![pointer([10.0, 10.0], LEFT)]);

    // The button moves away while held
    h.scene
        .widget_mut(button)
        .unwrap()
        .set_bounds(Rect::new(200.0, 200.0, 40.0, 20.0));
    h.step(16.0, vec![pointer([10.0, 10.0], &[])]);

    assert_eq!(h.scene.handled_by(EventKind::MouseUp), vec![button]);
    // Not in the live queue any more
    assert_eq!(h.scene.count(EventKind::Click), 0);
}

#[test]
fn test_release_skips_hidden_and_removed_targets() {
    let mut scene = SandboxScene::new();
    let hidden = scene.add_root("hidden", Rect::new(0.0, 0.0, 40.0, 20.0));
    let removed = scene.add_root("removed", Rect::new(0.0, 0.0, 40.0, 20.0));

    let mut h = Harness::new(scene);
    h.step(0.0, vec![pointer([10.0, 10.0], LEFT)]);

    h.scene.widget_mut(hidden).unwrap().set_visible(false);
    h.scene.remove(removed);
    h.step(16.0, vec![pointer([10.0, 10.0], &[])]);

    assert_eq!(h.scene.count(EventKind::MouseUp), 0);
}

#[test]
fn test_first_responder_stops_propagation() {
    let mut scene = SandboxScene::new();
    let back = scene.add_root("back", Rect::new(0.0, 0.0, 100.0, 100.0));
    let front = scene.add_root("front", Rect::new(0.0, 0.0, 100.0, 100.0));
    for id in [back, front] {
        scene.widget_mut(id).unwrap().handle([EventKind::MouseDown]);
    }

    let mut h = Harness::new(scene);
    h.step(0.0, vec![pointer([10.0, 10.0], LEFT)]);

    assert_eq!(h.scene.handled_by(EventKind::MouseDown), vec![front]);
    assert!(!h.scene.received(back).contains(&EventKind::MouseDown));
}

#[test]
fn test_unhandled_events_walk_the_whole_queue() {
    let mut scene = SandboxScene::new();
    let back = scene.add_root("back", Rect::new(0.0, 0.0, 100.0, 100.0));
    let front = scene.add_root("front", Rect::new(0.0, 0.0, 100.0, 100.0));

    let mut h = Harness::new(scene);
    h.step(0.0, vec![pointer([10.0, 10.0], LEFT)]);

    let order: Vec<_> = h
        .scene
        .journal()
        .iter()
        .filter(|r| r.event.kind() == EventKind::MouseDown)
        .map(|r| r.element)
        .collect();
    assert_eq!(order, vec![front, back]);
}

#[test]
fn test_wheel_raised_once() {
    let mut scene = SandboxScene::new();
    let list = scene.add_root("list", Rect::new(0.0, 0.0, 100.0, 100.0));
    scene.widget_mut(list).unwrap().handle([EventKind::Wheel]);

    let mut h = Harness::new(scene);
    let mut raw = pointer([10.0, 10.0], LEFT);
    if let Some(p) = raw.pointer_mut() {
        p.wheel_delta = [0.0, -3.0];
    }
    h.step(0.0, vec![raw, keys(&[KeyCode::A])]);

    let wheels: Vec<_> = h
        .scene
        .journal()
        .into_iter()
        .filter(|r| r.event.kind() == EventKind::Wheel)
        .collect();
    assert_eq!(wheels.len(), 1);
    assert_eq!(
        wheels[0].event,
        InputEvent::Wheel {
            delta: [0.0, -3.0],
            position: [10.0, 10.0],
        }
    );

    h.idle(16.0);
    assert_eq!(h.scene.count(EventKind::Wheel), 1);
}

#[test]
fn test_hover_claimant_and_hover_lost() {
    let mut scene = SandboxScene::new();
    let panel = scene.add_root("panel", Rect::new(0.0, 0.0, 200.0, 100.0));
    let card = scene.add_child(panel, "card", Rect::new(50.0, 25.0, 50.0, 50.0));
    scene.widget_mut(card).unwrap().handle([EventKind::Hover]);

    let mut h = Harness::new(scene);

    h.step(0.0, vec![pointer([10.0, 10.0], &[])]);
    assert_eq!(h.router.hovered_elements(), &[panel]);
    assert!(h.scene.widget(panel).unwrap().is_hovered());

    // The card claims hover, so the panel behind it loses it
    h.step(16.0, vec![pointer([60.0, 30.0], &[])]);
    assert_eq!(h.router.hovered_elements(), &[card]);
    assert!(!h.scene.widget(panel).unwrap().is_hovered());
    assert_eq!(h.scene.received(panel).last(), Some(&EventKind::HoverLost));

    // Hover is not raised again while the claimant stays hovered
    h.step(32.0, vec![pointer([70.0, 40.0], &[])]);
    assert_eq!(h.scene.count(EventKind::Hover), 2);
    assert_eq!(h.router.hovered_elements(), &[card]);

    h.step(48.0, vec![pointer([150.0, 50.0], &[])]);
    assert_eq!(h.router.hovered_elements(), &[panel]);
    assert!(!h.scene.widget(card).unwrap().is_hovered());

    h.step(64.0, vec![pointer([300.0, 300.0], &[])]);
    assert!(h.router.hovered_elements().is_empty());
    assert!(!h.scene.widget(panel).unwrap().is_hovered());
    assert_eq!(h.scene.count(EventKind::HoverLost), 3);
}

#[test]
fn test_hover_follows_scene_changes_without_motion() {
    let mut scene = SandboxScene::new();
    let tooltip = scene.add_root("tooltip", Rect::new(0.0, 0.0, 50.0, 50.0));

    let mut h = Harness::new(scene);
    h.step(0.0, vec![pointer([10.0, 10.0], &[])]);
    assert_eq!(h.router.hovered_elements(), &[tooltip]);

    h.scene.widget_mut(tooltip).unwrap().set_visible(false);
    h.idle(16.0);
    assert!(h.router.hovered_elements().is_empty());
    assert!(!h.scene.widget(tooltip).unwrap().is_hovered());
}

#[test]
fn test_high_frequency_move_every_pass() {
    let mut scene = SandboxScene::new();
    let tracker = scene.add_root("tracker", Rect::new(0.0, 0.0, 50.0, 50.0));
    scene.widget_mut(tracker).unwrap().set_high_frequency(true);
    let plain = scene.add_root("plain", Rect::new(0.0, 0.0, 50.0, 50.0));

    let mut h = Harness::new(scene);
    h.step(0.0, vec![pointer([5.0, 5.0], &[])]);
    h.scene.clear_journal();

    h.idle(16.0);
    assert_eq!(h.scene.received(tracker), vec![EventKind::MouseMove]);
    assert!(h.scene.received(plain).is_empty());
}

#[test]
fn test_press_sets_last_action_time() {
    let mut scene = SandboxScene::new();
    scene.add_root("button", Rect::new(0.0, 0.0, 40.0, 20.0));

    let mut h = Harness::new(scene);
    h.step(0.0, vec![pointer([10.0, 10.0], &[])]);
    assert_eq!(h.router.last_action_time(), None);

    h.step(120.0, vec![pointer([10.0, 10.0], LEFT)]);
    h.step(180.0, vec![pointer([12.0, 10.0], LEFT)]);
    assert_eq!(h.router.last_action_time(), Some(120.0));
}
