//! In-memory scene graph and scripted input
//!
//! A small retained tree of rectangular widgets implementing
//! [`SceneGraph`](crate::input::SceneGraph), plus an input source fed from a
//! script. Used by the `input-trace` binary and the test suites.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use crate::input::{
    DeviceKind, Element, ElementId, EventContext, EventKind, FocusRequest, InputEvent, InputSource,
    InputState, SceneGraph,
};

/// Rectangular area for hit testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is inside this rectangle
    pub fn contains(&self, pos: [f32; 2]) -> bool {
        pos[0] >= self.x
            && pos[0] <= self.x + self.width
            && pos[1] >= self.y
            && pos[1] <= self.y + self.height
    }
}

/// One dispatched event, in delivery order
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub element: ElementId,
    pub event: InputEvent,
    pub handled: bool,
}

type Journal = Rc<RefCell<Vec<DispatchRecord>>>;

/// Rectangular scene element with scripted handlers
pub struct Widget {
    id: ElementId,
    name: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    bounds: Rect,
    alive: bool,
    visible: bool,
    accepts_focus: bool,
    requests_focus: bool,
    high_frequency: bool,
    pointer_input: bool,
    keyboard_input: bool,
    hovered: bool,
    focused: bool,
    /// Event kinds this widget reports as handled
    handles: HashSet<EventKind>,
    /// Focus changes requested while handling an event kind
    focus_requests: HashMap<EventKind, FocusRequest>,
    journal: Journal,
}

impl Widget {
    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Report the given event kinds as handled
    pub fn handle(&mut self, kinds: impl IntoIterator<Item = EventKind>) -> &mut Self {
        self.handles.extend(kinds);
        self
    }

    pub fn set_bounds(&mut self, bounds: Rect) -> &mut Self {
        self.bounds = bounds;
        self
    }

    pub fn set_visible(&mut self, visible: bool) -> &mut Self {
        self.visible = visible;
        self
    }

    /// Marks the widget as disposed while its handle still resolves
    pub fn set_alive(&mut self, alive: bool) -> &mut Self {
        self.alive = alive;
        self
    }

    pub fn set_accepts_focus(&mut self, accepts: bool) -> &mut Self {
        self.accepts_focus = accepts;
        self
    }

    pub fn set_requests_focus(&mut self, requests: bool) -> &mut Self {
        self.requests_focus = requests;
        self
    }

    pub fn set_high_frequency(&mut self, enabled: bool) -> &mut Self {
        self.high_frequency = enabled;
        self
    }

    /// Choose which devices include this widget in their target queue
    pub fn set_input(&mut self, pointer: bool, keyboard: bool) -> &mut Self {
        self.pointer_input = pointer;
        self.keyboard_input = keyboard;
        self
    }

    /// Ask for a focus change whenever an event of `kind` arrives
    pub fn request_focus_on(&mut self, kind: EventKind, request: FocusRequest) -> &mut Self {
        self.focus_requests.insert(kind, request);
        self
    }
}

impl Element for Widget {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn is_present(&self) -> bool {
        self.visible
    }

    fn accepts_focus(&self) -> bool {
        self.accepts_focus
    }

    fn requests_focus(&self) -> bool {
        self.requests_focus
    }

    fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    fn contains(&self, position: [f32; 2]) -> bool {
        self.bounds.contains(position)
    }

    fn wants_high_frequency_position(&self) -> bool {
        self.high_frequency
    }

    fn is_hovered(&self) -> bool {
        self.hovered
    }

    fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn handle_event(&mut self, event: &InputEvent, cx: &mut EventContext<'_>) -> bool {
        let kind = event.kind();
        if let Some(request) = self.focus_requests.get(&kind) {
            cx.request_focus(request.target());
        }

        let handled = self.handles.contains(&kind);
        self.journal.borrow_mut().push(DispatchRecord {
            element: self.id,
            event: event.clone(),
            handled,
        });
        handled
    }
}

/// Tree of widgets
///
/// Traversal order is depth first with parents before children and siblings
/// in insertion order, so later widgets are drawn on top.
#[derive(Default)]
pub struct SandboxScene {
    widgets: BTreeMap<ElementId, Widget>,
    roots: Vec<ElementId>,
    next_id: u64,
    journal: Journal,
}

impl SandboxScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level widget
    pub fn add_root(&mut self, name: impl Into<String>, bounds: Rect) -> ElementId {
        let id = self.insert(name.into(), None, bounds);
        self.roots.push(id);
        id
    }

    /// Adds a widget as the last child of `parent`
    pub fn add_child(&mut self, parent: ElementId, name: impl Into<String>, bounds: Rect) -> ElementId {
        let id = self.insert(name.into(), Some(parent), bounds);
        if let Some(widget) = self.widgets.get_mut(&parent) {
            widget.children.push(id);
        }
        id
    }

    fn insert(&mut self, name: String, parent: Option<ElementId>, bounds: Rect) -> ElementId {
        self.next_id += 1;
        let id = ElementId(self.next_id);
        self.widgets.insert(
            id,
            Widget {
                id,
                name,
                parent,
                children: Vec::new(),
                bounds,
                alive: true,
                visible: true,
                accepts_focus: false,
                requests_focus: false,
                high_frequency: false,
                pointer_input: true,
                keyboard_input: true,
                hovered: false,
                focused: false,
                handles: HashSet::new(),
                focus_requests: HashMap::new(),
                journal: Rc::clone(&self.journal),
            },
        );
        id
    }

    /// Removes a widget and its subtree
    pub fn remove(&mut self, id: ElementId) {
        self.detach(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(widget) = self.widgets.remove(&next) {
                stack.extend(widget.children);
            }
        }
    }

    /// Moves a widget (and its subtree) under a new parent, or to the top level
    pub fn reparent(&mut self, id: ElementId, parent: Option<ElementId>) {
        if !self.widgets.contains_key(&id) {
            return;
        }
        self.detach(id);
        match parent {
            Some(parent) => {
                if let Some(widget) = self.widgets.get_mut(&parent) {
                    widget.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        if let Some(widget) = self.widgets.get_mut(&id) {
            widget.parent = parent;
        }
    }

    fn detach(&mut self, id: ElementId) {
        let parent = self.widgets.get(&id).and_then(|w| w.parent);
        match parent {
            Some(parent) => {
                if let Some(widget) = self.widgets.get_mut(&parent) {
                    widget.children.retain(|&child| child != id);
                }
            }
            None => self.roots.retain(|&root| root != id),
        }
    }

    pub fn widget(&self, id: ElementId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub fn widget_mut(&mut self, id: ElementId) -> Option<&mut Widget> {
        self.widgets.get_mut(&id)
    }

    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.widgets.values().find(|w| w.name == name).map(|w| w.id)
    }

    /// Every dispatch so far, in delivery order
    pub fn journal(&self) -> Vec<DispatchRecord> {
        self.journal.borrow().clone()
    }

    pub fn take_journal(&mut self) -> Vec<DispatchRecord> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }

    pub fn clear_journal(&mut self) {
        self.journal.borrow_mut().clear();
    }

    /// Event kinds delivered to `id`, handled or not
    pub fn received(&self, id: ElementId) -> Vec<EventKind> {
        self.journal
            .borrow()
            .iter()
            .filter(|record| record.element == id)
            .map(|record| record.event.kind())
            .collect()
    }

    /// Elements that handled an event of `kind`, in delivery order
    pub fn handled_by(&self, kind: EventKind) -> Vec<ElementId> {
        self.journal
            .borrow()
            .iter()
            .filter(|record| record.handled && record.event.kind() == kind)
            .map(|record| record.element)
            .collect()
    }

    /// Number of deliveries of `kind`, handled or not
    pub fn count(&self, kind: EventKind) -> usize {
        self.journal
            .borrow()
            .iter()
            .filter(|record| record.event.kind() == kind)
            .count()
    }

    fn visit(&self, id: ElementId, device: DeviceKind, state: &InputState, queue: &mut Vec<ElementId>) {
        let Some(widget) = self.widgets.get(&id) else {
            return;
        };
        if !widget.alive || !widget.visible {
            return;
        }

        let takes_input = match device {
            DeviceKind::Pointer => {
                widget.pointer_input
                    && state
                        .pointer()
                        .is_some_and(|pointer| widget.bounds.contains(pointer.position))
            }
            DeviceKind::Keyboard => widget.keyboard_input,
        };
        if takes_input {
            queue.push(id);
        }

        for &child in &widget.children {
            self.visit(child, device, state, queue);
        }
    }
}

impl SceneGraph for SandboxScene {
    fn build_input_queue(&self, device: DeviceKind, state: &InputState, queue: &mut Vec<ElementId>) {
        for &root in &self.roots {
            self.visit(root, device, state, queue);
        }
    }

    fn element(&self, id: ElementId) -> Option<&dyn Element> {
        self.widgets.get(&id).map(|w| w as &dyn Element)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut dyn Element> {
        self.widgets.get_mut(&id).map(|w| w as &mut dyn Element)
    }
}

/// Input source replaying scripted snapshots, one batch per poll
///
/// Clones share the same script, so a test can keep a handle after
/// registering the source with a router.
#[derive(Clone)]
pub struct ScriptedSource {
    name: String,
    batches: Rc<RefCell<VecDeque<Vec<InputState>>>>,
    enabled: Rc<Cell<bool>>,
}

impl ScriptedSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: Rc::new(RefCell::new(VecDeque::new())),
            enabled: Rc::new(Cell::new(true)),
        }
    }

    /// Queues one poll's worth of snapshots
    pub fn push_batch(&self, states: Vec<InputState>) {
        self.batches.borrow_mut().push_back(states);
    }

    /// Queues a poll producing a single snapshot
    pub fn push(&self, state: InputState) {
        self.push_batch(vec![state]);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn remaining(&self) -> usize {
        self.batches.borrow().len()
    }
}

impl InputSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn pending_states(&mut self) -> Vec<InputState> {
        self.batches.borrow_mut().pop_front().unwrap_or_default()
    }
}
