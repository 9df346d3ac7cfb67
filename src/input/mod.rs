//! Input routing system
//!
//! Turns raw device snapshots into discrete events for the elements of a
//! retained scene graph, and keeps track of which element holds the keyboard
//! focus and which elements are hovered.
//!
//! # Architecture
//!
//! ```text
//! Raw Input (winit) → InputCollector ─┐
//!                                     ├→ InputSource → InputRouter
//!             scripted / replayed ────┘                     ↓
//!                                                  DistinctStates
//!                                            (one change per snapshot)
//!                                                          ↓
//!                                     PointerModule, KeyboardModule
//!                                       (live queue from SceneGraph)
//!                                                          ↓
//!                                          Element::handle_event
//! ```
//!
//! Each snapshot is processed by the pointer module and then the keyboard
//! module. An event walks the module's queue front-most element first and
//! stops at the first element that handles it.
//!
//! # Usage
//!
//! ```ignore
//! let mut router = InputRouter::new(InputConfig::load_from_env()?);
//! router.register_source(Box::new(collector));
//!
//! // Each frame, after layout
//! router.update(&mut scene, &clock)?;
//! ```

mod clock;
mod collector;
mod device;
mod distinct;
mod element;
mod error;
mod events;
mod focus;
mod router;
mod state;

// Re-export public API
pub use clock::{Clock, ManualClock, SystemClock};
pub use collector::{InputCollector, InputSource};
pub use device::{DeviceKind, DeviceModule, DeviceUpdate, KeyboardModule, PointerModule};
pub use distinct::DistinctStates;
pub use element::{Element, ElementId, EventContext, FocusRequest, SceneGraph};
pub use error::InputError;
pub use events::{EventKind, InputEvent, KeyCode, MouseButton};
pub use focus::FocusManager;
pub use router::{InputRouter, StateTransform};
pub use state::{InputState, KeyboardState, Modifiers, MouseButtons, PointerState};
