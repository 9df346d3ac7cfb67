//! Input routing errors

use thiserror::Error;

use super::element::ElementId;

/// Errors raised while routing input
///
/// Only invariant violations surface here. Missing sub-states and rejected
/// focus requests are reported through return values instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    /// A focus-loss handler asked for another focus change
    #[error("focus cannot be changed while {element} is handling focus loss")]
    ReentrantFocusChange { element: ElementId },
}
