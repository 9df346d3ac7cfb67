//! Scene Input
//!
//! Input event routing and focus/hover reconciliation for a retained-mode
//! scene graph.

/// Input thresholds and profile loading
pub mod config;

/// Input routing - snapshots, device modules, focus and hover
pub mod input;

/// In-memory scene graph and scripted input for tools and tests
pub mod sandbox;
