//! Input mapping: window events in, viewer actions out.
//!
//! # Invariants
//! - Pointer rotation is absolute: the same position always yields the same rotation.
//! - No smoothing, no coalescing; every event maps independently.

pub mod event;
pub mod pointer;

pub use event::InputEvent;
pub use pointer::pointer_rotation;
