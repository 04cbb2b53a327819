//! Rendering adapter: renderer-agnostic backend interface plus the viewer state.
//!
//! # Invariants
//! - The render loop never renders before the backend (renderer + pipeline) exists.
//! - Backend creation is attempted once; failure is permanent and shown to the user once.
//! - Renderers read scene state; they never mutate it.

mod backend;
mod viewer;

pub use backend::{FallbackNotice, FrameError, RenderBackend, SurfaceError};
pub use viewer::{FrameOutcome, LoopState, Viewer};
