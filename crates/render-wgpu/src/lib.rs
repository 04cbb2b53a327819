//! wgpu render backend for the viewer.
//!
//! Renders the scene's model into an offscreen HDR target lit by the
//! environment map, then applies the RGB-shift pass onto the window surface.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Offscreen targets follow the viewport's clamped pixel ratio; the surface
//!   follows the window's physical size.
//! - Lost or outdated surfaces are reconfigured and the frame is skipped.

mod backend;
mod composer;
mod gpu;
mod rgb_shift;
mod scene_pass;
mod shaders;

pub use backend::WgpuBackend;
pub use rgb_shift::shift_offset;
