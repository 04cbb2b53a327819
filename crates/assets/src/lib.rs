//! Asset loading: glTF models from disk and HDR environments from disk or HTTP.
//!
//! Loaders are plain blocking functions. [`spawn_model_load`] and
//! [`spawn_environment_load`] run them on background threads and report back
//! through an [`AssetSink`], so the thread that owns the scene never blocks.
//!
//! # Invariants
//! - Every background load delivers exactly one terminal event.
//! - Loaders never touch the scene; they hand over owned values.

mod dispatch;
mod error;
#[cfg(test)]
mod fixtures;
mod gltf_import;
mod hdr;
mod source;

pub use dispatch::{AssetEvent, AssetSink, spawn_environment_load, spawn_model_load};
pub use error::AssetError;
pub use gltf_import::{LoadProgress, load_model};
pub use hdr::{decode_hdr, load_environment};
pub use source::AssetSource;
