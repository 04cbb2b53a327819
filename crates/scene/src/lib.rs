//! Scene state: the model, its environment lighting and the camera that views it.
//!
//! # Invariants
//! - The scene holds at most one model and one environment, each set once.
//! - Model rotation can only change after a model is attached.
//! - Every mutation is recorded in the scene event log.

mod camera;
mod environment;
mod model;
mod scene;

pub use camera::PerspectiveCamera;
pub use environment::{EnvironmentMap, Mapping};
pub use model::{ImageRgba8, Material, MeshPrimitive, Model};
pub use scene::{Scene, SceneEvent};
