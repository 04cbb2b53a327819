//! Shared value types and constants used across the lumen crates.

pub mod constants;
mod types;

pub use types::{Rotation, Viewport};
