//! Layer Model Module
//!
//! - `Layer`: one named, toggleable kernel
//! - `LayerStack`: the ordered stack and its fold over the original image

mod layer;
mod stack;

pub use layer::Layer;
pub use stack::{Composite, LayerStack, SkippedLayer};
