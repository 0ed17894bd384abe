//! Strata - Layered Image Compositing
//!
//! Strata edits an image as an ordered stack of non-destructive layers.
//! The visible image is always recomputed by folding every enabled layer
//! over the untouched original.
//!
//! # Architecture
//!
//! - `engine`: RGB image buffer plus load/save
//! - `ops`: the operation catalog (filters and continuous controls)
//! - `layers`: layer stack and recomposition
//! - `editor`: editor state, live preview and status line
//! - `cli`: command-line front end

pub mod cli;
pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod layers;
pub mod ops;

pub use config::StrataConfig;
pub use editor::{EditOutcome, Editor};
pub use engine::Image;
pub use error::{Result, StrataError};
pub use layers::{Layer, LayerStack};
