//! Editor Module
//!
//! - `Editor`: original image, layer stack, current image and status line
//! - `PreviewSession`: which continuous control is live and its slider values

mod preview;
mod session;

pub use preview::PreviewSession;
pub use session::{EditOutcome, Editor};
