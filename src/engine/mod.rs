//! Image Engine Module
//!
//! Core image plumbing:
//! - Image buffer type
//! - File I/O operations

pub mod buffer;
pub mod io;

pub use buffer::Image;
pub use io::{is_supported_extension, load_image, resolve_save_path, save_image, SaveFormat};
