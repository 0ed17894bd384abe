//! Operation Catalog
//!
//! Pure image operations. Every operation implements the `Kernel` trait so
//! the layer stack can fold over them uniformly.

mod adjust;
mod catalog;
mod control;
mod convolve;
mod filters;
mod geometry;
mod kernel;

pub use adjust::{Brightness, Contrast};
pub use catalog::{
    catalog, filter_by_name, parse_control_value, parse_operation, CatalogEntry, OperationSpec,
};
pub use control::{Control, ControlValue};
pub use filters::Filter;
pub use geometry::{Rotate, Scale, Translate};
pub use kernel::{FnKernel, Kernel};
