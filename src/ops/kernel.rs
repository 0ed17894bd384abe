//! Kernel trait definition
//!
//! A kernel is one pure image operation with its parameters already bound.
//! The layer stack only ever sees this uniform call shape.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::engine::Image;
use crate::error::Result;

/// Base trait for all image operations
///
/// Implementations must be deterministic and must not mutate their input:
/// `apply` reads one image and returns a freshly allocated one.
pub trait Kernel: Send + Sync + fmt::Debug {
    /// Run the operation
    fn apply(&self, image: &Image) -> Result<Image>;

    /// Machine identifier (e.g. "grayscale", "brightness")
    fn kind(&self) -> &'static str;

    /// Human-readable name, including bound parameters where relevant
    fn display_name(&self) -> String;

    /// Bound parameters as JSON (for listings and logs)
    fn params(&self) -> Value {
        json!({})
    }

    /// Clone the kernel into a boxed trait object
    fn box_clone(&self) -> Box<dyn Kernel>;
}

impl Clone for Box<dyn Kernel> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Helper macro to implement the boilerplate Kernel methods
#[macro_export]
macro_rules! impl_kernel_common {
    ($kind:expr) => {
        fn kind(&self) -> &'static str {
            $kind
        }

        fn box_clone(&self) -> Box<dyn $crate::ops::Kernel> {
            Box::new(self.clone())
        }
    };
}

type KernelFn = dyn Fn(&Image) -> Result<Image> + Send + Sync;

/// A kernel backed by a closure that captured its parameters
///
/// Lets callers register operations that are not part of the built-in
/// catalog.
#[derive(Clone)]
pub struct FnKernel {
    kind: &'static str,
    name: String,
    f: Arc<KernelFn>,
}

impl FnKernel {
    pub fn new<F>(kind: &'static str, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Image) -> Result<Image> + Send + Sync + 'static,
    {
        Self {
            kind,
            name: name.into(),
            f: Arc::new(f),
        }
    }
}

impl fmt::Debug for FnKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnKernel")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish()
    }
}

impl Kernel for FnKernel {
    fn apply(&self, image: &Image) -> Result<Image> {
        (self.f)(image)
    }

    fn kind(&self) -> &'static str {
        self.kind
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn box_clone(&self) -> Box<dyn Kernel> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrataError;

    #[test]
    fn test_fn_kernel_applies_closure() {
        let invert = FnKernel::new("invert", "Invert", |img: &Image| {
            Ok(img.map_pixels(|[r, g, b]| [255 - r, 255 - g, 255 - b]))
        });
        let out = invert.apply(&Image::solid(2, 2, [0, 10, 255])).unwrap();
        assert_eq!(out.pixel(1, 1), [255, 245, 0]);
        assert_eq!(invert.kind(), "invert");
    }

    #[test]
    fn test_boxed_clone_keeps_behaviour() {
        let failing: Box<dyn Kernel> = Box::new(FnKernel::new("fail", "Fail", |_| {
            Err(StrataError::kernel("fail", "always"))
        }));
        let cloned = failing.clone();
        assert!(cloned.apply(&Image::new(1, 1)).is_err());
        assert_eq!(cloned.display_name(), "Fail");
    }
}
