//! Error handling for Strata
//!
//! Every failure in the compositing core is local and recoverable. Errors
//! carry enough identity (file path, kernel kind, layer index and name) to
//! be surfaced on the status line.

use thiserror::Error;

/// Result type alias for Strata operations
pub type Result<T> = std::result::Result<T, StrataError>;

/// Main error type for Strata operations
#[derive(Error, Debug)]
pub enum StrataError {
    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Could not decode image {path}: {reason}")]
    DecodeFailed { path: String, reason: String },

    #[error("Could not encode image {path}: {reason}")]
    EncodeFailed { path: String, reason: String },

    #[error("Unsupported image format: {format}")]
    UnsupportedFormat { format: String },

    // State Errors
    #[error("No image loaded")]
    NoImage,

    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    // Processing Errors
    #[error("Kernel '{kernel}' failed: {reason}")]
    KernelFailed { kernel: String, reason: String },

    #[error("Layer {index} ('{name}') failed: {source}")]
    LayerFailed {
        index: usize,
        name: String,
        #[source]
        source: Box<StrataError>,
    },

    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    // Configuration Errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl StrataError {
    /// Shorthand for a kernel failure
    pub fn kernel(kernel: impl Into<String>, reason: impl Into<String>) -> Self {
        StrataError::KernelFailed {
            kernel: kernel.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            StrataError::FileNotFound { .. } => "FILE_NOT_FOUND",
            StrataError::DecodeFailed { .. } => "DECODE_FAILED",
            StrataError::EncodeFailed { .. } => "ENCODE_FAILED",
            StrataError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            StrataError::NoImage => "NO_IMAGE",
            StrataError::InvalidImage { .. } => "INVALID_IMAGE",
            StrataError::KernelFailed { .. } => "KERNEL_FAILED",
            StrataError::LayerFailed { .. } => "LAYER_FAILED",
            StrataError::UnknownOperation { .. } => "UNKNOWN_OPERATION",
            StrataError::InvalidParameter { .. } => "INVALID_PARAMETER",
            StrataError::Config { .. } => "CONFIG_ERROR",
            StrataError::Io(_) => "IO_ERROR",
            StrataError::Serialization(_) => "SERIALIZATION_ERROR",
            StrataError::Image(_) => "IMAGE_ERROR",
        }
    }

    /// Check if this error is recoverable without restarting the session
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, StrataError::Config { .. })
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            StrataError::FileNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            StrataError::DecodeFailed { .. } => vec![
                "Supported inputs: .jpg .jpeg .png .bmp .tif",
                "The file may be corrupted - try re-exporting it",
            ],
            StrataError::UnsupportedFormat { .. } => {
                vec!["Save as .jpg, .png, .bmp or .tif"]
            }
            StrataError::NoImage => vec!["Load an image first"],
            StrataError::LayerFailed { .. } => vec![
                "Disable or remove the failing layer",
                "Layers before it are still intact",
            ],
            _ => vec![],
        }
    }
}
