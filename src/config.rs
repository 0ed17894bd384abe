//! Runtime configuration
//!
//! Loaded from an optional JSON file. Every field has a default, so an
//! empty object (or no file at all) yields a usable configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StrataError};

/// Extensions offered by the open filter (advisory only)
pub const DEFAULT_OPEN_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "tif"];

/// Strata configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    /// Extensions offered when opening an image
    pub open_extensions: Vec<String>,
    /// Extension appended when a save path has none
    pub default_save_extension: String,
    /// JPEG encoder quality (1-100)
    pub jpeg_quality: u8,
    /// Fit box (width, height) for the on-screen copy
    pub max_display: (u32, u32),
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            open_extensions: DEFAULT_OPEN_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
            default_save_extension: "jpg".to_string(),
            jpeg_quality: 95,
            max_display: (1000, 650),
        }
    }
}

impl StrataConfig {
    /// Load configuration from a JSON file
    ///
    /// # Errors
    /// Returns error if the file is missing, is not valid JSON, or fails
    /// validation.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StrataError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let reader = BufReader::new(File::open(path)?);
        let config: StrataConfig = serde_json::from_reader(reader)?;
        config.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(StrataError::Config {
                reason: format!("jpeg_quality must be 1-100, got {}", self.jpeg_quality),
            });
        }
        if self.open_extensions.is_empty() {
            return Err(StrataError::Config {
                reason: "open_extensions must not be empty".to_string(),
            });
        }
        if self.default_save_extension.is_empty() {
            return Err(StrataError::Config {
                reason: "default_save_extension must not be empty".to_string(),
            });
        }
        if self.max_display.0 == 0 || self.max_display.1 == 0 {
            return Err(StrataError::Config {
                reason: "max_display must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Whether `path` passes the advisory open filter
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| {
                self.open_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
