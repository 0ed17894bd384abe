//! Image file I/O for Strata
//!
//! Decoding accepts whatever the decoder recognises; the extension list in
//! the configuration is only an open-dialog filter. Encoding is chosen by
//! the destination extension.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, ImageReader};
use log::{debug, info};

use crate::config::StrataConfig;
use crate::engine::buffer::Image;
use crate::error::{Result, StrataError};

/// Encodings the save path understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
}

impl SaveFormat {
    /// Map a file extension (case-insensitive) to an encoding
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(SaveFormat::Jpeg),
            "png" => Some(SaveFormat::Png),
            "bmp" => Some(SaveFormat::Bmp),
            "tif" | "tiff" => Some(SaveFormat::Tiff),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            SaveFormat::Jpeg => ImageFormat::Jpeg,
            SaveFormat::Png => ImageFormat::Png,
            SaveFormat::Bmp => ImageFormat::Bmp,
            SaveFormat::Tiff => ImageFormat::Tiff,
        }
    }
}

/// Whether `path` has one of the default open extensions
pub fn is_supported_extension(path: &Path) -> bool {
    StrataConfig::default().accepts(path)
}

/// Load an image file
///
/// The format is sniffed from content, so a mislabelled extension still
/// decodes.
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `DecodeFailed` - If the decoder cannot read it
pub fn load_image(path: &Path) -> Result<Image> {
    if !path.exists() {
        return Err(StrataError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let decode_failed = |reason: String| StrataError::DecodeFailed {
        path: path.display().to_string(),
        reason,
    };

    let decoded = ImageReader::open(path)?
        .with_guessed_format()
        .map_err(|e| decode_failed(e.to_string()))?
        .decode()
        .map_err(|e| decode_failed(e.to_string()))?;

    let image = Image::from_rgb(decoded.to_rgb8());
    if image.is_empty() {
        return Err(decode_failed("image has no pixels".to_string()));
    }

    info!(
        "Loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Resolve the final save path, appending the default extension if absent
pub fn resolve_save_path(path: &Path, config: &StrataConfig) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(&config.default_save_extension)
    }
}

/// Save an image, choosing the encoding from the extension
///
/// Returns the path actually written.
///
/// # Errors
/// * `UnsupportedFormat` - If the extension maps to no encoder
/// * `EncodeFailed` - If encoding or writing fails
pub fn save_image(image: &Image, path: &Path, config: &StrataConfig) -> Result<PathBuf> {
    let path = resolve_save_path(path, config);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    let format = SaveFormat::from_extension(&ext)
        .ok_or_else(|| StrataError::UnsupportedFormat { format: ext.clone() })?;

    let encode_failed = |reason: String| StrataError::EncodeFailed {
        path: path.display().to_string(),
        reason,
    };

    match format {
        SaveFormat::Jpeg => {
            let file = File::create(&path).map_err(|e| encode_failed(e.to_string()))?;
            let mut encoder =
                JpegEncoder::new_with_quality(BufWriter::new(file), config.jpeg_quality);
            encoder
                .encode_image(image.as_rgb())
                .map_err(|e| encode_failed(e.to_string()))?;
        }
        other => {
            image
                .as_rgb()
                .save_with_format(&path, other.image_format())
                .map_err(|e| encode_failed(e.to_string()))?;
        }
    }

    debug!("Encoded {:?} to {}", format, path.display());
    info!("Saved {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_format_from_extension() {
        assert_eq!(SaveFormat::from_extension("JPG"), Some(SaveFormat::Jpeg));
        assert_eq!(SaveFormat::from_extension("png"), Some(SaveFormat::Png));
        assert_eq!(SaveFormat::from_extension("tif"), Some(SaveFormat::Tiff));
        assert_eq!(SaveFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_resolve_save_path_appends_default() {
        let config = StrataConfig::default();
        assert_eq!(
            resolve_save_path(Path::new("out"), &config),
            PathBuf::from("out.jpg")
        );
        assert_eq!(
            resolve_save_path(Path::new("out.png"), &config),
            PathBuf::from("out.png")
        );
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solid.png");
        let image = Image::solid(8, 4, [200, 10, 30]);

        let written = save_image(&image, &path, &StrataConfig::default()).unwrap();
        let loaded = load_image(&written).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let err = load_image(Path::new("/definitely/not/here.png")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }

    #[test]
    fn test_load_garbage_fails_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"not an image at all").unwrap();

        let err = load_image(&path).unwrap_err();
        assert_eq!(err.error_code(), "DECODE_FAILED");
    }

    #[test]
    fn test_unsupported_save_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_image(
            &Image::new(2, 2),
            &dir.path().join("out.gif"),
            &StrataConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    }
}
