//! # Resource Registry
//!
//! Binary resources referenced from the document tree by symbolic name.
//! Today that means images: they are loaded from a file path, a
//! `data:image/...;base64,` URI, or raw base64, and decoded once at
//! registration. Decoding up front means a missing or corrupt logo fails
//! before any output file is touched.
//!
//! Decoded pixels are flattened onto white, so the backend only ever
//! embeds opaque 8-bit RGB.

use crate::InvoiceError;
use image::{DynamicImage, Rgba};
use std::collections::HashMap;
use std::path::Path;

/// A decoded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub width_px: u32,
    pub height_px: u32,
    /// width * height * 3 bytes, row-major RGB.
    pub rgb: Vec<u8>,
}

impl LoadedImage {
    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        if self.height_px == 0 {
            1.0
        } else {
            self.width_px as f64 / self.height_px as f64
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    images: HashMap<String, LoadedImage>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and register an image file.
    pub fn register_file(&mut self, name: &str, path: &Path) -> Result<(), InvoiceError> {
        let bytes = std::fs::read(path).map_err(|e| InvoiceError::Resource {
            name: name.to_string(),
            message: format!("failed to read '{}': {}", path.display(), e),
        })?;
        self.register_bytes(name, &bytes)
    }

    /// Register an image from a source string.
    ///
    /// Supported `src` formats:
    /// - `data:image/...;base64,...`: data URI
    /// - File path (`/`, `./` or `../` prefix): read from disk
    /// - Raw base64-encoded image data
    pub fn register_source(&mut self, name: &str, src: &str) -> Result<(), InvoiceError> {
        if is_path(src) {
            return self.register_file(name, Path::new(src));
        }
        let bytes = decode_base64_source(src).map_err(|message| InvoiceError::Resource {
            name: name.to_string(),
            message,
        })?;
        self.register_bytes(name, &bytes)
    }

    /// Register already-read image bytes (JPEG or PNG).
    pub fn register_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), InvoiceError> {
        let image = decode_image_bytes(bytes).map_err(|message| InvoiceError::Resource {
            name: name.to_string(),
            message,
        })?;
        log::debug!(
            "registered image resource '{}' ({}x{} px)",
            name,
            image.width_px,
            image.height_px
        );
        self.images.insert(name.to_string(), image);
        Ok(())
    }

    pub fn image(&self, name: &str) -> Option<&LoadedImage> {
        self.images.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Only explicit path prefixes count, so base64 (which contains `/`) is
/// never mistaken for a path.
fn is_path(src: &str) -> bool {
    src.starts_with('/') || src.starts_with("./") || src.starts_with("../")
}

fn decode_base64_source(src: &str) -> Result<Vec<u8>, String> {
    // Data URI: data:image/png;base64,iVBOR...
    let payload = if src.starts_with("data:image/") {
        let comma_pos = src
            .find(',')
            .ok_or_else(|| "invalid data URI: missing comma".to_string())?;
        &src[comma_pos + 1..]
    } else {
        src
    };

    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("base64 decode error: {}", e))
}

fn decode_image_bytes(data: &[u8]) -> Result<LoadedImage, String> {
    if data.len() < 4 {
        return Err("image data too short".to_string());
    }
    if !is_jpeg(data) && !is_png(data) {
        return Err("unsupported image format (expected JPEG or PNG)".to_string());
    }

    let decoded =
        image::load_from_memory(data).map_err(|e| format!("failed to decode image: {}", e))?;
    Ok(flatten_onto_white(&decoded))
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// Composite against a white background and drop alpha.
fn flatten_onto_white(image: &DynamicImage) -> LoadedImage {
    let rgba = image.to_rgba8();
    let (width_px, height_px) = rgba.dimensions();
    let mut rgb = Vec::with_capacity(width_px as usize * height_px as usize * 3);

    for pixel in rgba.pixels() {
        let Rgba([r, g, b, a]) = *pixel;
        let alpha = a as f32 / 255.0;
        for channel in [r, g, b] {
            rgb.push((channel as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8);
        }
    }

    LoadedImage {
        width_px,
        height_px,
        rgb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use image::{ImageOutputFormat, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn registers_data_uri() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(4, 2, [255, 0, 0, 255]));
        let mut registry = ResourceRegistry::new();
        registry
            .register_source("logo", &format!("data:image/png;base64,{}", b64))
            .unwrap();
        let image = registry.image("logo").unwrap();
        assert_eq!((image.width_px, image.height_px), (4, 2));
        assert_eq!(image.rgb.len(), 4 * 2 * 3);
        assert_eq!(&image.rgb[0..3], &[255, 0, 0]);
        assert_eq!(image.aspect_ratio(), 2.0);
    }

    #[test]
    fn registers_raw_base64() {
        let b64 = base64::engine::general_purpose::STANDARD.encode(png_bytes(1, 1, [0, 0, 255, 255]));
        let mut registry = ResourceRegistry::new();
        registry.register_source("dot", &b64).unwrap();
        assert!(registry.contains("dot"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn transparent_pixels_become_white() {
        let mut registry = ResourceRegistry::new();
        registry
            .register_bytes("clear", &png_bytes(1, 1, [0, 0, 0, 0]))
            .unwrap();
        assert_eq!(registry.image("clear").unwrap().rgb, vec![255, 255, 255]);
    }

    #[test]
    fn missing_file_is_a_resource_error() {
        let mut registry = ResourceRegistry::new();
        let err = registry
            .register_file("logo", Path::new("/definitely/not/here/logo.png"))
            .unwrap_err();
        match err {
            InvoiceError::Resource { name, message } => {
                assert_eq!(name, "logo");
                assert!(message.contains("/definitely/not/here/logo.png"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn rejects_non_image_bytes() {
        let mut registry = ResourceRegistry::new();
        let err = registry.register_bytes("x", b"GIF89a....").unwrap_err();
        assert!(err.to_string().contains("unsupported image format"));
        let err = registry.register_source("y", "data:image/png;base64").unwrap_err();
        assert!(err.to_string().contains("missing comma"));
    }
}
