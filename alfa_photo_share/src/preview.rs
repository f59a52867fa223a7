//! ALFA Photo Share - Capture Preview
//!
//! Square JPEG preview of a captured photo for the UI surface.

use std::io::Cursor;
use std::path::Path;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::error::{ShareError, ShareResult};

/// Preview generator
#[derive(Debug, Clone, Copy)]
pub struct PreviewEngine {
    /// Edge length (square)
    size: u32,
}

impl PreviewEngine {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    /// Preview of an image file on disk
    pub fn from_file(&self, path: &Path) -> ShareResult<Vec<u8>> {
        let data = std::fs::read(path)?;
        self.generate(&data)
    }

    /// Centre-cropped square preview, JPEG encoded
    pub fn generate(&self, image_data: &[u8]) -> ShareResult<Vec<u8>> {
        let img = image::load_from_memory(image_data)?;
        let preview = self.crop_and_resize(&img);

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(preview.to_rgb8());

        let mut output = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut output), image::ImageFormat::Jpeg)?;
        Ok(output)
    }

    fn crop_and_resize(&self, img: &DynamicImage) -> DynamicImage {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return img.clone();
        }

        let (crop_x, crop_y, crop_size) = if width > height {
            ((width - height) / 2, 0, height)
        } else {
            (0, (height - width) / 2, width)
        };

        img.crop_imm(crop_x, crop_y, crop_size, crop_size)
            .resize_exact(self.size, self.size, FilterType::Lanczos3)
    }
}

impl Default for PreviewEngine {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Map decode failures on non-image payloads to a readable message
pub(crate) fn describe(err: &ShareError) -> String {
    match err {
        ShareError::ImageError(msg) => format!("preview unavailable: {msg}"),
        other => other.to_string(),
    }
}
