//! Texture buffers for colour maps, normal maps and background images.
//!
//! The renderer only ever sees a dense width x height x 3 float buffer;
//! decoding from disk is done up front by [`load_texture`].

use std::path::Path;

use lumen_math::Vec3;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture data has {actual} values, expected {expected} for {width}x{height} RGB")]
    SizeMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Texture must be at least 1x1, got {0}x{1}")]
    Empty(u32, u32),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// An RGB float image, row-major, values normally in [0, 1].
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Three channels per pixel, row-major
    data: Vec<f32>,
}

impl Texture {
    /// Create a texture from interleaved RGB data.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> TextureResult<Self> {
        if width == 0 || height == 0 {
            return Err(TextureError::Empty(width, height));
        }

        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            data: color.to_array().to_vec(),
        }
    }

    /// Colour at integer pixel coordinates, clamped to the image.
    pub fn pixel(&self, x: u32, y: u32) -> Vec3 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let idx = (y * self.width as usize + x) * 3;
        Vec3::new(self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Nearest-pixel lookup at fractional pixel coordinates.
    ///
    /// Coordinates are truncated; negative values clamp to the first row or
    /// column.
    pub fn lookup(&self, x: f32, y: f32) -> Vec3 {
        self.pixel(x.max(0.0) as u32, y.max(0.0) as u32)
    }

    /// Sample a colour map at UV coordinates (nearest pixel).
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        let x = (u * self.width as f32).min(self.width as f32 - 1.0);
        let y = (v * self.height as f32).min(self.height as f32 - 1.0);
        self.lookup(x, y)
    }

    /// Sample a tangent-space normal map at UV coordinates.
    ///
    /// Channels are remapped from [0, 1] to [-1, 1] and normalized.
    pub fn sample_normal(&self, u: f32, v: f32) -> Vec3 {
        let x = u * (self.width as f32 - 1.0);
        let y = v * (self.height as f32 - 1.0);
        (self.lookup(x, y) * 2.0 - Vec3::ONE).normalize_or_zero()
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

/// Load a texture from a file path.
///
/// 8-bit channels are mapped to [0, 1] without any colour-space conversion.
pub fn load_texture(path: &Path) -> TextureResult<Texture> {
    let img = image::open(path).map_err(|source| TextureError::Load {
        path: path.display().to_string(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let data: Vec<f32> = rgb.as_raw().iter().map(|&c| c as f32 / 255.0).collect();

    let texture = Texture::new(width, height, data)?;

    log::debug!(
        "Loaded texture: {} ({}x{}, {:.1} KB)",
        path.display(),
        texture.width,
        texture.height,
        texture.size_bytes() as f32 / 1024.0
    );

    Ok(texture)
}
