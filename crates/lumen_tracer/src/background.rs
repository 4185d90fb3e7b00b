//! What rays that escape the scene see.

use lumen_core::{Color, Texture};
use lumen_math::Vec2;

/// Background strategy for a traced ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Background image or procedural sky, looked up through the camera
    Scene,
    /// The ambient colour, used for reflected rays
    FlatAmbient,
}

const SKY_BOTTOM: Color = Color::new(0.17, 0.33, 0.56);
const SKY_TOP: Color = Color::new(0.0, 0.1, 0.3);

/// One pixel in this many becomes a star.
const STAR_DENSITY: i32 = 500;

/// Vertical gradient sky with sparse white stars.
///
/// `pixel` is in image coordinates of an image `height` pixels tall.
pub fn procedural_sky(pixel: Vec2, height: u32) -> Color {
    let x = pixel.x as i32;
    let y = pixel.y as i32;
    let hash = (x.wrapping_mul(293_847) ^ y.wrapping_mul(9_248_132)).wrapping_add(1_234_567);
    if hash % STAR_DENSITY == 0 {
        return Color::ONE;
    }

    let t = (pixel.y / height as f32).clamp(0.0, 1.0);
    SKY_BOTTOM.lerp(SKY_TOP, 1.0 - t)
}

/// Look up a background image, stretched over a `width` x `height` frame.
///
/// Pixels outside the image fall back to `ambient`.
pub fn image_backdrop(
    texture: &Texture,
    pixel: Vec2,
    width: u32,
    height: u32,
    ambient: Color,
) -> Color {
    let scaled = Vec2::new(
        pixel.x * texture.width as f32 / width as f32,
        pixel.y * texture.height as f32 / height as f32,
    );

    let inside = scaled.x >= 0.0
        && scaled.y >= 0.0
        && scaled.x < texture.width as f32
        && scaled.y < texture.height as f32;

    if inside {
        texture.lookup(scaled.x, scaled.y)
    } else {
        ambient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sky_gradient_ends() {
        // (1, 0) is not a star: 293847 + 1234567 is not a multiple of 500
        let top = procedural_sky(Vec2::new(1.0, 0.0), 100);
        assert!((top - SKY_TOP).length() < 1e-6);

        let bottom = procedural_sky(Vec2::new(1.0, 100.0), 100);
        let hash = (1i32 * 293_847 ^ 100 * 9_248_132) + 1_234_567;
        assert_ne!(hash % STAR_DENSITY, 0);
        assert!((bottom - SKY_BOTTOM).length() < 1e-6);
    }

    #[test]
    fn test_stars_are_white() {
        let star = (0..200)
            .flat_map(|y| (0..200).map(move |x| Vec2::new(x as f32, y as f32)))
            .find(|p| {
                let x = (p.x as i32).wrapping_mul(293_847);
                let y = (p.y as i32).wrapping_mul(9_248_132);
                let hash = (x ^ y).wrapping_add(1_234_567);
                hash % STAR_DENSITY == 0
            });

        if let Some(pixel) = star {
            assert_eq!(procedural_sky(pixel, 200), Color::ONE);
        }
    }

    #[test]
    fn test_image_backdrop_scales_and_falls_back() {
        #[rustfmt::skip]
        let data = vec![
            1.0, 0.0, 0.0,  0.0, 1.0, 0.0,
            0.0, 0.0, 1.0,  1.0, 1.0, 1.0,
        ];
        let texture = Texture::new(2, 2, data).unwrap();
        let ambient = Color::splat(0.2);

        // A 100x100 frame maps onto the 2x2 image in 50 pixel blocks
        let red = image_backdrop(&texture, Vec2::new(10.0, 10.0), 100, 100, ambient);
        let white = image_backdrop(&texture, Vec2::new(75.0, 60.0), 100, 100, ambient);
        assert_eq!(red, Color::new(1.0, 0.0, 0.0));
        assert_eq!(white, Color::ONE);

        let outside = image_backdrop(&texture, Vec2::new(-3.0, 10.0), 100, 100, ambient);
        assert_eq!(outside, ambient);
    }
}
