//! Phong materials and light sources.

use glam::Vec3;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// A Phong surface description.
///
/// Materials are created once while the scene is built and shared between
/// geometry nodes through the scene's material arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Diffuse coefficient (also the ambient response)
    pub diffuse: Color,

    /// Specular coefficient
    pub specular: Color,

    /// Phong exponent
    pub shininess: f32,

    /// Mirror reflection weight in [0, 1]
    pub reflectivity: f32,

    /// Transmission weight in [0, 1]
    pub transparency: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Color::new(0.5, 0.5, 0.5), // Grey default
            specular: Color::ZERO,
            shininess: 1.0,
            reflectivity: 0.0,
            transparency: 0.0,
        }
    }
}

impl Material {
    /// Create a matte material with just a diffuse color.
    pub fn new(diffuse: Color) -> Self {
        Self {
            diffuse,
            ..Default::default()
        }
    }

    /// Full Phong material; reflectivity and transparency are clamped to [0, 1].
    pub fn phong(
        diffuse: Color,
        specular: Color,
        shininess: f32,
        reflectivity: f32,
        transparency: f32,
    ) -> Self {
        Self {
            diffuse,
            specular,
            shininess,
            reflectivity: reflectivity.clamp(0.0, 1.0),
            transparency: transparency.clamp(0.0, 1.0),
        }
    }

    /// Check if light passes through this material at all.
    pub fn is_transparent(&self) -> bool {
        self.transparency > 0.0
    }
}

/// A point light with quadratic falloff.
#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Color,

    /// Constant, linear and quadratic attenuation coefficients
    pub falloff: [f32; 3],
}

impl Light {
    pub fn new(position: Vec3, color: Color, falloff: [f32; 3]) -> Self {
        Self {
            position,
            color,
            falloff,
        }
    }

    /// Attenuation denominator at `distance`: c0 + c1 d + c2 d^2.
    pub fn attenuation(&self, distance: f32) -> f32 {
        self.falloff[0] + self.falloff[1] * distance + self.falloff[2] * distance * distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phong_clamps_weights() {
        let m = Material::phong(Color::ONE, Color::ZERO, 10.0, 1.5, -0.5);
        assert_eq!(m.reflectivity, 1.0);
        assert_eq!(m.transparency, 0.0);
        assert!(!m.is_transparent());
    }

    #[test]
    fn test_light_attenuation() {
        let light = Light::new(Vec3::ZERO, Color::ONE, [1.0, 0.5, 0.25]);
        assert_eq!(light.attenuation(0.0), 1.0);
        assert_eq!(light.attenuation(2.0), 1.0 + 1.0 + 1.0);
    }
}
