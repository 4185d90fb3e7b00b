use crate::{Mat4, Vec3};

/// A ray in 3D space with an origin and a unit-length direction.
///
/// Because the direction is normalized on construction, the ray parameter of
/// any point can be recovered by projecting it onto the direction (see
/// [`Ray::t_of`]). Intersection code relies on this to compare hits that were
/// produced in different local spaces.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the (unit) direction vector of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray parameter of `point`, i.e. its signed distance along the direction.
    #[inline]
    pub fn t_of(&self, point: Vec3) -> f32 {
        (point - self.origin).dot(self.direction)
    }

    /// Express this ray in the space described by `inverse`.
    ///
    /// Both the origin and the point one unit along the ray are transformed,
    /// then the direction is re-normalized, so `t` values in the local ray
    /// are not the same as in the parent ray.
    pub fn to_local(&self, inverse: &Mat4) -> Ray {
        let start = inverse.transform_point3(self.origin);
        let end = inverse.transform_point3(self.origin + self.direction);
        Ray::new(start, end - start)
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::NEG_Z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(ray.direction, Vec3::Z);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_t_of_recovers_parameter() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 1.0, 0.0));
        for t in [-2.0_f32, 0.0, 0.5, 7.25] {
            assert!((ray.t_of(ray.at(t)) - t).abs() < 1e-4);
        }
    }

    #[test]
    fn test_to_local_translation() {
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 10.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        let local = ray.to_local(&world.inverse());

        assert!((local.origin - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
        assert!((local.direction - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_to_local_scale_keeps_unit_direction() {
        let world = Mat4::from_scale(Vec3::splat(4.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, -8.0), Vec3::Z);
        let local = ray.to_local(&world.inverse());

        assert!((local.origin - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
        assert!((local.direction.length() - 1.0).abs() < 1e-5);
    }
}
