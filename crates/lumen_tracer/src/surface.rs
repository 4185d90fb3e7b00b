//! Ray-interval records produced by intersection.

use lumen_core::NodeId;
use lumen_math::{Interval, Mat3, Mat4, Ray, Vec2, Vec3};

/// One boundary crossing of a ray through a solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    /// Outward surface normal (unit length)
    pub normal: Vec3,
    pub tangent: Vec3,
    pub uv: Vec2,
    /// Geometry node that produced this point, stamped by the intersector
    pub node: Option<NodeId>,
}

impl SurfacePoint {
    pub fn new(position: Vec3, normal: Vec3, tangent: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            tangent,
            uv,
            node: None,
        }
    }

    /// Same point with the normal reversed.
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }

    /// Map this point into a parent space.
    pub fn transformed(mut self, matrix: &Mat4, normal_matrix: &Mat3) -> Self {
        self.position = matrix.transform_point3(self.position);
        self.normal = (*normal_matrix * self.normal).normalize_or_zero();
        self.tangent = (*normal_matrix * self.tangent).normalize_or_zero();
        self
    }
}

/// The stretch of a ray that lies inside a solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub entry: SurfacePoint,
    pub exit: SurfacePoint,
}

impl Intersection {
    pub fn new(entry: SurfacePoint, exit: SurfacePoint) -> Self {
        Self { entry, exit }
    }

    /// Ray parameter of the entry point.
    #[inline]
    pub fn entry_t(&self, ray: &Ray) -> f32 {
        ray.t_of(self.entry.position)
    }

    /// Ray parameter of the exit point.
    #[inline]
    pub fn exit_t(&self, ray: &Ray) -> f32 {
        ray.t_of(self.exit.position)
    }

    /// Ray parameters spent inside the solid.
    pub fn span(&self, ray: &Ray) -> Interval {
        Interval::new(self.entry_t(ray), self.exit_t(ray))
    }

    /// Tag both surface points with the node they belong to.
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.entry.node = Some(node);
        self.exit.node = Some(node);
        self
    }

    pub fn transformed(self, matrix: &Mat4, normal_matrix: &Mat3) -> Self {
        Self {
            entry: self.entry.transformed(matrix, normal_matrix),
            exit: self.exit.transformed(matrix, normal_matrix),
        }
    }
}

/// Trait for anything a ray can pass through.
pub trait Intersect: Send + Sync {
    /// Intersect a ray given in the object's local space.
    ///
    /// Returns `None` when the ray misses, including every degenerate
    /// configuration (tangent or parallel rays).
    fn intersect(&self, ray: &Ray) -> Option<Intersection>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(z: f32) -> SurfacePoint {
        SurfacePoint::new(Vec3::new(0.0, 0.0, z), Vec3::Z, Vec3::X, Vec2::ZERO)
    }

    #[test]
    fn test_interval_parameters() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let hit = Intersection::new(point(-1.0), point(1.0));
        assert!((hit.entry_t(&ray) - 4.0).abs() < 1e-6);
        assert!((hit.exit_t(&ray) - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_flipped_only_touches_normal() {
        let p = point(2.0);
        let f = p.flipped();
        assert_eq!(f.normal, -Vec3::Z);
        assert_eq!(f.position, p.position);
        assert_eq!(f.tangent, p.tangent);
    }

    #[test]
    fn test_transformed_under_nonuniform_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = Mat3::from_mat4(m).inverse().transpose();
        let p = SurfacePoint::new(
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0).normalize(),
            Vec3::Z,
            Vec2::ZERO,
        )
        .transformed(&m, &n);

        assert_eq!(p.position, Vec3::new(2.0, 1.0, 0.0));
        // Normal of the ellipse x^2/4 + y^2 = 1 at (2, 1) points along (0.5, 1)
        let expected = Vec3::new(0.5, 1.0, 0.0).normalize();
        assert!((p.normal - expected).length() < 1e-5);
        assert!((p.normal.length() - 1.0).abs() < 1e-5);
    }
}
