//! Dispatch from scene primitives to their intersection routines.

use lumen_core::Primitive;
use lumen_math::{Ray, Vec3};

use crate::cone::intersect_cone;
use crate::cube::intersect_box;
use crate::cylinder::intersect_cylinder;
use crate::sphere::intersect_sphere;
use crate::surface::{Intersect, Intersection};
use crate::triangle::intersect_mesh;

impl Intersect for Primitive {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        match self {
            Primitive::Sphere => intersect_sphere(ray, Vec3::ZERO, 1.0),
            Primitive::Cube => intersect_box(ray, Vec3::ZERO, Vec3::ONE),
            Primitive::Cylinder => intersect_cylinder(ray),
            Primitive::Cone => intersect_cone(ray),
            Primitive::NonhierSphere { center, radius } => intersect_sphere(ray, *center, *radius),
            Primitive::NonhierBox { min, size } => {
                intersect_box(ray, *min, *min + Vec3::splat(*size))
            }
            Primitive::Mesh(mesh) => intersect_mesh(ray, mesh),
        }
    }
}
