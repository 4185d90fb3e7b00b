//! Ray-sphere intersection.

use std::f32::consts::PI;

use lumen_math::{Ray, Vec2, Vec3};

use crate::quadratic::solve_quadratic;
use crate::surface::{Intersection, SurfacePoint};

/// Intersect a ray with the sphere of `radius` around `center`.
pub fn intersect_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<Intersection> {
    let oc = (ray.origin() - center).as_dvec3();
    let d = ray.direction().as_dvec3();
    let r = radius as f64;

    let a = d.dot(d);
    let b = 2.0 * d.dot(oc);
    let c = oc.dot(oc) - r * r;

    let (t_entry, t_exit) = solve_quadratic(a, b, c)?;

    Some(Intersection::new(
        sphere_point(ray.at(t_entry as f32), center),
        sphere_point(ray.at(t_exit as f32), center),
    ))
}

fn sphere_point(position: Vec3, center: Vec3) -> SurfacePoint {
    let offset = position - center;
    let normal = offset.normalize_or_zero();

    // Longitude around +Y, latitude from the normal's height
    let u = 1.0 - ((normal.x.atan2(normal.z) / (2.0 * PI)) + 0.5);
    let v = normal.y * 0.5 + 0.5;

    let tangent = Vec3::Y.cross(offset).normalize_or_zero();

    SurfacePoint::new(position, normal, tangent, Vec2::new(u, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Ray from 5 units away toward a random point near `center`.
    fn aimed_ray(rng: &mut StdRng, center: Vec3) -> Ray {
        let mut unit = || rng.gen_range(-1.0f32..1.0);
        let toward = Vec3::new(unit(), unit(), unit()).try_normalize().unwrap_or(Vec3::Z);
        let target = center + Vec3::new(unit(), unit(), unit()) * 1.5;
        let origin = center + toward * 5.0;
        Ray::new(origin, target - origin)
    }

    #[test]
    fn test_unit_sphere_along_z() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let hit = intersect_sphere(&ray, Vec3::ZERO, 1.0).unwrap();

        assert!((hit.entry.position - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!((hit.exit.position - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        assert!((hit.entry.normal - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
        assert!(hit.entry_t(&ray) <= hit.exit_t(&ray));
    }

    #[test]
    fn test_points_lie_on_surface() {
        let center = Vec3::new(1.0, -2.0, 0.5);
        let ray = Ray::new(Vec3::new(-3.0, 0.0, 4.0), Vec3::new(1.0, -0.5, -1.0));
        let hit = intersect_sphere(&ray, center, 2.0).unwrap();

        for p in [hit.entry.position, hit.exit.position] {
            assert!(((p - center).length() - 2.0).abs() < 1e-4);
        }
        assert!(hit.entry_t(&ray) <= hit.exit_t(&ray));
    }

    #[test]
    fn test_miss_and_graze() {
        let miss = Ray::new(Vec3::new(0.0, 3.0, -5.0), Vec3::Z);
        assert!(intersect_sphere(&miss, Vec3::ZERO, 1.0).is_none());

        let graze = Ray::new(Vec3::new(0.0, 1.0, -5.0), Vec3::Z);
        assert!(intersect_sphere(&graze, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn test_front_uv() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let hit = intersect_sphere(&ray, Vec3::ZERO, 1.0).unwrap();
        // Facing +Z: atan2(0, 1) = 0, so u = 0.5 and the equator gives v = 0.5
        assert!((hit.entry.uv - Vec2::new(0.5, 0.5)).length() < 1e-5);
        assert!((hit.entry.tangent - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_random_hits_lie_on_surface() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut hits = 0;
        for _ in 0..2000 {
            let ray = aimed_ray(&mut rng, Vec3::ZERO);
            let Some(hit) = intersect_sphere(&ray, Vec3::ZERO, 1.0) else {
                continue;
            };
            hits += 1;
            assert!(hit.entry_t(&ray) <= hit.exit_t(&ray) + 1e-4);
            for p in [hit.entry.position, hit.exit.position] {
                assert!((p.length() - 1.0).abs() < 1e-4, "{p:?} off the sphere");
            }
        }
        assert!(hits > 100);
    }
}
