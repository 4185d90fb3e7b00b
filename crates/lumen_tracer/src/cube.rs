//! Ray-box intersection using the slab method.

use lumen_math::{Ray, Vec2, Vec3};

use crate::surface::{Intersection, SurfacePoint};

/// Intersect a ray with the axis-aligned box spanning `min`..`max`.
pub fn intersect_box(ray: &Ray, min: Vec3, max: Vec3) -> Option<Intersection> {
    let origin = ray.origin();
    let dir = ray.direction();

    let mut t_entry = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut entry_axis = 0;
    let mut exit_axis = 0;

    for axis in 0..3 {
        if dir[axis] == 0.0 {
            // Parallel to this slab: inside it everywhere or nowhere
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }

        let inv_d = 1.0 / dir[axis];
        let t0 = (min[axis] - origin[axis]) * inv_d;
        let t1 = (max[axis] - origin[axis]) * inv_d;
        let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };

        if near > t_entry {
            t_entry = near;
            entry_axis = axis;
        }
        if far < t_exit {
            t_exit = far;
            exit_axis = axis;
        }
    }

    if t_entry > t_exit || !t_entry.is_finite() || !t_exit.is_finite() {
        return None;
    }

    let entry_position = ray.at(t_entry);
    let exit_position = ray.at(t_exit);

    // Entry faces point back along the ray, exit faces along it
    let entry_normal = axis_unit(entry_axis) * -dir[entry_axis].signum();
    let exit_normal = axis_unit(exit_axis) * dir[exit_axis].signum();

    Some(Intersection::new(
        SurfacePoint::new(
            entry_position,
            entry_normal,
            face_tangent(entry_axis),
            face_uv(entry_axis, entry_position, min, max),
        ),
        SurfacePoint::new(
            exit_position,
            exit_normal,
            face_tangent(exit_axis),
            face_uv(exit_axis, exit_position, min, max),
        ),
    ))
}

fn axis_unit(axis: usize) -> Vec3 {
    match axis {
        0 => Vec3::X,
        1 => Vec3::Y,
        _ => Vec3::Z,
    }
}

fn face_tangent(axis: usize) -> Vec3 {
    match axis {
        0 => Vec3::Z,
        1 => Vec3::X,
        _ => Vec3::Y,
    }
}

/// Planar texture coordinates on the face perpendicular to `axis`.
fn face_uv(axis: usize, p: Vec3, min: Vec3, max: Vec3) -> Vec2 {
    let rel = (p - min) / (max - min);
    match axis {
        0 => Vec2::new(rel.z, 1.0 - rel.y),
        1 => Vec2::new(1.0 - rel.x, 1.0 - rel.z),
        _ => Vec2::new(1.0 - rel.x, 1.0 - rel.y),
    }
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
    fn test_unit_box_along_z() {
        let ray = Ray::new(Vec3::new(0.5, 0.5, -5.0), Vec3::Z);
        let hit = intersect_box(&ray, Vec3::ZERO, Vec3::ONE).unwrap();

        assert!((hit.entry.position - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-6);
        assert!((hit.exit.position - Vec3::new(0.5, 0.5, 1.0)).length() < 1e-6);
        assert_eq!(hit.entry.normal, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(hit.exit.normal, Vec3::new(0.0, 0.0, 1.0));
        assert!((hit.entry.uv - Vec2::new(0.5, 0.5)).length() < 1e-6);
    }

    #[test]
    fn test_diagonal_hit_picks_faces() {
        let ray = Ray::new(Vec3::new(-1.0, 0.25, 0.5), Vec3::new(1.0, 0.1, 0.0));
        let hit = intersect_box(&ray, Vec3::ZERO, Vec3::ONE).unwrap();

        assert_eq!(hit.entry.normal, -Vec3::X);
        assert_eq!(hit.exit.normal, Vec3::X);
        assert_eq!(hit.entry.tangent, Vec3::Z);
        assert!(hit.entry_t(&ray) <= hit.exit_t(&ray));
        for p in [hit.entry.position, hit.exit.position] {
            assert!(p.x.abs() < 1e-5 || (p.x - 1.0).abs() < 1e-5);
            assert!((0.0..=1.0).contains(&p.y));
        }
    }

    #[test]
    fn test_parallel_ray_outside_misses() {
        let ray = Ray::new(Vec3::new(2.0, 0.5, -5.0), Vec3::Z);
        assert!(intersect_box(&ray, Vec3::ZERO, Vec3::ONE).is_none());

        let past = Ray::new(Vec3::new(-1.0, 2.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        assert!(intersect_box(&past, Vec3::ZERO, Vec3::ONE).is_none());
    }

    #[test]
    fn test_offset_box() {
        let min = Vec3::new(-2.0, -2.0, -2.0);
        let ray = Ray::new(Vec3::new(-1.0, 5.0, -1.0), -Vec3::Y);
        let hit = intersect_box(&ray, min, min + Vec3::splat(4.0)).unwrap();

        assert!((hit.entry.position.y - 2.0).abs() < 1e-5);
        assert!((hit.exit.position.y + 2.0).abs() < 1e-5);
        assert_eq!(hit.entry.normal, Vec3::Y);
    }

    #[test]
    fn test_random_hits_lie_on_surface() {
        let on_box = |p: Vec3| {
            let inside =
                p.cmpge(Vec3::splat(-1e-4)).all() && p.cmple(Vec3::splat(1.0 + 1e-4)).all();
            let to_face = p.min(Vec3::ONE - p).abs().min_element();
            inside && to_face < 1e-4
        };

        let mut rng = StdRng::seed_from_u64(12);
        let mut hits = 0;
        for _ in 0..2000 {
            let ray = aimed_ray(&mut rng, Vec3::splat(0.5));
            let Some(hit) = intersect_box(&ray, Vec3::ZERO, Vec3::ONE) else {
                continue;
            };
            hits += 1;
            assert!(hit.entry_t(&ray) <= hit.exit_t(&ray) + 1e-4);
            for p in [hit.entry.position, hit.exit.position] {
                assert!(on_box(p), "{p:?} off the box");
            }
        }
        assert!(hits > 100);
    }
}
