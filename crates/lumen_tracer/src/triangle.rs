//! Ray intersection with triangles and triangle meshes.
//!
//! Triangles use the plane equation followed by three edge half-plane
//! tests. A mesh is treated as a single solid: the nearest and farthest
//! triangle crossings become its entry and exit.

use lumen_core::{Mesh, MeshTriangle};
use lumen_math::{Interval, Ray, Vec2, Vec3};

use crate::surface::{Intersection, SurfacePoint};

const PARALLEL_EPSILON: f32 = 1e-9;

/// Intersect a ray with the plane of `tri` and keep the hit if it lies inside.
///
/// Crossings behind the ray origin are returned too; the caller decides
/// which parameters are acceptable.
pub fn intersect_triangle(ray: &Ray, tri: &MeshTriangle) -> Option<SurfacePoint> {
    let [v0, v1, v2] = tri.positions;

    let face_normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
    if face_normal == Vec3::ZERO {
        return None;
    }

    let denominator = face_normal.dot(ray.direction());
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }

    let d = -face_normal.dot(v0);
    let t = -(face_normal.dot(ray.origin()) + d) / denominator;
    let p = ray.at(t);

    // Inside test: p must be on the inner side of every edge
    for (a, b) in [(v0, v1), (v1, v2), (v2, v0)] {
        if face_normal.dot((b - a).cross(p - a)) < 0.0 {
            return None;
        }
    }

    // Barycentric weights from sub-triangle areas
    let area = (v1 - v0).cross(v2 - v0).length();
    let alpha = (v1 - p).cross(v2 - p).length() / area;
    let beta = (v2 - p).cross(v0 - p).length() / area;
    let gamma = 1.0 - alpha - beta;

    let normal = match tri.normals {
        Some([n0, n1, n2]) => {
            let n = (alpha * n0 + beta * n1 + gamma * n2).normalize_or_zero();
            if n == Vec3::ZERO {
                face_normal
            } else {
                n
            }
        }
        None => face_normal,
    };

    let uv = match tri.uvs {
        Some([t0, t1, t2]) => {
            let uv = alpha * t0 + beta * t1 + gamma * t2;
            Vec2::new(uv.x, 1.0 - uv.y)
        }
        None => Vec2::ZERO,
    };

    Some(SurfacePoint::new(p, normal, uv_tangent(tri), uv))
}

/// Tangent aligned with increasing u, falling back to the first edge when
/// the triangle has no usable texture parameterization.
fn uv_tangent(tri: &MeshTriangle) -> Vec3 {
    let [v0, v1, v2] = tri.positions;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    if let Some([t0, t1, t2]) = tri.uvs {
        let duv1 = t1 - t0;
        let duv2 = t2 - t0;
        let det = duv1.x * duv2.y - duv2.x * duv1.y;
        if det.abs() > 1e-12 {
            let tangent = (edge1 * duv2.y - edge2 * duv1.y) / det;
            let tangent = tangent.normalize_or_zero();
            if tangent != Vec3::ZERO {
                return tangent;
            }
        }
    }

    edge1.normalize_or_zero()
}

/// Intersect a ray with a whole mesh.
pub fn intersect_mesh(ray: &Ray, mesh: &Mesh) -> Option<Intersection> {
    mesh.bounds.clip(ray, Interval::UNIVERSE)?;

    let mut nearest: Option<(f32, SurfacePoint)> = None;
    let mut farthest: Option<(f32, SurfacePoint)> = None;

    for tri in mesh.triangles() {
        let Some(hit) = intersect_triangle(ray, &tri) else {
            continue;
        };
        let t = ray.t_of(hit.position);

        if nearest.map_or(true, |(best, _)| t < best) {
            nearest = Some((t, hit));
        }
        if farthest.map_or(true, |(best, _)| t > best) {
            farthest = Some((t, hit));
        }
    }

    match (nearest, farthest) {
        (Some((_, entry)), Some((_, exit))) => Some(Intersection::new(entry, exit)),
        _ => None,
    }
}
