//! Ray intersection with the capped unit cone.
//!
//! The apex sits at the origin and the cone opens downward along -Y to a
//! unit-radius base cap at y = -1, i.e. the lower nappe of `x² + z² = y²`.

use std::f32::consts::PI;

use lumen_math::{Ray, Vec2, Vec3};

use crate::quadratic::solve_quadratic;
use crate::surface::{Intersection, SurfacePoint};

const TOP: f32 = 0.0;
const BOTTOM: f32 = -1.0;

pub fn intersect_cone(ray: &Ray) -> Option<Intersection> {
    let s = ray.origin().as_dvec3();
    let d = ray.direction().as_dvec3();

    let a = d.x * d.x - d.y * d.y + d.z * d.z;
    let b = 2.0 * (d.x * s.x - d.y * s.y + d.z * s.z);
    let c = s.x * s.x - s.y * s.y + s.z * s.z;

    let (t0, t1) = solve_quadratic(a, b, c)?;

    let entry = ray.at(t0 as f32);
    let exit = ray.at(t1 as f32);

    let above = |p: Vec3| p.y > TOP;
    let below = |p: Vec3| p.y < BOTTOM;

    // Both crossings on the wrong nappe or past the base, or the ray
    // threads the double cone without crossing the finite lower part
    if (above(entry) && above(exit))
        || (below(entry) && below(exit))
        || (above(entry) && below(exit))
        || (below(entry) && above(exit))
    {
        return None;
    }

    let outside = |p: Vec3| above(p) || below(p);
    let (mut first, mut second) = if outside(exit) {
        ((entry, lateral_normal(entry)), (cap_crossing(ray), -Vec3::Y))
    } else if outside(entry) {
        ((exit, lateral_normal(exit)), (cap_crossing(ray), -Vec3::Y))
    } else {
        ((entry, lateral_normal(entry)), (exit, lateral_normal(exit)))
    };

    let origin = ray.origin();
    if origin.distance(first.0) > origin.distance(second.0) {
        std::mem::swap(&mut first, &mut second);
    }

    Some(Intersection::new(
        cone_point(first.0, first.1),
        cone_point(second.0, second.1),
    ))
}

fn lateral_normal(p: Vec3) -> Vec3 {
    Vec3::new(2.0 * p.x, -2.0 * p.y, 2.0 * p.z).normalize_or_zero()
}

fn cap_crossing(ray: &Ray) -> Vec3 {
    let t = (BOTTOM - ray.origin().y) / ray.direction().y;
    ray.at(t)
}

fn cone_point(position: Vec3, normal: Vec3) -> SurfacePoint {
    let angle = position.x.atan2(position.z);
    let tangent = Vec3::new(angle.cos(), 1.0, angle.sin()).normalize();
    let uv = Vec2::new(
        angle / (2.0 * PI) + 0.5,
        1.0 - position.y.rem_euclid(1.0),
    );
    SurfacePoint::new(position, normal, tangent, uv)
}
