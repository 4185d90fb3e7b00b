//! Ray intersection with the capped unit cylinder.
//!
//! The cylinder has radius 1 around the +Y axis and spans y = 0 to y = 1.

use std::f32::consts::PI;

use glam::DVec2;
use lumen_math::{Ray, Vec2, Vec3};

use crate::quadratic::solve_quadratic;
use crate::surface::{Intersection, SurfacePoint};

const BOTTOM: f32 = 0.0;
const TOP: f32 = 1.0;
const RADIUS: f64 = 1.0;

pub fn intersect_cylinder(ray: &Ray) -> Option<Intersection> {
    let origin = ray.origin();
    let dir = ray.direction();

    // Lateral surface: a circle in the XZ projection
    let s = DVec2::new(origin.x as f64, origin.z as f64);
    let d = DVec2::new(dir.x as f64, dir.z as f64);

    let a = d.dot(d);
    let b = 2.0 * d.dot(s);
    let c = s.dot(s) - RADIUS * RADIUS;

    let (mut entry, mut exit) = match solve_quadratic(a, b, c) {
        Some((t0, t1)) => (lateral(ray.at(t0 as f32)), lateral(ray.at(t1 as f32))),
        // Parallel to the axis: only the caps can be hit
        None if a < 1e-12 && c < 0.0 => return axial(ray),
        None => return None,
    };

    let entry_y = entry.0.y;
    let exit_y = exit.0.y;
    if (entry_y < BOTTOM && exit_y < BOTTOM) || (entry_y > TOP && exit_y > TOP) {
        return None;
    }

    // Clamp lateral hits that fall outside the height range onto the caps
    if entry_y < BOTTOM {
        entry = (cap_crossing(ray, BOTTOM), -Vec3::Y);
    } else if entry_y > TOP {
        entry = (cap_crossing(ray, TOP), Vec3::Y);
    }
    if exit_y < BOTTOM {
        exit = (cap_crossing(ray, BOTTOM), -Vec3::Y);
    } else if exit_y > TOP {
        exit = (cap_crossing(ray, TOP), Vec3::Y);
    }

    Some(Intersection::new(
        cylinder_point(entry.0, entry.1),
        cylinder_point(exit.0, exit.1),
    ))
}

/// A ray running along the axis inside the radius crosses both caps.
fn axial(ray: &Ray) -> Option<Intersection> {
    let dir_y = ray.direction().y;
    if dir_y == 0.0 {
        return None;
    }

    let (near_y, near_normal, far_y, far_normal) = if dir_y > 0.0 {
        (BOTTOM, -Vec3::Y, TOP, Vec3::Y)
    } else {
        (TOP, Vec3::Y, BOTTOM, -Vec3::Y)
    };

    Some(Intersection::new(
        cylinder_point(cap_crossing(ray, near_y), near_normal),
        cylinder_point(cap_crossing(ray, far_y), far_normal),
    ))
}

fn lateral(position: Vec3) -> (Vec3, Vec3) {
    let normal = Vec3::new(position.x, 0.0, position.z).normalize_or_zero();
    (position, normal)
}

fn cap_crossing(ray: &Ray, y: f32) -> Vec3 {
    let t = (y - ray.origin().y) / ray.direction().y;
    ray.at(t)
}

fn cylinder_point(position: Vec3, normal: Vec3) -> SurfacePoint {
    let tangent = if normal.x == 0.0 && normal.z == 0.0 {
        Vec3::X
    } else {
        Vec3::Y
    };
    let uv = Vec2::new(
        position.x.atan2(position.z) / (2.0 * PI) + 0.5,
        1.0 - position.y.rem_euclid(1.0),
    );
    SurfacePoint::new(position, normal, tangent, uv)
}
