use crate::{Interval, Ray, Vec3};

/// Flat boxes are thickened to at least this size along every axis.
const MIN_EXTENT: f32 = 1e-4;

/// Axis-aligned bounding box, stored as its two corners.
///
/// Meshes keep one as a cheap reject before testing every triangle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Box spanned by two opposite corners, in any order.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let (min, max) = (a.min(b), a.max(b));
        let pad = (Vec3::splat(MIN_EXTENT) - (max - min)).max(Vec3::ZERO) * 0.5;
        Self {
            min: min - pad,
            max: max + pad,
        }
    }

    /// Smallest box containing every point, or [`Aabb::EMPTY`] for no points.
    pub fn enclosing<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut points = points.into_iter();
        let Some(first) = points.next() else {
            return Aabb::EMPTY;
        };

        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Aabb::from_points(min, max)
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Clip `range` against the box with the slab method.
    ///
    /// Returns the ray parameters spent inside the box, or `None` when the
    /// ray misses it within `range`.
    pub fn clip(&self, ray: &Ray, range: Interval) -> Option<Interval> {
        let inv = ray.direction.recip();
        let near = (self.min - ray.origin) * inv;
        let far = (self.max - ray.origin) * inv;

        // Axes the ray runs parallel to give +/-inf (or NaN when the origin
        // sits on a slab face); f32::max/min drop the NaN
        let mut inside = range;
        for axis in 0..3 {
            let (t0, t1) = if inv[axis] < 0.0 {
                (far[axis], near[axis])
            } else {
                (near[axis], far[axis])
            };
            inside = inside.overlap(&Interval::new(t0, t1));
            if inside.max <= inside.min {
                return None;
            }
        }

        Some(inside)
    }
}
