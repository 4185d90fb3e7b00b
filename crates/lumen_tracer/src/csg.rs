//! Constructive solid geometry over ray intervals.
//!
//! Each solid is reduced to the list of stretches a ray spends inside it.
//! Boolean operators combine those lists directly, so no geometry is ever
//! clipped or rebuilt.

use lumen_core::BooleanOp;
use lumen_math::Ray;

use crate::surface::Intersection;

/// Boundaries closer than this along the ray count as shared.
const COINCIDENT: f32 = 1e-4;

/// Combine the intervals of a boolean node's two children.
///
/// All interval parameters are measured along `ray`, which must be the ray
/// both operand lists were produced with.
pub fn combine(
    op: BooleanOp,
    first: Vec<Intersection>,
    second: Vec<Intersection>,
    ray: &Ray,
) -> Vec<Intersection> {
    match op {
        BooleanOp::Intersection => intersection(&first, &second, ray),
        BooleanOp::Union => union(first, second),
        BooleanOp::Difference => difference(first, &second, ray),
    }
}

/// Pairwise overlaps. The later entry and the earlier exit bound each overlap.
fn intersection(first: &[Intersection], second: &[Intersection], ray: &Ray) -> Vec<Intersection> {
    let mut result = Vec::new();

    for a in first {
        let a_span = a.span(ray);
        for b in second {
            let b_span = b.span(ray);

            if a_span.overlaps(&b_span) {
                let entry = if a_span.min > b_span.min { a.entry } else { b.entry };
                let exit = if a_span.max < b_span.max { a.exit } else { b.exit };
                result.push(Intersection::new(entry, exit));
            }
        }
    }

    result
}

/// Overlapping intervals are not merged: the nearest entry is still found
/// by comparing entry parameters.
fn union(mut first: Vec<Intersection>, second: Vec<Intersection>) -> Vec<Intersection> {
    first.extend(second);
    first
}

/// Subtract every interval of `second` from every interval of `first`.
///
/// Wherever a cut exposes the inside of the subtracted solid, the surface
/// point is taken from that solid with its normal reversed.
fn difference(first: Vec<Intersection>, second: &[Intersection], ray: &Ray) -> Vec<Intersection> {
    if second.is_empty() {
        return first;
    }

    let mut result = Vec::new();

    for a in &first {
        let kept = a.span(ray);
        for b in second {
            let cut = b.span(ray);

            if !kept.overlaps(&cut) {
                result.push(*a);
                continue;
            }
            // A cutter flush with either face of `a` clips that side only
            let clips_front = cut.min <= kept.min + COINCIDENT;
            let clips_back = cut.max >= kept.max - COINCIDENT;
            match (clips_front, clips_back) {
                // `b` swallows all of `a`
                (true, true) => {}
                (true, false) => result.push(Intersection::new(b.exit.flipped(), a.exit)),
                (false, true) => result.push(Intersection::new(a.entry, b.entry.flipped())),
                // `b` lies strictly inside `a`
                (false, false) => {
                    result.push(Intersection::new(a.entry, b.entry.flipped()));
                    result.push(Intersection::new(b.exit.flipped(), a.exit));
                }
            }
        }
    }

    result
}
