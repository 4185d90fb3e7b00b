//! Shadow queries through partially transparent occluders.

use lumen_core::{NodeId, Scene};
use lumen_math::{Ray, Vec3};

use crate::intersector::{intersect_scene, surface_of};

/// Fraction of light reaching the origin of `ray` from `light_position`.
///
/// The ray is marched from occluder to occluder. Opaque geometry blocks
/// the light entirely, transparent geometry scales it by its transparency.
/// Hitting `target` (the emitter being sampled) ends the march unblocked.
pub fn light_visibility(
    scene: &Scene,
    ray: &Ray,
    light_position: Vec3,
    target: Option<NodeId>,
) -> f32 {
    let mut visibility = 1.0;
    let mut current = *ray;

    loop {
        let Some(hit) = intersect_scene(scene, &current) else {
            return visibility;
        };

        if hit.entry_t(&current) > current.t_of(light_position) {
            return visibility;
        }
        if target.is_some() && hit.entry.node == target {
            return visibility;
        }

        let Some((_, material)) = surface_of(scene, &hit.entry) else {
            return 0.0;
        };
        if !material.is_transparent() {
            return 0.0;
        }

        visibility *= material.transparency;
        current = Ray::new(hit.exit.position, current.direction());
    }
}
