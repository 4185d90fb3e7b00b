//! Hierarchical ray intersection over the scene graph.

use lumen_core::{GeometryNode, Material, NodeId, NodeKind, Scene};
use lumen_math::Ray;

use crate::csg::combine;
use crate::surface::{Intersect, Intersection, SurfacePoint};

/// Geometry hits closer than this (in the node's local ray parameter) are
/// discarded, so rays leaving a surface do not immediately hit it again.
pub const SELF_INTERSECTION_EPSILON: f32 = 0.001;

/// All ray intervals produced by the subtree rooted at `id`.
///
/// `ray` is expressed in the parent's space; the returned intervals are in
/// the parent's space as well.
pub fn traverse(scene: &Scene, id: NodeId, ray: &Ray) -> Vec<Intersection> {
    let node = &scene[id];
    let local_ray = ray.to_local(node.transform.inverse());

    let hits = match &node.kind {
        NodeKind::Boolean(op) => match node.children() {
            [first, second] => combine(
                *op,
                traverse(scene, *first, &local_ray),
                traverse(scene, *second, &local_ray),
                &local_ray,
            ),
            // Rejected by validation before rendering
            _ => Vec::new(),
        },
        NodeKind::Geometry(geometry) => {
            let mut hits: Vec<Intersection> = geometry
                .primitive
                .intersect(&local_ray)
                .filter(|hit| hit.entry_t(&local_ray) > SELF_INTERSECTION_EPSILON)
                .map(|hit| hit.with_node(id))
                .into_iter()
                .collect();
            append_children(scene, node.children(), &local_ray, &mut hits);
            hits
        }
        NodeKind::Group => {
            let mut hits = Vec::new();
            append_children(scene, node.children(), &local_ray, &mut hits);
            hits
        }
    };

    let matrix = node.transform.matrix();
    let normal_matrix = node.transform.normal_matrix();
    hits.into_iter()
        .map(|hit| hit.transformed(matrix, normal_matrix))
        .collect()
}

fn append_children(scene: &Scene, children: &[NodeId], ray: &Ray, hits: &mut Vec<Intersection>) {
    for &child in children {
        hits.extend(traverse(scene, child, ray));
    }
}

/// The interval with the nearest entry in front of the ray origin.
pub fn intersect_scene(scene: &Scene, ray: &Ray) -> Option<Intersection> {
    let root = scene.root()?;

    traverse(scene, root, ray)
        .into_iter()
        .map(|hit| (hit.entry_t(ray), hit))
        .filter(|(t, _)| *t > 0.0)
        .min_by(|(a, _), (b, _)| a.total_cmp(b))
        .map(|(_, hit)| hit)
}

/// Geometry and material behind a surface point.
pub fn surface_of<'a>(
    scene: &'a Scene,
    point: &SurfacePoint,
) -> Option<(&'a GeometryNode, &'a Material)> {
    let geometry = scene[point.node?].geometry()?;
    let material = scene.material(geometry.material?).ok()?;
    Some((geometry, material.as_ref()))
}
