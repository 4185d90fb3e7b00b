//! Geometric primitives carried by geometry nodes.
//!
//! Each variant lives in its own canonical local space:
//!
//! - `Sphere`: radius 1 at the origin
//! - `Cube`: the box from (0,0,0) to (1,1,1)
//! - `Cylinder`: radius 1 around +Y, from y = 0 to y = 1
//! - `Cone`: apex at the origin opening downward to a unit-radius base at y = -1
//! - `NonhierSphere` / `NonhierBox`: explicitly positioned and sized
//! - `Mesh`: a shared triangle soup
//!
//! Intersection lives in the tracer; this module only knows how to pick
//! points on the surface for area-light sampling.

use std::f32::consts::PI;
use std::sync::Arc;

use lumen_math::Vec3;
use rand::{Rng, RngCore};

use crate::{Mesh, SceneError};

/// Uniform float in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

#[derive(Clone, Debug)]
pub enum Primitive {
    Sphere,
    Cube,
    Cylinder,
    Cone,
    NonhierSphere { center: Vec3, radius: f32 },
    NonhierBox { min: Vec3, size: f32 },
    Mesh(Arc<Mesh>),
}

impl Primitive {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Primitive::Sphere => "sphere",
            Primitive::Cube => "cube",
            Primitive::Cylinder => "cylinder",
            Primitive::Cone => "cone",
            Primitive::NonhierSphere { .. } => "nh_sphere",
            Primitive::NonhierBox { .. } => "nh_box",
            Primitive::Mesh(_) => "mesh",
        }
    }

    /// Whether this primitive can act as an emissive area light.
    pub fn supports_sampling(&self) -> bool {
        matches!(
            self,
            Primitive::Sphere | Primitive::Cube | Primitive::Cylinder | Primitive::Mesh(_)
        )
    }

    /// Representative point in local space, used to place emitted light.
    pub fn center(&self) -> Result<Vec3, SceneError> {
        match self {
            Primitive::Sphere => Ok(Vec3::ZERO),
            Primitive::Cube => Ok(Vec3::splat(0.5)),
            Primitive::Cylinder => Ok(Vec3::new(0.0, 0.5, 0.0)),
            Primitive::Mesh(mesh) => Ok(mesh.center()),
            other => Err(SceneError::SamplingUnsupported(other.kind_name())),
        }
    }

    /// Random point on the surface in local space.
    ///
    /// Meshes are not sampled per-triangle; they always return their center.
    pub fn sample_point(&self, rng: &mut dyn RngCore) -> Result<Vec3, SceneError> {
        match self {
            Primitive::Sphere => Ok(sample_sphere(rng)),
            Primitive::Cube => Ok(sample_cube(rng)),
            Primitive::Cylinder => Ok(sample_cylinder(rng)),
            Primitive::Mesh(mesh) => Ok(mesh.center()),
            other => Err(SceneError::SamplingUnsupported(other.kind_name())),
        }
    }
}

fn sample_sphere(rng: &mut dyn RngCore) -> Vec3 {
    let theta = 2.0 * PI * gen_f32(rng);
    let phi = (2.0 * gen_f32(rng) - 1.0).acos();
    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
}

fn sample_cube(rng: &mut dyn RngCore) -> Vec3 {
    let face = (gen_f32(rng) * 6.0) as u32;
    let u = gen_f32(rng);
    let v = gen_f32(rng);

    match face {
        0 => Vec3::new(0.0, u, v),
        1 => Vec3::new(1.0, u, v),
        2 => Vec3::new(u, 0.0, v),
        3 => Vec3::new(u, 1.0, v),
        4 => Vec3::new(u, v, 0.0),
        _ => Vec3::new(u, v, 1.0),
    }
}

fn sample_cylinder(rng: &mut dyn RngCore) -> Vec3 {
    // Pick side or cap proportionally to area (r = 1, h = 1).
    let side_area = 2.0 * PI;
    let cap_area = PI;
    let total = side_area + 2.0 * cap_area;

    let pick = gen_f32(rng);
    let theta = gen_f32(rng) * 2.0 * PI;
    if pick < side_area / total {
        let height = gen_f32(rng);
        Vec3::new(theta.cos(), height, theta.sin())
    } else {
        // sqrt keeps the distribution uniform over the disk
        let radius = gen_f32(rng).sqrt();
        let y = if pick < (side_area + cap_area) / total {
            0.0
        } else {
            1.0
        };
        Vec3::new(radius * theta.cos(), y, radius * theta.sin())
    }
}
