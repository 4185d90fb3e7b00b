//! Lumen Core - scene graph types for the Lumen ray tracer.
//!
//! This crate provides:
//!
//! - **Scene graph**: an arena of `SceneNode`s (groups, geometry leaves and
//!   CSG boolean combinators) addressed by `NodeId`
//! - **Shading inputs**: `Material`, `Light`, `Texture`
//! - **Geometry**: the `Primitive` variants and the shared triangle `Mesh`
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Material, Primitive, Scene};
//!
//! let mut scene = Scene::new();
//! let red = scene.add_material(Material::new(Vec3::new(0.8, 0.1, 0.1)));
//! let root = scene.add_group("root");
//! let ball = scene.add_geometry("ball", Primitive::Sphere);
//! scene.set_material(ball, red)?;
//! scene.add_child(root, ball)?;
//! scene.set_root(root)?;
//! ```

pub mod error;
pub mod material;
pub mod mesh;
pub mod primitive;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use error::SceneError;
pub use material::{Color, Light, Material};
pub use mesh::{Mesh, MeshCache, MeshError, MeshTriangle};
pub use primitive::{gen_f32, Primitive};
pub use scene::{
    BooleanOp, Emission, GeometryNode, MaterialId, NodeId, NodeKind, Scene, SceneNode,
};
pub use texture::{load_texture, Texture, TextureError};
