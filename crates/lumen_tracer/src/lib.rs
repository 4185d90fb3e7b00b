//! Lumen Tracer - recursive CSG ray tracing.
//!
//! Renders a [`lumen_core::Scene`] with:
//! - Closed-form intersection for spheres, boxes, cylinders, cones and meshes
//! - Hierarchical traversal with per-node transforms
//! - Boolean solids built from ray intervals (intersection, union, difference)
//! - Phong shading with point lights, sampled area lights, reflection and
//!   transparency
//! - Rows distributed over a worker pool through an atomic row counter

mod background;
mod cone;
mod csg;
mod cube;
mod cylinder;
mod error;
mod intersector;
mod occlusion;
mod primitive;
mod quadratic;
mod renderer;
mod scheduler;
mod settings;
mod shading;
mod sphere;
mod surface;
mod triangle;

pub use background::{image_backdrop, procedural_sky, Background};
pub use cone::intersect_cone;
pub use csg::combine;
pub use cube::intersect_box;
pub use cylinder::intersect_cylinder;
pub use error::RenderError;
pub use intersector::{intersect_scene, surface_of, traverse, SELF_INTERSECTION_EPSILON};
pub use occlusion::light_visibility;
pub use quadratic::solve_quadratic;
pub use renderer::{render, ImageBuffer, RenderStats};
pub use scheduler::{RowClaims, RowScheduler};
pub use settings::RenderSettings;
pub use shading::{collect_area_lights, AreaLight, Tracer, MIN_REFLECTION_WEIGHT};
pub use sphere::intersect_sphere;
pub use surface::{Intersect, Intersection, SurfacePoint};
pub use triangle::{intersect_mesh, intersect_triangle};
