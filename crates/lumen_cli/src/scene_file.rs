//! JSON scene descriptions.
//!
//! A scene file holds render settings, named materials, point lights and a
//! single node tree:
//!
//! ```json
//! {
//!   "render": { "width": 256, "height": 256, "eye": [0, 0, 8] },
//!   "materials": { "red": { "diffuse": [0.8, 0.1, 0.1] } },
//!   "lights": [{ "position": [5, 5, 5], "color": [0.9, 0.9, 0.9] }],
//!   "root": {
//!     "name": "root", "type": "group",
//!     "children": [
//!       { "name": "ball", "type": "sphere", "material": "red",
//!         "transform": [{ "scale": [2, 2, 2] }, { "translate": [0, 1, 0] }] }
//!     ]
//!   }
//! }
//! ```
//!
//! Transform operations apply in list order, each one outermost.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use lumen_core::{
    load_texture, BooleanOp, GeometryNode, Light, Material, MaterialId, MeshCache, NodeId,
    NodeKind, Primitive, Scene, Texture,
};
use lumen_math::{Axis, Vec3};
use lumen_tracer::RenderSettings;
use serde::Deserialize;

/// Top level of a scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneFile {
    #[serde(default)]
    pub render: RenderSection,
    #[serde(default)]
    pub materials: HashMap<String, MaterialDef>,
    #[serde(default)]
    pub lights: Vec<LightDef>,
    pub root: NodeDef,
}

/// Camera, image and renderer options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub name: String,
    /// Output file, relative to the working directory
    pub output: String,
    pub width: u32,
    pub height: u32,
    pub eye: [f32; 3],
    pub view: [f32; 3],
    pub up: [f32; 3],
    pub fov: f32,
    pub ambient: [f32; 3],
    pub supersample: bool,
    pub threads: usize,
    /// Backdrop image, relative to the scene file
    pub background: Option<String>,
    pub seed: u64,
}

impl Default for RenderSection {
    fn default() -> Self {
        let settings = RenderSettings::default();
        Self {
            name: settings.name,
            output: "render.png".to_string(),
            width: 256,
            height: 256,
            eye: settings.eye.to_array(),
            view: settings.view.to_array(),
            up: settings.up.to_array(),
            fov: settings.fov_y,
            ambient: settings.ambient.to_array(),
            supersample: settings.supersample,
            threads: settings.threads,
            background: None,
            seed: settings.seed,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MaterialDef {
    pub diffuse: [f32; 3],
    #[serde(default)]
    pub specular: [f32; 3],
    #[serde(default = "default_shininess")]
    pub shininess: f32,
    #[serde(default)]
    pub reflectivity: f32,
    #[serde(default)]
    pub transparency: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LightDef {
    pub position: [f32; 3],
    pub color: [f32; 3],
    #[serde(default = "default_falloff")]
    pub falloff: [f32; 3],
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmissionDef {
    pub color: [f32; 3],
    #[serde(default = "default_falloff")]
    pub falloff: [f32; 3],
    #[serde(default = "default_samples")]
    pub samples: u32,
}

/// One local transform edit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOp {
    Scale([f32; 3]),
    Translate([f32; 3]),
    Rotate { axis: String, degrees: f32 },
}

/// What a node is. Tagged by the `type` field of the node object.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDef {
    Group,
    Sphere,
    Cube,
    Cylinder,
    Cone,
    NhSphere { center: [f32; 3], radius: f32 },
    NhBox { min: [f32; 3], size: f32 },
    Mesh { path: String },
    Union,
    Intersection,
    Difference,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDef {
    pub name: String,
    #[serde(flatten)]
    pub shape: ShapeDef,
    #[serde(default)]
    pub transform: Vec<TransformOp>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub normal_map: Option<String>,
    #[serde(default)]
    pub emission: Option<EmissionDef>,
    #[serde(default)]
    pub children: Vec<NodeDef>,
}

fn default_shininess() -> f32 {
    1.0
}

fn default_falloff() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

fn default_samples() -> u32 {
    16
}

/// A scene ready to hand to the renderer.
pub struct LoadedScene {
    pub scene: Scene,
    pub settings: RenderSettings,
    pub width: u32,
    pub height: u32,
    pub output: PathBuf,
}

impl SceneFile {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse scene description")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("In scene file {}", path.display()))
    }

    /// Build the scene graph and render settings.
    ///
    /// Relative mesh and texture paths resolve against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<LoadedScene> {
        let mut builder = SceneBuilder::new(base_dir);

        for (name, def) in &self.materials {
            let material = Material::phong(
                Vec3::from(def.diffuse),
                Vec3::from(def.specular),
                def.shininess,
                def.reflectivity,
                def.transparency,
            );
            let id = builder.scene.add_material(material);
            builder.materials.insert(name.clone(), id);
        }

        let root = builder.add_node(&self.root)?;
        builder.scene.set_root(root)?;

        log::info!(
            "Built scene '{}': {} nodes, {} materials, {} meshes",
            self.render.name,
            builder.scene.len(),
            builder.scene.material_count(),
            builder.meshes.len()
        );

        let settings = self.settings(&builder)?;
        Ok(LoadedScene {
            scene: builder.scene,
            settings,
            width: self.render.width,
            height: self.render.height,
            output: PathBuf::from(&self.render.output),
        })
    }

    fn settings(&self, builder: &SceneBuilder) -> Result<RenderSettings> {
        let render = &self.render;
        let mut settings = RenderSettings::new()
            .with_name(render.name.clone())
            .with_camera(
                Vec3::from(render.eye),
                Vec3::from(render.view),
                Vec3::from(render.up),
                render.fov,
            )
            .with_ambient(Vec3::from(render.ambient))
            .with_supersampling(render.supersample)
            .with_threads(render.threads)
            .with_seed(render.seed);

        for light in &self.lights {
            settings = settings.with_light(Light::new(
                Vec3::from(light.position),
                Vec3::from(light.color),
                light.falloff,
            ));
        }

        if let Some(path) = &render.background {
            settings = settings.with_background(builder.texture(path)?);
        }

        Ok(settings)
    }
}

/// Accumulates a scene while walking the node tree.
struct SceneBuilder {
    scene: Scene,
    meshes: MeshCache,
    materials: HashMap<String, MaterialId>,
    base_dir: PathBuf,
}

impl SceneBuilder {
    fn new(base_dir: &Path) -> Self {
        Self {
            scene: Scene::new(),
            meshes: MeshCache::with_base_dir(base_dir),
            materials: HashMap::new(),
            base_dir: base_dir.to_path_buf(),
        }
    }

    fn add_node(&mut self, def: &NodeDef) -> Result<NodeId> {
        let kind = match &def.shape {
            ShapeDef::Group => NodeKind::Group,
            ShapeDef::Union => NodeKind::Boolean(BooleanOp::Union),
            ShapeDef::Intersection => NodeKind::Boolean(BooleanOp::Intersection),
            ShapeDef::Difference => NodeKind::Boolean(BooleanOp::Difference),
            shape => {
                let primitive = self.primitive(shape).with_context(|| {
                    format!("Failed to build geometry for node '{}'", def.name)
                })?;
                NodeKind::Geometry(GeometryNode::new(primitive))
            }
        };
        let id = self.scene.add_node(def.name.clone(), kind);

        for op in &def.transform {
            match op {
                TransformOp::Scale(amount) => self.scene.scale(id, Vec3::from(*amount))?,
                TransformOp::Translate(amount) => {
                    self.scene.translate(id, Vec3::from(*amount))?
                }
                TransformOp::Rotate { axis, degrees } => {
                    let axis: Axis = axis
                        .parse()
                        .with_context(|| format!("In transform of node '{}'", def.name))?;
                    self.scene.rotate(id, axis, *degrees)?;
                }
            }
        }

        self.decorate(id, def)?;

        for child in &def.children {
            let child_id = self.add_node(child)?;
            self.scene.add_child(id, child_id)?;
        }

        Ok(id)
    }

    /// Attach material, textures and emission to a geometry node.
    fn decorate(&mut self, id: NodeId, def: &NodeDef) -> Result<()> {
        let has_surface = def.material.is_some()
            || def.texture.is_some()
            || def.normal_map.is_some()
            || def.emission.is_some();
        if !has_surface {
            return Ok(());
        }
        if self.scene.node(id)?.geometry().is_none() {
            bail!(
                "Node '{}' is a {} and cannot carry surface properties",
                def.name,
                self.scene.node(id)?.kind.type_name()
            );
        }

        if let Some(name) = &def.material {
            let Some(&material) = self.materials.get(name) else {
                bail!("Node '{}' uses unknown material '{}'", def.name, name);
            };
            self.scene.set_material(id, material)?;
        }
        if let Some(path) = &def.texture {
            let texture = self.texture(path)?;
            self.scene.set_texture(id, texture)?;
        }
        if let Some(path) = &def.normal_map {
            let texture = self.texture(path)?;
            self.scene.set_normal_map(id, texture)?;
        }
        if let Some(emission) = &def.emission {
            self.scene.set_emission(
                id,
                Vec3::from(emission.color),
                emission.falloff,
                emission.samples,
            )?;
        }
        Ok(())
    }

    fn primitive(&mut self, shape: &ShapeDef) -> Result<Primitive> {
        Ok(match shape {
            ShapeDef::Sphere => Primitive::Sphere,
            ShapeDef::Cube => Primitive::Cube,
            ShapeDef::Cylinder => Primitive::Cylinder,
            ShapeDef::Cone => Primitive::Cone,
            ShapeDef::NhSphere { center, radius } => Primitive::NonhierSphere {
                center: Vec3::from(*center),
                radius: *radius,
            },
            ShapeDef::NhBox { min, size } => Primitive::NonhierBox {
                min: Vec3::from(*min),
                size: *size,
            },
            ShapeDef::Mesh { path } => Primitive::Mesh(self.meshes.load(path)?),
            ShapeDef::Group | ShapeDef::Union | ShapeDef::Intersection | ShapeDef::Difference => {
                bail!("{:?} is not a geometric primitive", shape)
            }
        })
    }

    fn texture(&self, path: &str) -> Result<Texture> {
        let full_path = self.base_dir.join(path);
        load_texture(&full_path)
            .with_context(|| format!("Failed to load texture {}", full_path.display()))
    }
}
