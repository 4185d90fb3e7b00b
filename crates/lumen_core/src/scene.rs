//! Scene graph for the Lumen ray tracer.
//!
//! Nodes live in an arena owned by [`Scene`] and refer to their children by
//! [`NodeId`]. Dropping the scene drops every node, so a subtree never
//! outlives its parent. Materials are shared between nodes through a
//! separate arena of `Arc<Material>` addressed by [`MaterialId`].

use std::sync::Arc;

use lumen_math::{Axis, Mat4, Transform, Vec3};

use crate::{Color, Light, Material, Primitive, SceneError, Texture};

/// Index of a node in the scene arena. Ids increase in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Index of a material in the scene's material arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(pub usize);

/// Constructive solid geometry operator of a boolean node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Intersection,
    Union,
    Difference,
}

/// Light emitted by a geometry node, sampled over its surface.
#[derive(Clone, Debug)]
pub struct Emission {
    /// Emitted colour and falloff. The position is filled in per render
    /// from the node's world transform.
    pub light: Light,

    /// Shadow rays per shading point
    pub samples: u32,
}

/// A leaf carrying renderable geometry.
#[derive(Clone, Debug)]
pub struct GeometryNode {
    pub primitive: Primitive,
    pub material: Option<MaterialId>,
    pub texture: Option<Texture>,
    pub normal_map: Option<Texture>,
    pub emission: Option<Emission>,
}

impl GeometryNode {
    pub fn new(primitive: Primitive) -> Self {
        Self {
            primitive,
            material: None,
            texture: None,
            normal_map: None,
            emission: None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    /// Pure grouping node
    Group,
    Geometry(GeometryNode),
    /// CSG combinator over exactly two children
    Boolean(BooleanOp),
}

impl NodeKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Group => "SceneNode",
            NodeKind::Geometry(_) => "GeometryNode",
            NodeKind::Boolean(_) => "BooleanNode",
        }
    }
}

/// One node of the scene graph.
#[derive(Clone, Debug)]
pub struct SceneNode {
    id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// Accumulated world matrix, refreshed by `Scene::update_world_transforms`
    world: Mat4,
}

impl SceneNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// World matrix as of the last world-transform pass.
    pub fn world_transform(&self) -> &Mat4 {
        &self.world
    }

    pub fn geometry(&self) -> Option<&GeometryNode> {
        match &self.kind {
            NodeKind::Geometry(g) => Some(g),
            _ => None,
        }
    }

    fn geometry_mut(&mut self) -> Result<&mut GeometryNode, SceneError> {
        match &mut self.kind {
            NodeKind::Geometry(g) => Ok(g),
            _ => Err(SceneError::NotGeometry(self.name.clone())),
        }
    }
}

impl std::fmt::Display for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:[name:{}, id:{}]",
            self.kind.type_name(),
            self.name,
            self.id.0
        )
    }
}

/// A complete scene graph with its shared materials.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    materials: Vec<Arc<Material>>,
    root: Option<NodeId>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node and return its id.
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            id,
            name: name.into(),
            transform: Transform::IDENTITY,
            kind,
            children: Vec::new(),
            parent: None,
            world: Mat4::IDENTITY,
        });
        id
    }

    pub fn add_group(&mut self, name: impl Into<String>) -> NodeId {
        self.add_node(name, NodeKind::Group)
    }

    pub fn add_geometry(&mut self, name: impl Into<String>, primitive: Primitive) -> NodeId {
        self.add_node(name, NodeKind::Geometry(GeometryNode::new(primitive)))
    }

    pub fn add_boolean(&mut self, name: impl Into<String>, op: BooleanOp) -> NodeId {
        self.add_node(name, NodeKind::Boolean(op))
    }

    /// Attach `child` under `parent`, appending to its child list.
    ///
    /// A node has at most one parent and the graph must stay a tree.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.node(parent)?;
        let child_node = self.node(child)?;
        if child_node.parent().is_some() {
            return Err(SceneError::AlreadyParented(child_node.name.clone()));
        }

        // Walking up from the parent must never reach the child.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(SceneError::Cycle {
                    parent: self.nodes[parent.0].name.clone(),
                    child: self.nodes[child.0].name.clone(),
                });
            }
            cursor = self.nodes[id.0].parent();
        }

        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn set_root(&mut self, root: NodeId) -> Result<(), SceneError> {
        self.node(root)?;
        self.root = Some(root);
        Ok(())
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(id.0).ok_or(SceneError::UnknownNode(id.0))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id.0))
    }

    /// Total number of nodes ever created in this scene.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---------------------------------------------------------------------
    // Materials
    // ---------------------------------------------------------------------

    /// Add a material to the scene and return its ID.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len());
        self.materials.push(Arc::new(material));
        id
    }

    /// Get a material by ID.
    pub fn material(&self, id: MaterialId) -> Result<&Arc<Material>, SceneError> {
        self.materials
            .get(id.0)
            .ok_or(SceneError::UnknownMaterial(id.0))
    }

    /// Get material count.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn set_material(&mut self, node: NodeId, material: MaterialId) -> Result<(), SceneError> {
        self.material(material)?;
        self.node_mut(node)?.geometry_mut()?.material = Some(material);
        Ok(())
    }

    pub fn set_texture(&mut self, node: NodeId, texture: Texture) -> Result<(), SceneError> {
        self.node_mut(node)?.geometry_mut()?.texture = Some(texture);
        Ok(())
    }

    pub fn set_normal_map(&mut self, node: NodeId, normal_map: Texture) -> Result<(), SceneError> {
        self.node_mut(node)?.geometry_mut()?.normal_map = Some(normal_map);
        Ok(())
    }

    /// Turn a geometry node into an area light.
    pub fn set_emission(
        &mut self,
        node: NodeId,
        color: Color,
        falloff: [f32; 3],
        samples: u32,
    ) -> Result<(), SceneError> {
        self.node_mut(node)?.geometry_mut()?.emission = Some(Emission {
            light: Light::new(Vec3::ZERO, color, falloff),
            samples,
        });
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Transforms
    // ---------------------------------------------------------------------

    pub fn set_transform(&mut self, node: NodeId, matrix: Mat4) -> Result<(), SceneError> {
        self.node_mut(node)?.transform.set(matrix);
        Ok(())
    }

    pub fn scale(&mut self, node: NodeId, amount: Vec3) -> Result<(), SceneError> {
        self.node_mut(node)?.transform.scale(amount);
        Ok(())
    }

    pub fn translate(&mut self, node: NodeId, amount: Vec3) -> Result<(), SceneError> {
        self.node_mut(node)?.transform.translate(amount);
        Ok(())
    }

    pub fn rotate(&mut self, node: NodeId, axis: Axis, degrees: f32) -> Result<(), SceneError> {
        self.node_mut(node)?.transform.rotate(axis, degrees);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Render preparation
    // ---------------------------------------------------------------------

    /// Ids of every node reachable from the root, parents before children.
    pub fn reachable(&self) -> Result<Vec<NodeId>, SceneError> {
        let root = self.root.ok_or(SceneError::NoRoot)?;
        let mut order = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }

        Ok(order)
    }

    /// Stamp each reachable node with its accumulated world matrix.
    pub fn update_world_transforms(&mut self) -> Result<(), SceneError> {
        let root = self.root.ok_or(SceneError::NoRoot)?;
        let mut stack = vec![(root, Mat4::IDENTITY)];

        while let Some((id, parent_world)) = stack.pop() {
            let node = &mut self.nodes[id.0];
            let world = parent_world * *node.transform.matrix();
            node.world = world;
            stack.extend(node.children.iter().map(|&child| (child, world)));
        }

        Ok(())
    }

    /// Check the structural invariants required for rendering.
    pub fn validate(&self) -> Result<(), SceneError> {
        for id in self.reachable()? {
            let node = &self.nodes[id.0];
            match &node.kind {
                NodeKind::Group => {}
                NodeKind::Boolean(_) => {
                    if node.children.len() != 2 {
                        return Err(SceneError::MalformedBoolean {
                            name: node.name.clone(),
                            children: node.children.len(),
                        });
                    }
                }
                NodeKind::Geometry(geometry) => {
                    let material = geometry
                        .material
                        .ok_or_else(|| SceneError::MissingMaterial(node.name.clone()))?;
                    self.material(material)?;

                    if let Some(emission) = &geometry.emission {
                        if !geometry.primitive.supports_sampling() {
                            return Err(SceneError::SamplingUnsupported(
                                geometry.primitive.kind_name(),
                            ));
                        }
                        if emission.samples == 0 {
                            return Err(SceneError::NoEmissionSamples(node.name.clone()));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

impl std::ops::Index<NodeId> for Scene {
    type Output = SceneNode;

    /// Ids handed out by this scene are always valid indices.
    fn index(&self, id: NodeId) -> &SceneNode {
        &self.nodes[id.0]
    }
}
