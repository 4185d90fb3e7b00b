//! Triangle mesh geometry and the per-scene mesh cache.
//!
//! The renderer consumes meshes as already-parsed buffers. Loading from OBJ
//! files is done through [`MeshCache`], which the scene builder owns so that
//! every file is parsed at most once per scene.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::{Aabb, Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur during mesh loading.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("failed to load mesh {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("mesh {0} contains no triangles")]
    Empty(String),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// A triangle soup with optional per-vertex normals and UVs.
///
/// Normals and UVs, when present, are indexed by the same indices as the
/// positions.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

/// The resolved vertex data of one triangle.
#[derive(Clone, Copy, Debug)]
pub struct MeshTriangle {
    pub positions: [Vec3; 3],
    pub normals: Option<[Vec3; 3]>,
    pub uvs: Option<[Vec2; 3]>,
}

impl Mesh {
    /// Create a mesh from positions and indices, optionally with normals and UVs.
    ///
    /// Attribute arrays that do not match the vertex count are dropped and
    /// triangles referencing missing vertices are discarded, both with a
    /// warning, so the intersection loop never has to bounds-check.
    pub fn new(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
    ) -> Self {
        let vertex_count = positions.len();

        let normals = normals.filter(|n| {
            let ok = n.len() == vertex_count;
            if !ok {
                log::warn!(
                    "Normals array length ({}) doesn't match vertex count ({}), ignoring normals",
                    n.len(),
                    vertex_count
                );
            }
            ok
        });
        let uvs = uvs.filter(|uv| {
            let ok = uv.len() == vertex_count;
            if !ok {
                log::warn!(
                    "UV array length ({}) doesn't match vertex count ({}), ignoring uvs",
                    uv.len(),
                    vertex_count
                );
            }
            ok
        });

        let mut kept = Vec::with_capacity(indices.len());
        for face in indices.chunks_exact(3) {
            if face.iter().all(|&i| (i as usize) < vertex_count) {
                kept.extend_from_slice(face);
            } else {
                log::warn!(
                    "Invalid triangle indices: {:?}, vertex count: {}",
                    face,
                    vertex_count
                );
            }
        }

        let bounds = Aabb::enclosing(positions.iter().copied());

        Self {
            positions,
            normals,
            uvs,
            indices: kept,
            bounds,
        }
    }

    /// Get the mesh center (center of bounding box).
    pub fn center(&self) -> Vec3 {
        self.bounds.center()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Iterate over every triangle with its attributes resolved.
    pub fn triangles(&self) -> impl Iterator<Item = MeshTriangle> + '_ {
        self.indices.chunks_exact(3).map(move |face| {
            let [a, b, c] = [face[0] as usize, face[1] as usize, face[2] as usize];
            MeshTriangle {
                positions: [self.positions[a], self.positions[b], self.positions[c]],
                normals: self.normals.as_ref().map(|n| [n[a], n[b], n[c]]),
                uvs: self.uvs.as_ref().map(|uv| [uv[a], uv[b], uv[c]]),
            }
        })
    }
}

/// Load an OBJ file into a single triangulated mesh.
///
/// All models in the file are merged. Quads and larger polygons are fanned
/// into triangles.
pub fn load_obj(path: &Path) -> MeshResult<Mesh> {
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };

    let (models, _materials) =
        tobj::load_obj(path, &options).map_err(|source| MeshError::Load {
            path: path.display().to_string(),
            source,
        })?;

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();
    let mut all_have_normals = true;
    let mut all_have_uvs = true;

    for model in &models {
        let m = &model.mesh;
        let offset = positions.len() as u32;
        let count = m.positions.len() / 3;

        positions.extend(m.positions.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2])));

        if m.normals.len() == count * 3 {
            normals.extend(m.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));
        } else {
            all_have_normals = false;
        }

        if m.texcoords.len() == count * 2 {
            uvs.extend(m.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], t[1])));
        } else {
            all_have_uvs = false;
        }

        indices.extend(m.indices.iter().map(|i| i + offset));
    }

    if indices.is_empty() {
        return Err(MeshError::Empty(path.display().to_string()));
    }

    let mesh = Mesh::new(
        positions,
        indices,
        all_have_normals.then_some(normals),
        all_have_uvs.then_some(uvs),
    );

    log::info!(
        "Loaded mesh {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    Ok(mesh)
}

/// Cache for loaded meshes.
///
/// Repeated references to the same file share one `Arc<Mesh>`, however the
/// path is spelled. The cache lives for one scene build and is not needed
/// during rendering.
pub struct MeshCache {
    /// Cached meshes by canonical file path
    meshes: HashMap<PathBuf, Arc<Mesh>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl MeshCache {
    /// Create a new empty mesh cache.
    pub fn new() -> Self {
        Self {
            meshes: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a mesh cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            meshes: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a mesh from file, using cache if available.
    pub fn load(&mut self, path: &str) -> MeshResult<Arc<Mesh>> {
        let full_path = self.resolve_path(path);
        // Missing files keep the resolved path and fail in the loader
        let key = std::fs::canonicalize(&full_path).unwrap_or_else(|_| full_path.clone());

        if let Some(mesh) = self.meshes.get(&key) {
            log::debug!("Mesh cache hit: {}", key.display());
            return Ok(mesh.clone());
        }

        let mesh = Arc::new(load_obj(&full_path)?);
        self.meshes.insert(key, mesh.clone());

        Ok(mesh)
    }

    /// Get the number of cached meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(base) = &self.base_dir {
            base.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for MeshCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn unit_triangle() -> Mesh {
        Mesh::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
            None,
            None,
        )
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = unit_triangle();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.normals.is_none());
        assert!((mesh.center() - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_invalid_faces_are_dropped() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mesh = Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2, 0, 1, 7],
            Some(vec![Vec3::Z]),
            None,
        );

        assert_eq!(mesh.triangle_count(), 1);
        // Mismatched normals are discarded rather than trusted.
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn test_triangles_resolve_attributes() {
        let mesh = Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![2, 1, 0],
            Some(vec![Vec3::Z; 3]),
            Some(vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]),
        );

        let tri = mesh.triangles().next().unwrap();
        assert_eq!(tri.positions, [Vec3::Y, Vec3::X, Vec3::ZERO]);
        assert_eq!(tri.normals, Some([Vec3::Z; 3]));
        assert_eq!(tri.uvs.unwrap()[0], Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_mesh_cache_loads_each_path_once() {
        let dir = std::env::temp_dir().join(format!("lumen_mesh_cache_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("quad.obj");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4").unwrap();
        drop(file);

        let mut cache = MeshCache::with_base_dir(&dir);
        let a = cache.load("quad.obj").unwrap();
        let b = cache.load("quad.obj").unwrap();
        // Another spelling of the same file
        let c = cache.load("./quad.obj").unwrap();
        let d = cache.load(&path.to_string_lossy()).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert!(Arc::ptr_eq(&a, &d));
        assert_eq!(cache.len(), 1);
        assert_eq!(a.triangle_count(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_mesh_cache_missing_file() {
        let mut cache = MeshCache::new();
        assert!(cache.load("/definitely/not/here.obj").is_err());
        assert!(cache.is_empty());
    }
}
