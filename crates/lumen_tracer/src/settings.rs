//! Render configuration.

use lumen_core::{Color, Light, Texture};
use lumen_math::{Camera, Vec3};

/// Everything a render needs besides the scene graph and the output image.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Name reported in logs
    pub name: String,
    pub eye: Vec3,
    /// Viewing direction (need not be normalized)
    pub view: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub ambient: Color,
    /// Point lights
    pub lights: Vec<Light>,
    /// Average a 3x3 grid of sub-pixel samples per pixel
    pub supersample: bool,
    /// Worker count; 0 uses the available parallelism
    pub threads: usize,
    /// Image shown behind the scene instead of the procedural sky
    pub background: Option<Texture>,
    /// Base seed for area-light sampling
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            name: "render".to_string(),
            eye: Vec3::new(0.0, 0.0, 5.0),
            view: Vec3::NEG_Z,
            up: Vec3::Y,
            fov_y: 50.0,
            ambient: Color::splat(0.1),
            lights: Vec::new(),
            supersample: false,
            threads: 0,
            background: None,
            seed: 0,
        }
    }
}

impl RenderSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the camera position, orientation and vertical field of view.
    pub fn with_camera(mut self, eye: Vec3, view: Vec3, up: Vec3, fov_y: f32) -> Self {
        self.eye = eye;
        self.view = view;
        self.up = up;
        self.fov_y = fov_y;
        self
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    /// Add a point light.
    pub fn with_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    pub fn with_supersampling(mut self, enabled: bool) -> Self {
        self.supersample = enabled;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_background(mut self, texture: Texture) -> Self {
        self.background = Some(texture);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Camera for an image of the given size.
    pub fn camera(&self, width: u32, height: u32) -> Camera {
        Camera::new(self.eye, self.view, self.up, self.fov_y, width, height)
    }

    /// Worker count with 0 resolved to the machine's parallelism.
    pub fn worker_count(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}
