//! Render entry point and output buffer.

use std::time::{Duration, Instant};

use lumen_core::{Color, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::RenderError;
use crate::scheduler::{RowClaims, RowScheduler};
use crate::settings::RenderSettings;
use crate::shading::Tracer;

/// Row-major float image.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// 8-bit RGB bytes, clamped, with no gamma applied.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            let c = color.clamp(Color::ZERO, Color::ONE) * 255.0;
            bytes.extend_from_slice(&[c.x as u8, c.y as u8, c.z as u8]);
        }
        bytes
    }
}

/// What happened during a render.
#[derive(Debug, Clone)]
pub struct RenderStats {
    /// Rows each worker claimed, in claim order
    pub rows_per_worker: RowClaims,
    pub elapsed: Duration,
}

impl RenderStats {
    pub fn workers(&self) -> usize {
        self.rows_per_worker.len()
    }

    pub fn rows_rendered(&self) -> usize {
        self.rows_per_worker.iter().map(Vec::len).sum()
    }
}

/// Render `scene` into `image`.
///
/// World transforms are refreshed and the scene is validated before any
/// worker starts; a malformed scene fails without touching the image.
pub fn render(
    scene: &mut Scene,
    image: &mut ImageBuffer,
    settings: &RenderSettings,
) -> Result<RenderStats, RenderError> {
    if image.width == 0 || image.height == 0 {
        return Err(RenderError::EmptyImage {
            width: image.width,
            height: image.height,
        });
    }

    scene.update_world_transforms()?;
    scene.validate()?;
    let scene: &Scene = scene;

    let camera = settings.camera(image.width, image.height);
    let tracer = Tracer::new(scene, settings, camera)?;
    let scheduler = RowScheduler::new(settings.worker_count());

    log::info!(
        "Rendering '{}' at {}x{} with {} threads",
        settings.name,
        image.width,
        image.height,
        scheduler.workers()
    );
    log::info!(
        "  camera: eye {:?}, view {:?}, up {:?}, fov {}",
        settings.eye,
        settings.view,
        settings.up,
        settings.fov_y
    );
    log::info!(
        "  ambient {:?}, {} point lights, {} area lights, supersampling {}",
        settings.ambient,
        settings.lights.len(),
        tracer.area_lights().len(),
        settings.supersample
    );

    let start = Instant::now();
    let width = image.width as usize;
    let rows_per_worker = scheduler.run(&mut image.pixels, width, |y, row| {
        for (x, pixel) in row.iter_mut().enumerate() {
            let index = (y * width + x) as u64;
            let mut rng = StdRng::seed_from_u64(settings.seed ^ index);
            *pixel = tracer.pixel_color(x as u32, y as u32, &mut rng);
        }
    })?;
    let elapsed = start.elapsed();

    log::info!("Render complete in {:.2?}", elapsed);

    Ok(RenderStats {
        rows_per_worker,
        elapsed,
    })
}
