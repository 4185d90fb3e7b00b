use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::Ray;

/// Pinhole camera mapping image pixels to world-space rays and back.
///
/// Built from an eye position, a viewing direction, an up vector and a
/// vertical field of view in degrees. Pixel coordinates are fractional so
/// supersampling can ask for sub-pixel positions.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub eye: Vec3,
    pub view: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub width: u32,
    pub height: u32,
    view_projection: Mat4,
    inverse_view_projection: Mat4,
}

impl Camera {
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;

    /// Create a new camera
    pub fn new(eye: Vec3, view: Vec3, up: Vec3, fov_y: f32, width: u32, height: u32) -> Self {
        let mut camera = Self {
            eye,
            view,
            up,
            fov_y,
            width,
            height,
            view_projection: Mat4::IDENTITY,
            inverse_view_projection: Mat4::IDENTITY,
        };
        camera.view_projection = camera.projection_matrix() * camera.view_matrix();
        camera.inverse_view_projection = camera.view_projection.inverse();
        camera
    }

    /// Get the view matrix (world → camera space)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.eye + self.view, self.up)
    }

    /// Get the projection matrix (camera → clip space), OpenGL depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y.to_radians(), self.aspect(), Self::NEAR, Self::FAR)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// World-space point on the near plane under `pixel`.
    pub fn pixel_to_world(&self, pixel: Vec2) -> Vec3 {
        let ndc_x = (2.0 * pixel.x) / self.width as f32 - 1.0;
        let ndc_y = 1.0 - (2.0 * pixel.y) / self.height as f32;
        let world = self.inverse_view_projection * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        world.truncate() / world.w
    }

    /// Primary ray from the eye through `pixel`.
    pub fn primary_ray(&self, pixel: Vec2) -> Ray {
        Ray::new(self.eye, self.pixel_to_world(pixel) - self.eye)
    }

    /// Project where `ray` crosses the far plane back into pixel space.
    ///
    /// Used to look up background images for rays that escape the scene.
    pub fn ray_to_pixel(&self, ray: &Ray) -> Vec2 {
        let project = |p: Vec3| {
            let clip = self.view_projection * p.extend(1.0);
            clip / clip.w
        };
        let a = project(ray.origin + ray.direction);
        let b = project(ray.origin + 2.0 * ray.direction);

        // Far plane sits at z = 1 in normalized device coordinates.
        let t = (1.0 - a.z) / (b.z - a.z);
        let far = a + t * (b - a);
        let ndc = far.truncate() / far.w;

        Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.width as f32,
            (1.0 - (ndc.y * 0.5 + 0.5)) * self.height as f32,
        )
    }
}
