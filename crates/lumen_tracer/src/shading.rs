//! Recursive Phong shading with shadows, reflection and transmission.

use lumen_core::{
    Color, GeometryNode, Light, Material, NodeId, NodeKind, Primitive, Scene, SceneError,
};
use lumen_math::{Camera, Mat3, Mat4, Ray, Vec2, Vec3};
use rand::RngCore;

use crate::background::{image_backdrop, procedural_sky, Background};
use crate::intersector::{intersect_scene, surface_of};
use crate::occlusion::light_visibility;
use crate::settings::RenderSettings;
use crate::surface::SurfacePoint;

/// Reflections contributing less than this to the pixel are not traced.
pub const MIN_REFLECTION_WEIGHT: f32 = 0.05;

/// Emissive geometry resolved to world space for one render.
#[derive(Debug)]
pub struct AreaLight<'a> {
    pub node: NodeId,
    /// Emission with its position placed at the primitive's world center
    pub light: Light,
    pub samples: u32,
    primitive: &'a Primitive,
    world: Mat4,
    local_center: Vec3,
}

impl<'a> AreaLight<'a> {
    /// Random world-space point on the emitter's surface.
    fn sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let local = self
            .primitive
            .sample_point(rng)
            .unwrap_or(self.local_center);
        self.world.transform_point3(local)
    }
}

/// Collect the emitters reachable from the root.
///
/// World transforms must already be up to date.
pub fn collect_area_lights(scene: &Scene) -> Result<Vec<AreaLight<'_>>, SceneError> {
    let mut lights = Vec::new();

    for id in scene.reachable()? {
        let node = &scene[id];
        let NodeKind::Geometry(geometry) = &node.kind else {
            continue;
        };
        let Some(emission) = &geometry.emission else {
            continue;
        };

        let local_center = geometry.primitive.center()?;
        let world = *node.world_transform();
        let mut light = emission.light.clone();
        light.position = world.transform_point3(local_center);

        log::debug!("Area light '{}' at {:?}", node.name, light.position);

        lights.push(AreaLight {
            node: id,
            light,
            samples: emission.samples,
            primitive: &geometry.primitive,
            world,
            local_center,
        });
    }

    Ok(lights)
}

/// Shades rays against an immutable scene.
pub struct Tracer<'a> {
    scene: &'a Scene,
    settings: &'a RenderSettings,
    camera: Camera,
    area_lights: Vec<AreaLight<'a>>,
}

impl<'a> Tracer<'a> {
    pub fn new(
        scene: &'a Scene,
        settings: &'a RenderSettings,
        camera: Camera,
    ) -> Result<Self, SceneError> {
        Ok(Self {
            scene,
            settings,
            camera,
            area_lights: collect_area_lights(scene)?,
        })
    }

    pub fn area_lights(&self) -> &[AreaLight<'a>] {
        &self.area_lights
    }

    /// Final colour of one image pixel.
    pub fn pixel_color(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
        let center = Vec2::new(x as f32, y as f32);
        if !self.settings.supersample {
            return self.sample_pixel(center, rng);
        }

        let mut total = Color::ZERO;
        for dx in [-0.5, 0.0, 0.5] {
            for dy in [-0.5, 0.0, 0.5] {
                total += self.sample_pixel(center + Vec2::new(dx, dy), rng);
            }
        }
        total / 9.0
    }

    fn sample_pixel(&self, pixel: Vec2, rng: &mut dyn RngCore) -> Color {
        let ray = self.camera.primary_ray(pixel);
        self.trace(&ray, 1.0, Background::Scene, rng)
    }

    /// Colour seen along `ray`.
    ///
    /// `weight` is the share of the final pixel this ray can still affect.
    pub fn trace(
        &self,
        ray: &Ray,
        weight: f32,
        background: Background,
        rng: &mut dyn RngCore,
    ) -> Color {
        let Some(hit) = intersect_scene(self.scene, ray) else {
            return self.background(ray, background);
        };
        let Some((geometry, material)) = surface_of(self.scene, &hit.entry) else {
            return self.background(ray, background);
        };

        let entry = hit.entry;
        let visible = self.visible_lights(&entry, rng);
        let mut color = self.shade(ray, &entry, geometry, material, &visible);

        if material.is_transparent() {
            let transparency = material.transparency;
            let transmitted = Ray::new(hit.exit.position, ray.direction());
            let behind = self.trace(&transmitted, transparency * weight, background, rng);
            color = color * (1.0 - transparency) + behind * transparency;
        }

        let reflectivity = material.reflectivity;
        if reflectivity * weight > MIN_REFLECTION_WEIGHT {
            let d = ray.direction();
            let n = entry.normal;
            let reflected = Ray::new(entry.position, d - 2.0 * d.dot(n) * n);
            let mirror = self.trace(
                &reflected,
                reflectivity * weight,
                Background::FlatAmbient,
                rng,
            );
            color = color * (1.0 - reflectivity) + mirror * reflectivity;
        }

        color
    }

    /// Lights that reach `point`, with their visibility.
    fn visible_lights<'s>(
        &'s self,
        point: &SurfacePoint,
        rng: &mut dyn RngCore,
    ) -> Vec<(&'s Light, f32)> {
        let position = point.position;
        let mut visible = Vec::new();

        for light in &self.settings.lights {
            let shadow = Ray::new(position, light.position - position);
            let visibility = light_visibility(self.scene, &shadow, light.position, None);
            if visibility > 0.0 {
                visible.push((light, visibility));
            }
        }

        for area in &self.area_lights {
            if point.node == Some(area.node) {
                continue;
            }

            let mut total = 0.0;
            for _ in 0..area.samples {
                let target = area.sample(rng);
                let shadow = Ray::new(position, target - position);
                total += light_visibility(self.scene, &shadow, target, Some(area.node));
            }

            let average = total / area.samples.max(1) as f32;
            if average > 0.0 {
                visible.push((&area.light, average));
            }
        }

        visible
    }

    /// Phong lighting at a surface point, clamped to [0, 1].
    fn shade(
        &self,
        ray: &Ray,
        point: &SurfacePoint,
        geometry: &GeometryNode,
        material: &Material,
        lights: &[(&Light, f32)],
    ) -> Color {
        let uv = point.uv;
        let surface_color = match &geometry.texture {
            Some(texture) => texture.sample(uv.x, uv.y),
            None => material.diffuse,
        };

        let mut normal = point.normal;
        if let Some(normal_map) = &geometry.normal_map {
            let perturbed = normal_map.sample_normal(uv.x, uv.y);
            let bitangent = normal.cross(point.tangent).normalize_or_zero();
            let tbn = Mat3::from_cols(point.tangent, bitangent, normal);
            normal = tbn * perturbed;
        }
        let n = normal.normalize_or_zero();

        let mut color = self.settings.ambient * surface_color;

        // Emitters are visible when looked at directly
        if let Some(emission) = &geometry.emission {
            color += emission.light.color;
        }

        let v = (ray.origin() - point.position).normalize_or_zero();
        for &(light, intensity) in lights {
            let to_light = light.position - point.position;
            let l = to_light.normalize_or_zero();
            let n_dot_l = n.dot(l);

            let specular = if n_dot_l > 0.0 {
                let r = -l + 2.0 * n_dot_l * n;
                let s = material.specular * r.dot(v).powf(material.shininess) / n_dot_l;
                if s.is_finite() && s.cmpge(Vec3::ZERO).all() {
                    s
                } else {
                    Color::ZERO
                }
            } else {
                Color::ZERO
            };

            let attenuation = light.attenuation(to_light.length());
            color += (surface_color + specular) * light.color * intensity * n_dot_l.max(0.0)
                / attenuation;
        }

        color.clamp(Color::ZERO, Color::ONE)
    }

    fn background(&self, ray: &Ray, background: Background) -> Color {
        let ambient = self.settings.ambient;
        match background {
            Background::FlatAmbient => ambient,
            Background::Scene => {
                let pixel = self.camera.ray_to_pixel(ray);
                let (width, height) = (self.camera.width, self.camera.height);
                match &self.settings.background {
                    Some(texture) => image_backdrop(texture, pixel, width, height, ambient),
                    None => procedural_sky(pixel, height),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Texture;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const WIDTH: u32 = 21;
    const HEIGHT: u32 = 21;

    fn single_sphere(material: Material) -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let root = scene.add_group("root");
        let ball = scene.add_geometry("ball", Primitive::Sphere);
        let m = scene.add_material(material);
        scene.set_material(ball, m).unwrap();
        scene.add_child(root, ball).unwrap();
        scene.set_root(root).unwrap();
        scene.update_world_transforms().unwrap();
        (scene, ball)
    }

    fn settings() -> RenderSettings {
        RenderSettings::new()
            .with_camera(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::Y, 40.0)
            .with_ambient(Color::new(0.4, 0.5, 0.6))
    }

    fn camera(settings: &RenderSettings) -> Camera {
        settings.camera(WIDTH, HEIGHT)
    }

    #[test]
    fn test_ambient_only_center_pixel() {
        let diffuse = Color::new(0.5, 0.25, 1.0);
        let (scene, _) = single_sphere(Material::new(diffuse));
        let settings = settings();
        let tracer = Tracer::new(&scene, &settings, camera(&settings)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let center = tracer.pixel_color(WIDTH / 2, HEIGHT / 2, &mut rng);
        assert_eq!(center, settings.ambient * diffuse);
    }

    #[test]
    fn test_point_light_brightens_facing_side() {
        let (scene, _) = single_sphere(Material::new(Color::splat(0.5)));
        let settings = settings().with_light(Light::new(
            Vec3::new(0.0, 0.0, 10.0),
            Color::ONE,
            [1.0, 0.0, 0.0],
        ));
        let tracer = Tracer::new(&scene, &settings, camera(&settings)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let lit = tracer.trace(&ray, 1.0, Background::Scene, &mut rng);
        // ambient * kd + kd * 1 * (n . l = 1), clamped
        let expected = (settings.ambient * 0.5 + Color::splat(0.5)).min(Color::ONE);
        assert!((lit - expected).length() < 1e-4);
    }

    #[test]
    fn test_light_behind_surface_is_ignored() {
        let (scene, _) = single_sphere(Material::new(Color::splat(0.5)));
        let settings = settings().with_light(Light::new(
            Vec3::new(0.0, 0.0, -10.0),
            Color::ONE,
            [1.0, 0.0, 0.0],
        ));
        let tracer = Tracer::new(&scene, &settings, camera(&settings)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let color = tracer.trace(&ray, 1.0, Background::Scene, &mut rng);
        assert!((color - settings.ambient * 0.5).length() < 1e-5);
    }

    #[test]
    fn test_miss_returns_background() {
        let (scene, _) = single_sphere(Material::default());
        let settings = settings();
        let tracer = Tracer::new(&scene, &settings, camera(&settings)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let up = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Y);
        assert_eq!(
            tracer.trace(&up, 1.0, Background::FlatAmbient, &mut rng),
            settings.ambient
        );
    }

    #[test]
    fn test_mirror_reflects_ambient() {
        // A perfect mirror shows the flat ambient background in its reflection
        let mirror = Material::phong(Color::ZERO, Color::ZERO, 1.0, 1.0, 0.0);
        let (scene, _) = single_sphere(mirror);
        let settings = settings();
        let tracer = Tracer::new(&scene, &settings, camera(&settings)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let color = tracer.trace(&ray, 1.0, Background::Scene, &mut rng);
        assert!((color - settings.ambient).length() < 1e-5);
    }

    #[test]
    fn test_fully_transparent_shows_background() {
        let glass = Material::phong(Color::ONE, Color::ZERO, 1.0, 0.0, 1.0);
        let (scene, _) = single_sphere(glass);
        let settings = settings();
        let tracer = Tracer::new(&scene, &settings, camera(&settings)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let color = tracer.trace(&ray, 1.0, Background::FlatAmbient, &mut rng);
        assert!((color - settings.ambient).length() < 1e-5);
    }

    #[test]
    fn test_texture_replaces_diffuse() {
        let (mut scene, ball) = single_sphere(Material::new(Color::ONE));
        scene
            .set_texture(ball, Texture::solid_color(Color::new(0.0, 1.0, 0.0)))
            .unwrap();
        let settings = settings().with_ambient(Color::ONE);
        let tracer = Tracer::new(&scene, &settings, camera(&settings)).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let color = tracer.trace(&ray, 1.0, Background::Scene, &mut rng);
        assert_eq!(color, Color::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_area_light_placement_and_skip() {
        let mut scene = Scene::new();
        let root = scene.add_group("root");
        let floor = scene.add_geometry("floor", Primitive::Cube);
        let lamp = scene.add_geometry("lamp", Primitive::Sphere);
        let m = scene.add_material(Material::new(Color::splat(0.5)));
        scene.set_material(floor, m).unwrap();
        scene.set_material(lamp, m).unwrap();
        scene.set_emission(lamp, Color::ONE, [1.0, 0.0, 0.0], 8).unwrap();
        scene.scale(floor, Vec3::new(10.0, 0.1, 10.0)).unwrap();
        scene.translate(floor, Vec3::new(-5.0, -1.0, -5.0)).unwrap();
        scene.scale(lamp, Vec3::splat(0.25)).unwrap();
        scene.translate(lamp, Vec3::new(0.0, 3.0, 0.0)).unwrap();
        scene.add_child(root, floor).unwrap();
        scene.add_child(root, lamp).unwrap();
        scene.set_root(root).unwrap();
        scene.update_world_transforms().unwrap();

        let settings = settings().with_ambient(Color::ZERO);
        let tracer = Tracer::new(&scene, &settings, camera(&settings)).unwrap();
        assert_eq!(tracer.area_lights().len(), 1);
        let placed = tracer.area_lights()[0].light.position;
        assert!((placed - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-5);

        let mut rng = StdRng::seed_from_u64(3);

        // Looking down at the floor: lit by the lamp above
        let down = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y);
        let floor_color = tracer.trace(&down, 1.0, Background::FlatAmbient, &mut rng);
        assert!(floor_color.x > 0.0);

        // Looking at the lamp: its own emission, never self-shadowed
        let at_lamp = Ray::new(Vec3::new(0.0, 3.0, 5.0), Vec3::NEG_Z);
        let lamp_color = tracer.trace(&at_lamp, 1.0, Background::FlatAmbient, &mut rng);
        assert_eq!(lamp_color, Color::ONE);
    }
}
