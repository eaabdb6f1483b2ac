//= IMPORTS ==================================================================

use crate::cycle::Color;
use crate::hierarchy::HierarchyModel;
use crate::light::Light;
use crate::model::{Model, Technique, Transform};
use crate::scene::Scene;

use glam::{Mat4, Vec3};

use std::path::Path;

//= UTILITY FUNCTIONS ========================================================

// Returns a random real in [0,1).
#[inline(always)]
fn random_float() -> f32 {
    rand::random()
}

#[inline(always)]
fn pack_pixel(colour: Color) -> u32 {
    u32::from_ne_bytes([
        (255.9999 * colour.x.clamp(0.0, 0.999999)) as u8,
        (255.9999 * colour.y.clamp(0.0, 0.999999)) as u8,
        (255.9999 * colour.z.clamp(0.0, 0.999999)) as u8,
        255_u8,
    ])
}

#[inline(always)]
fn unpack_pixel(pixel: u32) -> Color {
    let [r, g, b, _] = pixel.to_ne_bytes();
    Color::new(r as f32, g as f32, b as f32) / 255.0
}

//= CONSTANTS ================================================================

const CLEAR_COLOUR: Color = Color::new(0.2, 0.2, 0.3);

const FOV_Y: f32 = 0.785398; // 45 degrees
const NEAR: f32 = 0.1;
const FAR: f32 = 1000.0;

// Marker sizing, in pixels at unit scale and unit clip depth.
const MARKER_SIZE: f32 = 700.0;
const GLOW_SIZE: f32 = 2200.0;

//= CAMERA ===================================================================

/// The scene camera plus the framebuffer it draws into. There is no GPU
/// here: models become flat markers and lights become additive glow splats,
/// which is all the headless scene needs to exercise its update output.
pub(crate) struct Camera {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) data: Vec<u32>,

    pub(crate) transform: Transform,
}

impl Camera {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        // Same placement the original scene sets up.
        let mut transform = Transform::new(
            Vec3::new(-15.0, 20.0, -40.0),
            Vec3::new(13.0_f32.to_radians(), 18.0_f32.to_radians(), 0.0),
            1.0,
        );
        transform.update_matrix();

        Self {
            width,
            height,
            data: vec![0_u32; width as usize * height as usize],
            transform,
        }
    }

    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.data = vec![0_u32; width as usize * height as usize];
    }

    pub(crate) fn view_matrix(&self) -> Mat4 {
        self.transform.world.inverse()
    }

    pub(crate) fn proj_matrix(&self) -> Mat4 {
        Mat4::perspective_lh(FOV_Y, self.width as f32 / self.height as f32, NEAR, FAR)
    }

    pub(crate) fn render(&mut self, scene: &Scene) {
        profiling::scope!("render");

        self.transform.update_matrix();
        let view_proj = self.proj_matrix() * self.view_matrix();

        // Clear to a fixed colour close to the ambient level.
        let clear = pack_pixel(CLEAR_COLOUR);
        self.data.fill(clear);

        self.draw_model(&view_proj, &scene.floor, scene);
        self.draw_model(&view_proj, &scene.cube, scene);
        self.draw_model(&view_proj, &scene.cardboard_box, scene);
        self.draw_model(&view_proj, &scene.teapot, scene);
        self.draw_hierarchy(&view_proj, &scene.vehicle);

        // Lights last: their tint adds on top of whatever is underneath.
        self.draw_light(&view_proj, &scene.light1);
        self.draw_light(&view_proj, &scene.light2);
        for light in &scene.teapot_lights {
            self.draw_light(&view_proj, light);
        }
    }

    /// Project a world point to pixel coordinates plus clip depth.
    /// Points behind the camera are discarded.
    fn project(&self, view_proj: &Mat4, point: Vec3) -> Option<(f32, f32, f32)> {
        let clip = *view_proj * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let x = (ndc.x * 0.5 + 0.5) * self.width as f32;
        let y = (0.5 - ndc.y * 0.5) * self.height as f32;
        Some((x, y, clip.w))
    }

    fn draw_model(&mut self, view_proj: &Mat4, model: &Model, scene: &Scene) {
        let Some((cx, cy, depth)) = self.project(view_proj, model.transform.position) else {
            return;
        };

        let mut size = model.transform.scale.x * MARKER_SIZE / depth;
        if model.technique == Technique::Wiggle {
            size *= 1.0 + 0.25 * scene.wiggle.sin();
        }
        let half = (size * 0.5).clamp(1.0, 48.0);

        let colour = match model.technique {
            Technique::VertexLit | Technique::NormalMapping => self.lit_colour(scene, model),
            _ => model.colour,
        };
        self.fill_rect(cx, cy, half, colour);
    }

    /// Blinn lighting for the lit techniques. Markers have no geometry, so
    /// they are shaded like a patch of the floor plane.
    fn lit_colour(&self, scene: &Scene, model: &Model) -> Color {
        let normal = Vec3::Y;
        let position = model.transform.position;
        let view_dir = (self.transform.position - position).normalize();

        let mut lit = model.colour * scene.ambient_colour;
        let lights = [
            &scene.light1,
            &scene.light2,
            &scene.teapot_lights[0],
            &scene.teapot_lights[1],
            &scene.teapot_lights[2],
        ];
        for light in lights {
            let to_light = light.transform.position - position;
            let distance2 = to_light.length_squared().max(1.0);
            let direction = to_light / distance2.sqrt();
            let diffuse = direction.dot(normal).max(0.0) / (1.0 + distance2 * 0.001);
            let halfway = (direction + view_dir).normalize();
            let specular = halfway.dot(normal).max(0.0).powf(scene.specular_power);
            lit += (model.colour * diffuse + Color::splat(specular)) * light.colour;
        }
        lit
    }

    fn draw_hierarchy(&mut self, view_proj: &Mat4, node: &HierarchyModel) {
        if node.has_geometry {
            let position = node.transform.world.transform_point3(Vec3::ZERO);
            if let Some((cx, cy, depth)) = self.project(view_proj, position) {
                let half = (node.transform.scale.x * MARKER_SIZE * 0.25 / depth).clamp(1.0, 24.0);
                self.fill_rect(cx, cy, half, Color::new(0.3, 0.35, 0.3));
            }
        }
        for child in &node.children {
            self.draw_hierarchy(view_proj, child);
        }
    }

    /// Additive tint: the light's unclamped colour falls off radially and is
    /// added on top of the framebuffer. The rim is dithered with a little
    /// random jitter so the overshooting colours do not band.
    fn draw_light(&mut self, view_proj: &Mat4, light: &Light) {
        let Some((cx, cy, depth)) = self.project(view_proj, light.transform.position) else {
            return;
        };

        let radius = (light.transform.scale.x * GLOW_SIZE / depth).clamp(2.0, 96.0);
        let colour = light.colour;

        // A light not drawn additively is just a solid marker.
        if light.technique != Technique::AdditiveTexTint {
            self.fill_rect(cx, cy, radius * 0.25, colour);
            return;
        }

        // Fully off-screen to the left or top: reject before the usize cast
        // saturates the negative bound to column/row zero.
        if cx + radius < 0.0 || cy + radius < 0.0 {
            return;
        }

        let x_min = ((cx - radius).floor().max(0.0)) as usize;
        let x_max = ((cx + radius).ceil().min(self.width as f32 - 1.0)) as usize;
        let y_min = ((cy - radius).floor().max(0.0)) as usize;
        let y_max = ((cy + radius).ceil().min(self.height as f32 - 1.0)) as usize;
        if x_min > x_max || y_min > y_max {
            return;
        }

        for y in y_min..=y_max {
            for x in x_min..=x_max {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let distance = (dx * dx + dy * dy).sqrt() + (random_float() - 0.5);
                let falloff = 1.0 - (distance / radius);
                if falloff <= 0.0 {
                    continue;
                }

                let index = y * self.width as usize + x;
                let base = unpack_pixel(self.data[index]);
                self.data[index] = pack_pixel(base + colour * falloff * falloff);
            }
        }
    }

    fn fill_rect(&mut self, cx: f32, cy: f32, half: f32, colour: Color) {
        // Fully off-screen to the left or top: reject before the usize cast
        // saturates the negative bound to column/row zero.
        if cx + half < 0.0 || cy + half < 0.0 {
            return;
        }

        let x_min = ((cx - half).floor().max(0.0)) as usize;
        let x_max = ((cx + half).ceil().min(self.width as f32 - 1.0)) as usize;
        let y_min = ((cy - half).floor().max(0.0)) as usize;
        let y_max = ((cy + half).ceil().min(self.height as f32 - 1.0)) as usize;
        if x_min > x_max || y_min > y_max {
            return;
        }

        let pixel = pack_pixel(colour);
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                self.data[y * self.width as usize + x] = pixel;
            }
        }
    }

    /// Write the framebuffer out as a PNG.
    pub(crate) fn write_png(&self, path: &Path) -> Result<(), String> {
        let mut img = image::RgbaImage::new(self.width as u32, self.height as u32);
        for (i, pixel) in self.data.iter().enumerate() {
            let x = (i % self.width as usize) as u32;
            let y = (i / self.width as usize) as u32;
            img.put_pixel(x, y, image::Rgba(pixel.to_ne_bytes()));
        }
        img.save(path).map_err(|e| e.to_string())
    }
}

//= TESTS ====================================================================
