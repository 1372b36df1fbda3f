use std::f64::consts::TAU;

use anyhow::{anyhow, Result};
use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::{FrameStatus, RenderSurface};
use crate::camera::camera_params;
use crate::error::PresentError;
use crate::scene::{Camera, Entity, Geometry, SceneGraph};

/// Lightweight surface for WebAssembly builds: projects every entity onto a
/// 2D canvas as a flat disc, ring or square.
pub struct Renderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    size: (u32, u32),
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|err| anyhow!("failed to query canvas context: {err:?}"))?
            .ok_or_else(|| anyhow!("canvas does not support 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| anyhow!("failed to cast canvas context"))?;

        let size = (canvas.width().max(1), canvas.height().max(1));
        Ok(Self {
            canvas,
            context,
            size,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    fn draw(&self, scene: &SceneGraph, camera: &Camera) -> Result<(), JsValue> {
        let (width, height) = (self.size.0 as f64, self.size.1 as f64);
        self.context.set_fill_style_str("#000000");
        self.context.fill_rect(0.0, 0.0, width, height);

        let view_proj = camera_params(camera).view_proj;
        let focal = height / 2.0 / (camera.fov.to_radians() as f64 / 2.0).tan();

        // grids span the whole view, so they go down first as a floor
        for entity in scene.entities() {
            if let Geometry::Grid { size, divisions } = entity.geometry {
                self.draw_grid(entity, size, divisions.max(1), view_proj, camera.near)?;
            }
        }

        let mut visible: Vec<(f32, &Entity, f64, f64, f64)> = scene
            .entities()
            .iter()
            .filter(|entity| !matches!(entity.geometry, Geometry::Grid { .. }))
            .filter_map(|entity| {
                let clip = view_proj * entity.transform.position.extend(1.0);
                if clip.w <= camera.near {
                    return None;
                }
                let (x, y) = self.to_screen(clip);
                let radius = bounding_radius(&entity.geometry) as f64 * focal / clip.w as f64;
                Some((clip.w, entity, x, y, radius.max(0.5)))
            })
            .collect();
        // painter's order: farthest first
        visible.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, entity, x, y, radius) in visible {
            let color = css_color(entity.material.color);
            match entity.geometry {
                Geometry::Torus { radius: ring, tube, .. } => {
                    let scale = radius / (ring + tube) as f64;
                    let tilt = entity.transform.rotation.x.cos().abs() as f64;
                    self.context.set_stroke_style_str(&color);
                    self.context.set_line_width((tube as f64 * 2.0 * scale).max(1.0));
                    self.context.begin_path();
                    self.context.ellipse(
                        x,
                        y,
                        ring as f64 * scale,
                        (ring as f64 * scale * tilt).max(1.0),
                        entity.transform.rotation.z as f64,
                        0.0,
                        TAU,
                    )?;
                    self.context.stroke();
                }
                Geometry::Sphere { .. } => {
                    self.context.set_fill_style_str(&color);
                    self.context.begin_path();
                    self.context.arc(x, y, radius, 0.0, TAU)?;
                    self.context.fill();
                }
                Geometry::Cuboid { .. } => {
                    self.context.set_fill_style_str(&color);
                    let half = radius / 2f64.sqrt();
                    self.context.fill_rect(x - half, y - half, half * 2.0, half * 2.0);
                }
                Geometry::Grid { .. } => {}
            }
        }
        Ok(())
    }

    fn draw_grid(
        &self,
        entity: &Entity,
        size: f32,
        divisions: u32,
        view_proj: Mat4,
        near: f32,
    ) -> Result<(), JsValue> {
        let to_clip = view_proj * entity.transform.matrix();
        let half = size / 2.0;
        let step = size / divisions as f32;

        self.context.set_stroke_style_str(&css_color(entity.material.color));
        self.context.set_line_width(1.0);
        self.context.begin_path();
        for i in 0..=divisions {
            let offset = -half + i as f32 * step;
            for (start, end) in [
                (Vec3::new(offset, 0.0, -half), Vec3::new(offset, 0.0, half)),
                (Vec3::new(-half, 0.0, offset), Vec3::new(half, 0.0, offset)),
            ] {
                let start = to_clip * start.extend(1.0);
                let end = to_clip * end.extend(1.0);
                if let Some((start, end)) = clip_to_near(start, end, near) {
                    let (x0, y0) = self.to_screen(start);
                    let (x1, y1) = self.to_screen(end);
                    self.context.move_to(x0, y0);
                    self.context.line_to(x1, y1);
                }
            }
        }
        self.context.stroke();
        Ok(())
    }

    fn to_screen(&self, clip: Vec4) -> (f64, f64) {
        let ndc = clip.xyz() / clip.w;
        (
            (ndc.x as f64 + 1.0) * 0.5 * self.size.0 as f64,
            (1.0 - ndc.y as f64) * 0.5 * self.size.1 as f64,
        )
    }
}

/// Trims a clip-space segment to the part in front of the near plane.
fn clip_to_near(start: Vec4, end: Vec4, near: f32) -> Option<(Vec4, Vec4)> {
    match (start.w > near, end.w > near) {
        (true, true) => Some((start, end)),
        (false, false) => None,
        (start_in, _) => {
            let t = (near - start.w) / (end.w - start.w);
            let cut = start.lerp(end, t);
            if start_in {
                Some((start, cut))
            } else {
                Some((cut, end))
            }
        }
    }
}

impl RenderSurface for Renderer {
    fn configure_surface(&mut self, pixel_density: f64, width: u32, height: u32) {
        let width = ((width as f64) * pixel_density).round() as u32;
        let height = ((height as f64) * pixel_density).round() as u32;
        if width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn present(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
    ) -> Result<FrameStatus, PresentError> {
        self.draw(scene, camera).map_err(|err| {
            PresentError::new(
                err.as_string()
                    .unwrap_or_else(|| "unknown canvas error".to_string()),
            )
        })?;
        Ok(FrameStatus::Presented)
    }
}

fn bounding_radius(geometry: &Geometry) -> f32 {
    match *geometry {
        Geometry::Torus { radius, tube, .. } => radius + tube,
        Geometry::Sphere { radius, .. } => radius,
        Geometry::Cuboid {
            width,
            height,
            depth,
        } => Vec3::new(width, height, depth).length() / 2.0,
        Geometry::Grid { size, .. } => size * std::f32::consts::FRAC_1_SQRT_2,
    }
}

fn css_color(color: Vec3) -> String {
    let [r, g, b] = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0)
        .round()
        .to_array();
    format!("rgb({r}, {g}, {b})")
}
