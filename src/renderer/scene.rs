//! Frame-level orchestration. One `SceneRenderer` owns a polygon batcher, a
//! shape renderer and their shaders, and switches between them on demand so
//! callers can interleave skeletons, textured quads and debug shapes inside
//! a single frame.

use crate::errors::{Error, Result};
use crate::gfx::batcher::PolygonBatcher;
use crate::gfx::context::Context;
use crate::gfx::shader::{self, ShaderProgram};
use crate::gfx::shapes::ShapeRenderer;
use crate::gfx::texture::{Texture, TextureRegion};
use crate::math::Color;

use super::camera::OrthoCamera;
use super::skeleton::{Skeleton, QUAD_TRIANGLES};
use super::skeleton_renderer::SkeletonRenderer;

/// How [`SceneRenderer::resize`] reconciles the camera with a new surface
/// size.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResizeMode {
    /// Keep the camera viewport; content stretches to fill the surface.
    Stretch,
    /// Match the camera viewport to the surface 1:1; content keeps its
    /// size and more (or less) of the world becomes visible.
    Expand,
    /// Scale the camera viewport uniformly so the original viewport stays
    /// fully visible, letterboxing on the longer axis.
    Fit,
}

/// Which sub-renderer currently owns the frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ActiveRenderer {
    None,
    Batcher,
    Shapes,
}

pub struct SceneRenderer {
    context: Context,
    camera: OrthoCamera,
    batcher: PolygonBatcher,
    shapes: ShapeRenderer,
    skeleton_renderer: SkeletonRenderer,
    batcher_shader: ShaderProgram,
    shapes_shader: ShaderProgram,
    active: ActiveRenderer,
    drawing: bool,
    two_color_tint: bool,
    quad: Vec<f32>,
}

impl SceneRenderer {
    pub fn new(context: &Context, width: f32, height: f32, two_color_tint: bool) -> Result<Self> {
        let batcher_shader = if two_color_tint {
            ShaderProgram::two_colored_textured(context)?
        } else {
            ShaderProgram::colored_textured(context)?
        };
        let shapes_shader = ShaderProgram::colored(context)?;

        Ok(SceneRenderer {
            context: context.clone(),
            camera: OrthoCamera::new(width, height),
            batcher: PolygonBatcher::new(context, two_color_tint)?,
            shapes: ShapeRenderer::new(context)?,
            skeleton_renderer: SkeletonRenderer::new(two_color_tint),
            batcher_shader,
            shapes_shader,
            active: ActiveRenderer::None,
            drawing: false,
            two_color_tint,
            quad: Vec::new(),
        })
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrthoCamera {
        &mut self.camera
    }

    /// Draw calls the batcher issued since it was last enabled.
    pub fn batcher_draw_calls(&self) -> u32 {
        self.batcher.draw_calls()
    }

    /// Opens a frame. Everything drawn until [`SceneRenderer::end`] shares
    /// the camera state captured here.
    pub fn begin(&mut self) -> Result<()> {
        if self.drawing {
            return Err(Error::InvalidUsage(
                "SceneRenderer is already drawing, call end() before begin()".into(),
            ));
        }

        self.camera.update();
        self.drawing = true;
        Ok(())
    }

    /// Flushes whichever sub-renderer is active and closes the frame.
    pub fn end(&mut self) -> Result<()> {
        if !self.drawing {
            return Err(Error::InvalidUsage(
                "SceneRenderer.end() without begin()".into(),
            ));
        }

        self.end_active()?;
        self.drawing = false;
        Ok(())
    }

    pub fn draw_skeleton(
        &mut self,
        skeleton: &Skeleton,
        premultiplied_alpha: bool,
        slot_range_start: Option<usize>,
        slot_range_end: Option<usize>,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Batcher)?;
        self.skeleton_renderer.premultiplied_alpha = premultiplied_alpha;
        self.skeleton_renderer
            .draw(&mut self.batcher, skeleton, slot_range_start, slot_range_end)
    }

    /// Draws the whole texture as an axis-aligned quad.
    pub fn draw_texture(
        &mut self,
        texture: &Texture,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        self.draw_texture_uv(texture, x, y, width, height, 0.0, 1.0, 1.0, 0.0, color)
    }

    /// Draws a sub-rectangle of the texture given by normalized coordinates.
    pub fn draw_texture_uv(
        &mut self,
        texture: &Texture,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        u: f32,
        v: f32,
        u2: f32,
        v2: f32,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Batcher)?;
        let color = color.unwrap_or_else(Color::white);

        let positions = [
            x,
            y,
            x + width,
            y,
            x + width,
            y + height,
            x,
            y + height,
        ];
        let uvs = [u, v, u2, v, u2, v2, u, v2];
        self.pack_quad(&positions, &uvs, color);
        self.batcher.draw(texture, &self.quad, &QUAD_TRIANGLES)
    }

    /// Draws the texture rotated by `degrees` around the pivot, which is
    /// given relative to (x, y).
    pub fn draw_texture_rotated(
        &mut self,
        texture: &Texture,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        pivot_x: f32,
        pivot_y: f32,
        degrees: f32,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Batcher)?;
        let color = color.unwrap_or_else(Color::white);

        let origin_x = x + pivot_x;
        let origin_y = y + pivot_y;
        let fx = -pivot_x;
        let fy = -pivot_y;
        let fx2 = width - pivot_x;
        let fy2 = height - pivot_y;

        let corners = [(fx, fy), (fx, fy2), (fx2, fy2), (fx2, fy)];
        let (sin, cos) = degrees.to_radians().sin_cos();

        let mut positions = [0.0f32; 8];
        for (i, &(px, py)) in corners.iter().enumerate() {
            positions[i * 2] = cos * px - sin * py + origin_x;
            positions[i * 2 + 1] = sin * px + cos * py + origin_y;
        }
        let uvs = [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0];
        self.pack_quad(&positions, &uvs, color);
        self.batcher.draw(texture, &self.quad, &QUAD_TRIANGLES)
    }

    pub fn draw_region(
        &mut self,
        region: &TextureRegion,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        let texture = region.texture.clone();
        self.draw_texture_uv(
            &texture, x, y, width, height, region.u, region.v2, region.u2, region.v, color,
        )
    }

    pub fn point(&mut self, x: f32, y: f32, color: Option<Color<f32>>) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes.point(x, y, color)
    }

    pub fn line(&mut self, x: f32, y: f32, x2: f32, y2: f32, color: Option<Color<f32>>) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes.line(x, y, x2, y2, color)
    }

    pub fn triangle(
        &mut self,
        filled: bool,
        x: f32,
        y: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes.triangle(filled, x, y, x2, y2, x3, y3, color)
    }

    pub fn quad(
        &mut self,
        filled: bool,
        x: f32,
        y: f32,
        x2: f32,
        y2: f32,
        x3: f32,
        y3: f32,
        x4: f32,
        y4: f32,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes.quad(filled, x, y, x2, y2, x3, y3, x4, y4, color)
    }

    pub fn rect(
        &mut self,
        filled: bool,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes.rect(filled, x, y, width, height, color)
    }

    pub fn rect_line(
        &mut self,
        filled: bool,
        x: f32,
        y: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes.rect_line(filled, x, y, x2, y2, width, color)
    }

    pub fn polygon(
        &mut self,
        vertices: &[f32],
        offset: usize,
        count: usize,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes.polygon(vertices, offset, count, color)
    }

    pub fn circle(
        &mut self,
        filled: bool,
        x: f32,
        y: f32,
        radius: f32,
        color: Option<Color<f32>>,
        segments: u32,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes.circle(filled, x, y, radius, color, segments)
    }

    pub fn curve(
        &mut self,
        x1: f32,
        y1: f32,
        cx1: f32,
        cy1: f32,
        cx2: f32,
        cy2: f32,
        x2: f32,
        y2: f32,
        segments: u32,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes
            .curve(x1, y1, cx1, cy1, cx2, cy2, x2, y2, segments, color)
    }

    pub fn x(&mut self, x: f32, y: f32, size: f32, color: Option<Color<f32>>) -> Result<()> {
        self.enable(ActiveRenderer::Shapes)?;
        self.shapes.x(x, y, size, color)
    }

    /// Applies a new surface size: sets the device viewport and adjusts
    /// the camera viewport per `mode`.
    pub fn resize(&mut self, mode: ResizeMode, width: u32, height: u32) {
        self.context.set_viewport(0, 0, width, height);

        match mode {
            ResizeMode::Stretch => {}
            ResizeMode::Expand => {
                self.camera.viewport_width = width as f32;
                self.camera.viewport_height = height as f32;
            }
            ResizeMode::Fit => {
                let source_width = width as f32;
                let source_height = height as f32;
                let target_width = self.camera.viewport_width;
                let target_height = self.camera.viewport_height;
                let target_ratio = target_height / target_width;
                let source_ratio = source_height / source_width;
                let scale = if target_ratio < source_ratio {
                    target_width / source_width
                } else {
                    target_height / source_height
                };
                self.camera.viewport_width = source_width * scale;
                self.camera.viewport_height = source_height * scale;
            }
        }

        self.camera.update();
    }

    /// Switches the active sub-renderer, flushing and closing the previous
    /// one. Re-enabling the current renderer is free.
    fn enable(&mut self, target: ActiveRenderer) -> Result<()> {
        if !self.drawing {
            return Err(Error::InvalidUsage(
                "SceneRenderer drawing call outside begin()/end()".into(),
            ));
        }
        if self.active == target {
            return Ok(());
        }

        self.end_active()?;
        match target {
            ActiveRenderer::Batcher => {
                self.batcher_shader.bind();
                self.batcher_shader
                    .set_uniform_mat4(shader::UNIFORM_MVP, self.camera.projection_view())?;
                self.batcher_shader
                    .set_uniform_i32(shader::UNIFORM_TEXTURE, 0)?;
                self.batcher.begin(&self.batcher_shader)?;
            }
            ActiveRenderer::Shapes => {
                self.shapes_shader.bind();
                self.shapes_shader
                    .set_uniform_mat4(shader::UNIFORM_MVP, self.camera.projection_view())?;
                self.shapes.begin(&self.shapes_shader)?;
            }
            ActiveRenderer::None => {}
        }
        self.active = target;
        Ok(())
    }

    fn end_active(&mut self) -> Result<()> {
        match self.active {
            ActiveRenderer::Batcher => self.batcher.end()?,
            ActiveRenderer::Shapes => self.shapes.end()?,
            ActiveRenderer::None => {}
        }
        self.active = ActiveRenderer::None;
        Ok(())
    }

    fn pack_quad(&mut self, positions: &[f32; 8], uvs: &[f32; 8], color: Color<f32>) {
        self.quad.clear();
        for i in 0..4 {
            self.quad.push(positions[i * 2]);
            self.quad.push(positions[i * 2 + 1]);
            self.quad.push(color.r);
            self.quad.push(color.g);
            self.quad.push(color.b);
            self.quad.push(color.a);
            self.quad.push(uvs[i * 2]);
            self.quad.push(uvs[i * 2 + 1]);
            if self.two_color_tint {
                self.quad.push(0.0);
                self.quad.push(0.0);
                self.quad.push(0.0);
                self.quad.push(1.0);
            }
        }
    }
}
