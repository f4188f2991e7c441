//! Immediate-mode debug shape rendering. Vertices accumulate per primitive
//! topology and flush when the topology changes, the buffer fills, or the
//! frame ends.

use crate::errors::{Error, Result};
use crate::math::Color;

use super::context::Context;
use super::device::{BlendFactor, Capability, Primitive};
use super::mesh::{Mesh, VertexAttribute};
use super::shader::ShaderProgram;

const MAX_SHAPE_VERTICES: usize = 10_920;
const VERTEX_SIZE: usize = 6; // x, y, r, g, b, a

/// What kind of primitives the renderer is currently collecting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShapeType {
    Point,
    Line,
    Filled,
}

impl ShapeType {
    fn primitive(self) -> Primitive {
        match self {
            ShapeType::Point => Primitive::Points,
            ShapeType::Line => Primitive::Lines,
            ShapeType::Filled => Primitive::Triangles,
        }
    }
}

/// Draws points, lines and filled polygons in batches keyed by topology.
pub struct ShapeRenderer {
    context: Context,
    mesh: Mesh,
    vertices: Vec<f32>,
    color: Color<f32>,
    shape: ShapeType,
    drawing: bool,
    shader: Option<ShaderProgram>,
    src_color: BlendFactor,
    src_alpha: BlendFactor,
    dst: BlendFactor,
}

impl ShapeRenderer {
    pub fn new(context: &Context) -> Result<Self> {
        let attributes = vec![VertexAttribute::position(), VertexAttribute::color()];
        let mesh = Mesh::new(context, attributes, MAX_SHAPE_VERTICES, 0)?;

        Ok(ShapeRenderer {
            context: context.clone(),
            mesh,
            vertices: Vec::new(),
            color: Color::white(),
            shape: ShapeType::Filled,
            drawing: false,
            shader: None,
            src_color: BlendFactor::SrcAlpha,
            src_alpha: BlendFactor::One,
            dst: BlendFactor::OneMinusSrcAlpha,
        })
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// The color used when a drawing call doesn't pass one of its own.
    pub fn set_color(&mut self, color: Color<f32>) {
        self.color = color;
    }

    pub fn begin(&mut self, shader: &ShaderProgram) -> Result<()> {
        if self.drawing {
            return Err(Error::InvalidUsage(
                "ShapeRenderer is already drawing, call end() before begin()".into(),
            ));
        }

        self.drawing = true;
        self.shader = Some(shader.clone());

        if !self.context.is_lost() {
            let mut device = self.context.device();
            device.set_capability(Capability::Blend, true);
            device.set_blend_function(self.src_color, self.src_alpha, self.dst);
        }

        Ok(())
    }

    /// Same contract as the polygon batcher: only valid inside `begin()`/
    /// `end()`, identical factors are free, a real change flushes first.
    pub fn set_blend_mode(
        &mut self,
        src_color: BlendFactor,
        src_alpha: BlendFactor,
        dst: BlendFactor,
    ) -> Result<()> {
        if !self.drawing {
            return Err(Error::InvalidUsage(
                "ShapeRenderer.set_blend_mode() outside begin()/end()".into(),
            ));
        }

        if self.src_color == src_color && self.src_alpha == src_alpha && self.dst == dst {
            return Ok(());
        }

        self.flush()?;

        self.src_color = src_color;
        self.src_alpha = src_alpha;
        self.dst = dst;

        if !self.context.is_lost() {
            self.context
                .device()
                .set_blend_function(src_color, src_alpha, dst);
        }

        Ok(())
    }

    pub fn point(&mut self, x: f32, y: f32, color: Option<Color<f32>>) -> Result<()> {
        self.check(ShapeType::Point, 1)?;
        let color = color.unwrap_or(self.color);
        self.vertex(x, y, color);
        Ok(())
    }

    pub fn line(&mut self, x: f32, y: f32, x2: f32, y2: f32, color: Option<Color<f32>>) -> Result<()> {
        self.check(ShapeType::Line, 2)?;
        let color = color.unwrap_or(self.color);
        self.vertex(x, y, color);
        self.vertex(x2, y2, color);
        Ok(())
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
        let color = color.unwrap_or(self.color);
        if filled {
            self.check(ShapeType::Filled, 3)?;
            self.vertex(x, y, color);
            self.vertex(x2, y2, color);
            self.vertex(x3, y3, color);
        } else {
            self.check(ShapeType::Line, 6)?;
            self.vertex(x, y, color);
            self.vertex(x2, y2, color);
            self.vertex(x2, y2, color);
            self.vertex(x3, y3, color);
            self.vertex(x3, y3, color);
            self.vertex(x, y, color);
        }
        Ok(())
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
        let color = color.unwrap_or(self.color);
        if filled {
            self.check(ShapeType::Filled, 6)?;
            self.vertex(x, y, color);
            self.vertex(x2, y2, color);
            self.vertex(x3, y3, color);
            self.vertex(x3, y3, color);
            self.vertex(x4, y4, color);
            self.vertex(x, y, color);
        } else {
            self.check(ShapeType::Line, 8)?;
            self.vertex(x, y, color);
            self.vertex(x2, y2, color);
            self.vertex(x2, y2, color);
            self.vertex(x3, y3, color);
            self.vertex(x3, y3, color);
            self.vertex(x4, y4, color);
            self.vertex(x4, y4, color);
            self.vertex(x, y, color);
        }
        Ok(())
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
        self.quad(
            filled,
            x,
            y,
            x + width,
            y,
            x + width,
            y + height,
            x,
            y + height,
            color,
        )
    }

    /// A line of the given thickness, rendered as a quad around the segment.
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
        // Perpendicular of the segment, scaled to half the thickness.
        let (mut tx, mut ty) = (y2 - y, x - x2);
        let len = (tx * tx + ty * ty).sqrt();
        if len != 0.0 {
            tx /= len;
            ty /= len;
        }
        let half = width * 0.5;
        tx *= half;
        ty *= half;

        self.quad(
            filled,
            x + tx,
            y + ty,
            x - tx,
            y - ty,
            x2 - tx,
            y2 - ty,
            x2 + tx,
            y2 + ty,
            color,
        )
    }

    /// An X marker centered at (x, y).
    pub fn x(&mut self, x: f32, y: f32, size: f32, color: Option<Color<f32>>) -> Result<()> {
        self.line(x - size, y - size, x + size, y + size, color)?;
        self.line(x - size, y + size, x + size, y - size, color)
    }

    /// Outlines a closed polygon. `vertices` holds (x, y) pairs; `offset`
    /// and `count` are in points.
    pub fn polygon(
        &mut self,
        vertices: &[f32],
        offset: usize,
        count: usize,
        color: Option<Color<f32>>,
    ) -> Result<()> {
        if count < 3 {
            return Err(Error::InvalidArgument(format!(
                "a polygon needs at least 3 points, got {}",
                count
            )));
        }
        if (offset + count) * 2 > vertices.len() {
            return Err(Error::InvalidArgument(format!(
                "polygon range {}..{} exceeds {} supplied points",
                offset,
                offset + count,
                vertices.len() / 2
            )));
        }

        self.check(ShapeType::Line, count * 2)?;
        let color = color.unwrap_or(self.color);

        for i in 0..count {
            let a = (offset + i) * 2;
            let b = (offset + (i + 1) % count) * 2;
            self.vertex(vertices[a], vertices[a + 1], color);
            self.vertex(vertices[b], vertices[b + 1], color);
        }
        Ok(())
    }

    /// A circle approximated by line segments or a triangle fan. Passing
    /// zero segments picks a count proportional to the cube root of the
    /// radius.
    pub fn circle(
        &mut self,
        filled: bool,
        x: f32,
        y: f32,
        radius: f32,
        color: Option<Color<f32>>,
        segments: u32,
    ) -> Result<()> {
        let mut segments = segments;
        if segments == 0 {
            segments = 1.max((6.0 * radius.cbrt()) as u32);
        }

        let color = color.unwrap_or(self.color);
        let angle = 2.0 * ::std::f32::consts::PI / segments as f32;
        let (sin, cos) = angle.sin_cos();
        let mut cx = radius;
        let mut cy = 0.0f32;

        if !filled {
            self.check(ShapeType::Line, segments as usize * 2)?;
            for _ in 0..segments {
                self.vertex(x + cx, y + cy, color);
                let temp = cx;
                cx = cos * cx - sin * cy;
                cy = sin * temp + cos * cy;
                self.vertex(x + cx, y + cy, color);
            }
        } else {
            self.check(ShapeType::Filled, segments as usize * 3)?;
            for _ in 0..segments - 1 {
                self.vertex(x, y, color);
                self.vertex(x + cx, y + cy, color);
                let temp = cx;
                cx = cos * cx - sin * cy;
                cy = sin * temp + cos * cy;
                self.vertex(x + cx, y + cy, color);
            }
            // Close the fan back onto the starting point.
            self.vertex(x, y, color);
            self.vertex(x + cx, y + cy, color);
            self.vertex(x + radius, y, color);
        }
        Ok(())
    }

    /// A cubic Bézier polyline evaluated by forward differencing.
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
        if segments == 0 {
            return Err(Error::InvalidArgument(
                "a curve needs at least one segment".into(),
            ));
        }

        self.check(ShapeType::Line, segments as usize * 2 + 2)?;
        let color = color.unwrap_or(self.color);

        let step = 1.0 / segments as f32;
        let step2 = step * step;
        let step3 = step2 * step;

        let pre1 = 3.0 * step;
        let pre2 = 3.0 * step2;
        let pre4 = 6.0 * step2;
        let pre5 = 6.0 * step3;

        let tmp1x = x1 - cx1 * 2.0 + cx2;
        let tmp1y = y1 - cy1 * 2.0 + cy2;
        let tmp2x = (cx1 - cx2) * 3.0 - x1 + x2;
        let tmp2y = (cy1 - cy2) * 3.0 - y1 + y2;

        let mut fx = x1;
        let mut fy = y1;
        let mut dfx = (cx1 - x1) * pre1 + tmp1x * pre2 + tmp2x * step3;
        let mut dfy = (cy1 - y1) * pre1 + tmp1y * pre2 + tmp2y * step3;
        let mut ddfx = tmp1x * pre4 + tmp2x * pre5;
        let mut ddfy = tmp1y * pre4 + tmp2y * pre5;
        let dddfx = tmp2x * pre5;
        let dddfy = tmp2y * pre5;

        for _ in 0..segments {
            self.vertex(fx, fy, color);
            fx += dfx;
            fy += dfy;
            dfx += ddfx;
            dfy += ddfy;
            ddfx += dddfx;
            ddfy += dddfy;
            self.vertex(fx, fy, color);
        }
        self.vertex(fx, fy, color);
        self.vertex(x2, y2, color);
        Ok(())
    }

    pub fn end(&mut self) -> Result<()> {
        if !self.drawing {
            return Err(Error::InvalidUsage(
                "ShapeRenderer.end() without begin()".into(),
            ));
        }

        self.flush()?;
        self.drawing = false;
        self.shader = None;

        if !self.context.is_lost() {
            self.context
                .device()
                .set_capability(Capability::Blend, false);
        }

        Ok(())
    }

    /// Ensures the renderer is mid-frame, collecting `shape` primitives,
    /// with room for `num_vertices` more vertices.
    fn check(&mut self, shape: ShapeType, num_vertices: usize) -> Result<()> {
        if !self.drawing {
            return Err(Error::InvalidUsage(
                "ShapeRenderer drawing call outside begin()/end()".into(),
            ));
        }

        if self.shape == shape {
            if MAX_SHAPE_VERTICES - self.vertices.len() / VERTEX_SIZE < num_vertices {
                self.flush()?;
            }
        } else {
            self.flush()?;
            self.shape = shape;
        }
        Ok(())
    }

    fn vertex(&mut self, x: f32, y: f32, color: Color<f32>) {
        self.vertices.push(x);
        self.vertices.push(y);
        self.vertices.push(color.r);
        self.vertices.push(color.g);
        self.vertices.push(color.b);
        self.vertices.push(color.a);
    }

    fn flush(&mut self) -> Result<()> {
        if self.vertices.is_empty() {
            return Ok(());
        }

        self.mesh.set_vertices(&self.vertices)?;
        if let Some(shader) = self.shader.clone() {
            self.mesh.draw(&shader, self.shape.primitive())?;
        }
        self.vertices.clear();
        Ok(())
    }
}
