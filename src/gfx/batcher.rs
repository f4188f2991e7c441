//! Batches textured triangle geometry into as few draw calls as possible.
//! Geometry accumulates CPU-side and is flushed to the device only when it
//! has to be: the bound texture changes, the blend function changes, the
//! buffer runs out of room, or the frame ends.

use crate::errors::{Error, Result};

use super::context::Context;
use super::device::{BlendFactor, Capability, Primitive};
use super::mesh::{Mesh, VertexAttribute};
use super::shader::ShaderProgram;
use super::texture::Texture;

/// Largest batch the 16-bit index buffer can address: three indices per
/// triangle keeps the index count within `u16`.
pub const MAX_BATCH_TRIANGLES: usize = 10_920;

/// Accumulates textured triangles and defers draw calls until a state
/// change forces one.
pub struct PolygonBatcher {
    context: Context,
    mesh: Mesh,
    vertex_size: usize,
    max_vertices: usize,
    max_indices: usize,

    vertices: Vec<f32>,
    indices: Vec<u16>,

    drawing: bool,
    shader: Option<ShaderProgram>,
    last_texture: Option<Texture>,
    src_color: BlendFactor,
    src_alpha: BlendFactor,
    dst: BlendFactor,
    draw_calls: u32,
    restore_cull: bool,
}

impl PolygonBatcher {
    /// A batcher sized to [`MAX_BATCH_TRIANGLES`]. With `two_color` the
    /// vertex layout carries a second color channel for dark tinting.
    pub fn new(context: &Context, two_color: bool) -> Result<Self> {
        PolygonBatcher::with_capacity(context, two_color, MAX_BATCH_TRIANGLES)
    }

    pub fn with_capacity(
        context: &Context,
        two_color: bool,
        max_triangles: usize,
    ) -> Result<Self> {
        if max_triangles == 0 || max_triangles > MAX_BATCH_TRIANGLES {
            return Err(Error::InvalidArgument(format!(
                "batch capacity must be within 1..={} triangles, got {}",
                MAX_BATCH_TRIANGLES, max_triangles
            )));
        }

        let attributes = if two_color {
            vec![
                VertexAttribute::position(),
                VertexAttribute::color(),
                VertexAttribute::tex_coords(),
                VertexAttribute::color2(),
            ]
        } else {
            vec![
                VertexAttribute::position(),
                VertexAttribute::color(),
                VertexAttribute::tex_coords(),
            ]
        };
        let vertex_size = attributes.iter().map(|v| v.elements as usize).sum();

        let max_vertices = max_triangles * 3;
        let max_indices = max_triangles * 3;
        let mesh = Mesh::new(context, attributes, max_vertices, max_indices)?;

        Ok(PolygonBatcher {
            context: context.clone(),
            mesh,
            vertex_size,
            max_vertices,
            max_indices,
            vertices: Vec::new(),
            indices: Vec::new(),
            drawing: false,
            shader: None,
            last_texture: None,
            src_color: BlendFactor::SrcAlpha,
            src_alpha: BlendFactor::One,
            dst: BlendFactor::OneMinusSrcAlpha,
            draw_calls: 0,
            restore_cull: false,
        })
    }

    /// Number of device draw calls issued since the last `begin`.
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// Starts a batch. Enables blending with the current blend function,
    /// and turns face culling off for the duration if it was on.
    pub fn begin(&mut self, shader: &ShaderProgram) -> Result<()> {
        if self.drawing {
            return Err(Error::InvalidUsage(
                "PolygonBatcher is already drawing, call end() before begin()".into(),
            ));
        }

        self.drawing = true;
        self.draw_calls = 0;
        self.shader = Some(shader.clone());
        self.last_texture = None;

        if !self.context.is_lost() {
            let mut device = self.context.device();
            self.restore_cull = device.capability(Capability::CullFace);
            if self.restore_cull {
                device.set_capability(Capability::CullFace, false);
            }
            device.set_capability(Capability::Blend, true);
            device.set_blend_function(self.src_color, self.src_alpha, self.dst);
        }

        Ok(())
    }

    /// Appends a textured triangle list to the batch. `vertices` are
    /// interleaved per the batcher's layout; `indices` address them
    /// locally, starting at zero.
    pub fn draw(&mut self, texture: &Texture, vertices: &[f32], indices: &[u16]) -> Result<()> {
        if !self.drawing {
            return Err(Error::InvalidUsage(
                "PolygonBatcher.draw() outside begin()/end()".into(),
            ));
        }

        if vertices.len() > self.max_vertices * self.vertex_size
            || indices.len() > self.max_indices
        {
            return Err(Error::CapacityExceeded(format!(
                "a single draw of {} vertex floats / {} indices can never fit a batch of {} triangles",
                vertices.len(),
                indices.len(),
                self.max_indices / 3
            )));
        }

        let switched = match self.last_texture {
            Some(ref last) => last != texture,
            None => true,
        };
        if switched {
            self.flush()?;
            self.last_texture = Some(texture.clone());
        } else if self.vertices.len() + vertices.len() > self.max_vertices * self.vertex_size
            || self.indices.len() + indices.len() > self.max_indices
        {
            self.flush()?;
        }

        let index_start = (self.vertices.len() / self.vertex_size) as u16;
        self.indices.extend(indices.iter().map(|i| i + index_start));
        self.vertices.extend_from_slice(vertices);
        Ok(())
    }

    /// Changes the blend function. Only valid inside `begin()`/`end()`.
    /// Identical factors are a no-op; otherwise the pending batch is flushed
    /// first so it still renders with the factors it was queued under.
    pub fn set_blend_mode(
        &mut self,
        src_color: BlendFactor,
        src_alpha: BlendFactor,
        dst: BlendFactor,
    ) -> Result<()> {
        if !self.drawing {
            return Err(Error::InvalidUsage(
                "PolygonBatcher.set_blend_mode() outside begin()/end()".into(),
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

    /// Issues a draw call for everything queued so far. Empty batches cost
    /// nothing.
    fn flush(&mut self) -> Result<()> {
        if self.vertices.is_empty() {
            return Ok(());
        }

        if let Some(ref texture) = self.last_texture {
            texture.bind(0);
        }

        self.mesh.set_vertices(&self.vertices)?;
        self.mesh.set_indices(&self.indices)?;
        if let Some(shader) = self.shader.clone() {
            self.mesh.draw(&shader, Primitive::Triangles)?;
        }

        self.vertices.clear();
        self.indices.clear();
        self.draw_calls += 1;
        Ok(())
    }

    /// Flushes any pending geometry and closes the batch, restoring the
    /// face-culling state `begin` found.
    pub fn end(&mut self) -> Result<()> {
        if !self.drawing {
            return Err(Error::InvalidUsage(
                "PolygonBatcher.end() without begin()".into(),
            ));
        }

        self.flush()?;
        self.drawing = false;
        self.shader = None;
        self.last_texture = None;

        if !self.context.is_lost() {
            let mut device = self.context.device();
            device.set_capability(Capability::Blend, false);
            if self.restore_cull {
                device.set_capability(Capability::CullFace, true);
            }
        }

        Ok(())
    }
}
