//! Fixed-capacity geometry buffers with a CPU-side mirror. Writes land in
//! retained arrays and are uploaded lazily on draw, so repeated writes
//! between draws cost one upload, and a restored context can be refilled
//! from the mirror.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::errors::{Error, Result};

use super::context::{Context, Restorable};
use super::device::{BufferId, Device, Primitive};
use super::shader::{self, ShaderProgram};

/// One named, interleaved vertex attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    pub name: &'static str,
    pub elements: u32,
}

impl VertexAttribute {
    pub fn position() -> Self {
        VertexAttribute {
            name: shader::ATTR_POSITION,
            elements: 2,
        }
    }

    pub fn color() -> Self {
        VertexAttribute {
            name: shader::ATTR_COLOR,
            elements: 4,
        }
    }

    pub fn color2() -> Self {
        VertexAttribute {
            name: shader::ATTR_COLOR2,
            elements: 4,
        }
    }

    pub fn tex_coords() -> Self {
        VertexAttribute {
            name: shader::ATTR_TEXCOORDS,
            elements: 2,
        }
    }
}

struct MeshInner {
    context: Context,
    attributes: Vec<VertexAttribute>,
    elements_per_vertex: u32,

    vertices: Vec<f32>,
    indices: Vec<u16>,
    max_vertices: usize,
    max_indices: usize,

    vertex_buffer: Option<BufferId>,
    index_buffer: Option<BufferId>,
    dirty_vertices: bool,
    dirty_indices: bool,
}

impl Restorable for MeshInner {
    fn restore(&mut self, _device: &mut dyn Device) -> Result<()> {
        // The old buffers died with the lost context. The retained arrays
        // are re-uploaded lazily on the next draw.
        self.vertex_buffer = None;
        self.index_buffer = None;
        self.dirty_vertices = true;
        self.dirty_indices = true;
        Ok(())
    }
}

impl Drop for MeshInner {
    fn drop(&mut self) {
        if self.context.is_lost() {
            return;
        }

        let mut device = self.context.device();
        if let Some(id) = self.vertex_buffer.take() {
            device.delete_buffer(id);
        }
        if let Some(id) = self.index_buffer.take() {
            device.delete_buffer(id);
        }
    }
}

/// An indexed (or unindexed) triangle/line/point mesh with fixed capacity.
pub struct Mesh {
    inner: Rc<RefCell<MeshInner>>,
}

impl Mesh {
    /// Creates a mesh able to hold up to `max_vertices` vertices and
    /// `max_indices` indices, laid out by `attributes` in order.
    pub fn new(
        context: &Context,
        attributes: Vec<VertexAttribute>,
        max_vertices: usize,
        max_indices: usize,
    ) -> Result<Self> {
        if attributes.is_empty() {
            return Err(Error::InvalidArgument(
                "a mesh needs at least one vertex attribute".into(),
            ));
        }

        let elements_per_vertex = attributes.iter().map(|v| v.elements).sum();
        let inner = Rc::new(RefCell::new(MeshInner {
            context: context.clone(),
            attributes,
            elements_per_vertex,
            vertices: Vec::with_capacity(max_vertices * elements_per_vertex as usize),
            indices: Vec::with_capacity(max_indices),
            max_vertices,
            max_indices,
            vertex_buffer: None,
            index_buffer: None,
            dirty_vertices: false,
            dirty_indices: false,
        }));

        let handle: Rc<RefCell<dyn Restorable>> = inner.clone();
        context.register(Rc::downgrade(&handle));
        Ok(Mesh { inner })
    }

    pub fn max_vertices(&self) -> usize {
        self.inner.borrow().max_vertices
    }

    pub fn max_indices(&self) -> usize {
        self.inner.borrow().max_indices
    }

    /// Number of vertices currently written, in whole vertices.
    pub fn num_vertices(&self) -> usize {
        let inner = self.inner.borrow();
        inner.vertices.len() / inner.elements_per_vertex as usize
    }

    pub fn num_indices(&self) -> usize {
        self.inner.borrow().indices.len()
    }

    /// Replaces the vertex data. Rejected wholesale, leaving the previous
    /// contents untouched, when `data` holds more vertices than the mesh
    /// was sized for.
    pub fn set_vertices(&mut self, data: &[f32]) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        let capacity = inner.max_vertices * inner.elements_per_vertex as usize;
        if data.len() > capacity {
            return Err(Error::CapacityExceeded(format!(
                "mesh holds {} vertex floats at most, got {}",
                capacity,
                data.len()
            )));
        }

        inner.vertices.clear();
        inner.vertices.extend_from_slice(data);
        inner.dirty_vertices = true;
        Ok(())
    }

    /// Replaces the index data, with the same all-or-nothing capacity rule
    /// as [`Mesh::set_vertices`].
    pub fn set_indices(&mut self, data: &[u16]) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if data.len() > inner.max_indices {
            return Err(Error::CapacityExceeded(format!(
                "mesh holds {} indices at most, got {}",
                inner.max_indices,
                data.len()
            )));
        }

        inner.indices.clear();
        inner.indices.extend_from_slice(data);
        inner.dirty_indices = true;
        Ok(())
    }

    /// Draws everything currently in the mesh: all indices when any are
    /// set, all vertices otherwise.
    pub fn draw(&mut self, shader: &ShaderProgram, primitive: Primitive) -> Result<()> {
        let count = {
            let inner = self.inner.borrow();
            if inner.indices.is_empty() {
                inner.vertices.len() as u32 / inner.elements_per_vertex
            } else {
                inner.indices.len() as u32
            }
        };
        self.draw_with_offset(shader, primitive, 0, count)
    }

    /// Uploads any dirty data, binds the attribute layout against `shader`
    /// and issues the draw. A no-op while the context is lost.
    pub fn draw_with_offset(
        &mut self,
        shader: &ShaderProgram,
        primitive: Primitive,
        offset: u32,
        count: u32,
    ) -> Result<()> {
        if self.inner.borrow().context.is_lost() {
            return Ok(());
        }

        // Resolve attribute locations before taking the device, since the
        // lookup borrows it through the shader.
        let locations: SmallVec<[(u32, u32, u32); 4]> = {
            let inner = self.inner.borrow();
            let mut v = SmallVec::new();
            let mut element_offset = 0;
            for attr in &inner.attributes {
                let location = shader.attribute_location(attr.name)?;
                v.push((location, attr.elements, element_offset));
                element_offset += attr.elements;
            }
            v
        };

        let mut inner = self.inner.borrow_mut();
        let inner = &mut *inner;
        let context = inner.context.clone();
        let mut device = context.device();
        let device = &mut **device;

        if inner.vertex_buffer.is_none() {
            inner.vertex_buffer = Some(device.create_buffer()?);
            inner.dirty_vertices = true;
        }
        if inner.index_buffer.is_none() && !inner.indices.is_empty() {
            inner.index_buffer = Some(device.create_buffer()?);
            inner.dirty_indices = true;
        }

        if inner.dirty_vertices {
            if let Some(id) = inner.vertex_buffer {
                device.upload_vertices(id, &inner.vertices)?;
            }
            inner.dirty_vertices = false;
        }
        if inner.dirty_indices {
            if let Some(id) = inner.index_buffer {
                device.upload_indices(id, &inner.indices)?;
            }
            inner.dirty_indices = false;
        }

        device.bind_vertex_buffer(inner.vertex_buffer);
        let stride = inner.elements_per_vertex * 4;
        for &(location, elements, element_offset) in &locations {
            device.enable_attribute(location, elements, stride, element_offset * 4);
        }

        if inner.indices.is_empty() {
            device.draw_arrays(primitive, offset, count)?;
        } else {
            device.bind_index_buffer(inner.index_buffer);
            device.draw_elements(primitive, count, offset)?;
        }

        for &(location, _, _) in &locations {
            device.disable_attribute(location);
        }
        device.bind_vertex_buffer(None);
        device.bind_index_buffer(None);

        Ok(())
    }
}
