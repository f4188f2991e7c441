//! Abstraction over the underlying graphics device. All GPU side-effects in
//! the crate go through the [`Device`] trait, so the whole engine can run
//! against the real GL backend or the headless recording backend used in
//! tests.

pub mod gl;
pub mod headless;

pub use self::gl::GlDevice;
pub use self::headless::{DeviceEvent, DeviceEvents, HeadlessDevice};

use crate::errors::Result;
use crate::gfx::texture::{TextureFilter, TextureWrap};
use crate::math::Color;

/// Handle of a GPU vertex or index buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) u32);

/// Handle of a linked GPU shader program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ProgramId(pub(crate) u32);

/// Handle of a GPU texture object.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(pub(crate) u32);

/// Resolved location of a uniform within a linked program. Locations are
/// only meaningful for the program they were resolved against, and become
/// stale when the program is rebuilt after a context loss.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub(crate) i32);

/// Primitive topology for draw calls.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    Triangles,
}

/// Blend factors accepted by [`Device::set_blend_function`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

/// Pipeline capabilities that can be toggled and queried.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    Blend,
    CullFace,
}

/// A value bound to a uniform location.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
    Vector4f([f32; 4]),
    Matrix4f([[f32; 4]; 4]),
}

/// The device every GPU resource talks to. Buffer offsets are expressed in
/// elements (f32 for vertices, u16 for indices), not bytes; backends do
/// their own byte arithmetic.
pub trait Device {
    fn create_buffer(&mut self) -> Result<BufferId>;
    fn delete_buffer(&mut self, id: BufferId);
    fn upload_vertices(&mut self, id: BufferId, data: &[f32]) -> Result<()>;
    fn upload_indices(&mut self, id: BufferId, data: &[u16]) -> Result<()>;
    fn bind_vertex_buffer(&mut self, id: Option<BufferId>);
    fn bind_index_buffer(&mut self, id: Option<BufferId>);

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
        filter: TextureFilter,
        wrap: TextureWrap,
    ) -> Result<TextureId>;
    fn delete_texture(&mut self, id: TextureId);
    fn bind_texture(&mut self, unit: u32, id: Option<TextureId>);

    fn create_program(&mut self, vs: &str, fs: &str) -> Result<ProgramId>;
    fn delete_program(&mut self, id: ProgramId);
    fn bind_program(&mut self, id: Option<ProgramId>);
    fn uniform_location(&mut self, id: ProgramId, name: &str) -> Option<UniformLocation>;
    fn attribute_location(&mut self, id: ProgramId, name: &str) -> Option<u32>;
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<()>;

    /// Points `location` at consecutive `elements`-wide f32 groups in the
    /// currently bound vertex buffer. `stride` and `offset` are in bytes.
    fn enable_attribute(&mut self, location: u32, elements: u32, stride: u32, offset: u32);
    fn disable_attribute(&mut self, location: u32);

    fn set_capability(&mut self, cap: Capability, enabled: bool);
    fn capability(&self, cap: Capability) -> bool;

    /// `blendFuncSeparate` with a shared destination factor for color and
    /// alpha, which is the shape every batching blend mode takes.
    fn set_blend_function(&mut self, src_color: BlendFactor, src_alpha: BlendFactor, dst: BlendFactor);

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);
    fn clear(&mut self, color: Color<f32>);

    /// Draws `count` indices from the bound index buffer starting at index
    /// `offset`.
    fn draw_elements(&mut self, primitive: Primitive, count: u32, offset: u32) -> Result<()>;
    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()>;
}
