//! A headless [`Device`] that records every command instead of touching a
//! GPU. Tests assert against the recorded event stream.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::Result;
use crate::gfx::texture::{TextureFilter, TextureWrap};
use crate::math::Color;

use super::{
    BlendFactor, BufferId, Capability, Device, Primitive, ProgramId, TextureId, UniformLocation,
    UniformValue,
};

/// One recorded device command. Only the fields tests care about are kept.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    CreateBuffer(BufferId),
    DeleteBuffer(BufferId),
    UploadVertices(BufferId, Vec<f32>),
    UploadIndices(BufferId, Vec<u16>),
    BindVertexBuffer(Option<BufferId>),
    BindIndexBuffer(Option<BufferId>),
    CreateTexture(TextureId),
    DeleteTexture(TextureId),
    BindTexture(u32, Option<TextureId>),
    CreateProgram(ProgramId),
    DeleteProgram(ProgramId),
    BindProgram(Option<ProgramId>),
    SetUniform(UniformLocation, UniformValue),
    EnableAttribute(u32),
    DisableAttribute(u32),
    SetCapability(Capability, bool),
    SetBlendFunction(BlendFactor, BlendFactor, BlendFactor),
    SetViewport(i32, i32, u32, u32),
    Clear,
    DrawElements(Primitive, u32, u32),
    DrawArrays(Primitive, u32, u32),
}

/// Shared handle onto the recorded command stream.
pub type DeviceEvents = Rc<RefCell<Vec<DeviceEvent>>>;

struct ProgramRecord {
    sources: String,
    locations: HashMap<String, i32>,
}

/// [`Device`] implementation with no GPU behind it.
///
/// Handles are fabricated from monotonic counters. Uniform and attribute
/// lookups resolve against the shader source text: a name is found when it
/// occurs in the program's GLSL, which makes the built-in programs behave
/// the same way they do on a live context.
pub struct HeadlessDevice {
    events: DeviceEvents,
    next_id: u32,
    programs: HashMap<ProgramId, ProgramRecord>,
    capabilities: HashMap<Capability, bool>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        HeadlessDevice {
            events: Rc::new(RefCell::new(Vec::new())),
            next_id: 1,
            programs: HashMap::new(),
            capabilities: HashMap::new(),
        }
    }

    pub fn events(&self) -> DeviceEvents {
        self.events.clone()
    }

    fn record(&self, event: DeviceEvent) {
        self.events.borrow_mut().push(event);
    }

    fn fabricate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        HeadlessDevice::new()
    }
}

impl Device for HeadlessDevice {
    fn create_buffer(&mut self) -> Result<BufferId> {
        let id = BufferId(self.fabricate());
        self.record(DeviceEvent::CreateBuffer(id));
        Ok(id)
    }

    fn delete_buffer(&mut self, id: BufferId) {
        self.record(DeviceEvent::DeleteBuffer(id));
    }

    fn upload_vertices(&mut self, id: BufferId, data: &[f32]) -> Result<()> {
        self.record(DeviceEvent::UploadVertices(id, data.to_vec()));
        Ok(())
    }

    fn upload_indices(&mut self, id: BufferId, data: &[u16]) -> Result<()> {
        self.record(DeviceEvent::UploadIndices(id, data.to_vec()));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, id: Option<BufferId>) {
        self.record(DeviceEvent::BindVertexBuffer(id));
    }

    fn bind_index_buffer(&mut self, id: Option<BufferId>) {
        self.record(DeviceEvent::BindIndexBuffer(id));
    }

    fn create_texture(
        &mut self,
        _width: u32,
        _height: u32,
        _pixels: &[u8],
        _filter: TextureFilter,
        _wrap: TextureWrap,
    ) -> Result<TextureId> {
        let id = TextureId(self.fabricate());
        self.record(DeviceEvent::CreateTexture(id));
        Ok(id)
    }

    fn delete_texture(&mut self, id: TextureId) {
        self.record(DeviceEvent::DeleteTexture(id));
    }

    fn bind_texture(&mut self, unit: u32, id: Option<TextureId>) {
        self.record(DeviceEvent::BindTexture(unit, id));
    }

    fn create_program(&mut self, vs: &str, fs: &str) -> Result<ProgramId> {
        let id = ProgramId(self.fabricate());
        self.programs.insert(
            id,
            ProgramRecord {
                sources: format!("{}\n{}", vs, fs),
                locations: HashMap::new(),
            },
        );
        self.record(DeviceEvent::CreateProgram(id));
        Ok(id)
    }

    fn delete_program(&mut self, id: ProgramId) {
        self.programs.remove(&id);
        self.record(DeviceEvent::DeleteProgram(id));
    }

    fn bind_program(&mut self, id: Option<ProgramId>) {
        self.record(DeviceEvent::BindProgram(id));
    }

    fn uniform_location(&mut self, id: ProgramId, name: &str) -> Option<UniformLocation> {
        let record = self.programs.get_mut(&id)?;
        if !record.sources.contains(name) {
            return None;
        }

        let next = record.locations.len() as i32;
        let location = *record
            .locations
            .entry(name.to_string())
            .or_insert(next);
        Some(UniformLocation(location))
    }

    fn attribute_location(&mut self, id: ProgramId, name: &str) -> Option<u32> {
        self.uniform_location(id, name).map(|v| v.0 as u32)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<()> {
        self.record(DeviceEvent::SetUniform(location, value));
        Ok(())
    }

    fn enable_attribute(&mut self, location: u32, _elements: u32, _stride: u32, _offset: u32) {
        self.record(DeviceEvent::EnableAttribute(location));
    }

    fn disable_attribute(&mut self, location: u32) {
        self.record(DeviceEvent::DisableAttribute(location));
    }

    fn set_capability(&mut self, cap: Capability, enabled: bool) {
        self.capabilities.insert(cap, enabled);
        self.record(DeviceEvent::SetCapability(cap, enabled));
    }

    fn capability(&self, cap: Capability) -> bool {
        self.capabilities.get(&cap).cloned().unwrap_or(false)
    }

    fn set_blend_function(
        &mut self,
        src_color: BlendFactor,
        src_alpha: BlendFactor,
        dst: BlendFactor,
    ) {
        self.record(DeviceEvent::SetBlendFunction(src_color, src_alpha, dst));
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.record(DeviceEvent::SetViewport(x, y, width, height));
    }

    fn clear(&mut self, _color: Color<f32>) {
        self.record(DeviceEvent::Clear);
    }

    fn draw_elements(&mut self, primitive: Primitive, count: u32, offset: u32) -> Result<()> {
        self.record(DeviceEvent::DrawElements(primitive, count, offset));
        Ok(())
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()> {
        self.record(DeviceEvent::DrawArrays(primitive, first, count));
        Ok(())
    }
}
