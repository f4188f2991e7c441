//! The OpenGL backend.

use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr;

use gl;
use gl::types::*;

use crate::errors::{Error, Result};
use crate::gfx::texture::{TextureFilter, TextureWrap};
use crate::math::Color;

use super::{
    BlendFactor, BufferId, Capability, Device, Primitive, ProgramId, TextureId, UniformLocation,
    UniformValue,
};

/// [`Device`] implementation that issues real OpenGL commands.
pub struct GlDevice {}

impl GlDevice {
    /// Loads GL function pointers through `loader` and returns the device.
    ///
    /// # Safety
    ///
    /// The calling thread must own a current GL context, and that context
    /// must stay current for every subsequent call into the device.
    pub unsafe fn new<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void,
    {
        gl::load_with(loader);
        GlDevice {}
    }

    unsafe fn check(&self) -> Result<()> {
        match gl::GetError() {
            gl::NO_ERROR => Ok(()),
            gl::INVALID_ENUM => Err(Error::Backend("[GL] Invalid enum.".into())),
            gl::INVALID_VALUE => Err(Error::Backend("[GL] Invalid value.".into())),
            gl::INVALID_OPERATION => Err(Error::Backend("[GL] Invalid operation.".into())),
            gl::INVALID_FRAMEBUFFER_OPERATION => {
                Err(Error::Backend("[GL] Invalid framebuffer operation.".into()))
            }
            gl::OUT_OF_MEMORY => Err(Error::Backend("[GL] Out of memory.".into())),
            other => Err(Error::Backend(format!("[GL] Unknown error 0x{:X}.", other))),
        }
    }

    unsafe fn compile(&self, kind: GLenum, src: &str) -> Result<GLuint> {
        let shader = gl::CreateShader(kind);
        let length = src.len() as GLint;
        let chars = src.as_ptr() as *const GLchar;
        gl::ShaderSource(shader, 1, &chars, &length);
        gl::CompileShader(shader);

        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
        if status != GLint::from(gl::TRUE) {
            let log = info_log(shader, true);
            gl::DeleteShader(shader);
            return Err(Error::ShaderCompileFailure(log));
        }

        Ok(shader)
    }

    unsafe fn link(&self, vs: GLuint, fs: GLuint) -> Result<GLuint> {
        let program = gl::CreateProgram();
        gl::AttachShader(program, vs);
        gl::AttachShader(program, fs);
        gl::LinkProgram(program);

        // The program keeps the shaders alive after this point.
        gl::DetachShader(program, vs);
        gl::DeleteShader(vs);
        gl::DetachShader(program, fs);
        gl::DeleteShader(fs);

        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
        if status != GLint::from(gl::TRUE) {
            let log = info_log(program, false);
            gl::DeleteProgram(program);
            return Err(Error::ShaderCompileFailure(log));
        }

        Ok(program)
    }
}

unsafe fn info_log(object: GLuint, shader: bool) -> String {
    let mut len = 0;
    if shader {
        gl::GetShaderiv(object, gl::INFO_LOG_LENGTH, &mut len);
    } else {
        gl::GetProgramiv(object, gl::INFO_LOG_LENGTH, &mut len);
    }

    if len <= 0 {
        return String::new();
    }

    let mut buf = vec![0u8; len as usize];
    if shader {
        gl::GetShaderInfoLog(object, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
    } else {
        gl::GetProgramInfoLog(object, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
    }

    buf.truncate(len as usize - 1);
    String::from_utf8_lossy(&buf).into_owned()
}

impl From<Primitive> for GLenum {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Points => gl::POINTS,
            Primitive::Lines => gl::LINES,
            Primitive::Triangles => gl::TRIANGLES,
        }
    }
}

impl From<BlendFactor> for GLenum {
    fn from(factor: BlendFactor) -> Self {
        match factor {
            BlendFactor::Zero => gl::ZERO,
            BlendFactor::One => gl::ONE,
            BlendFactor::SrcColor => gl::SRC_COLOR,
            BlendFactor::OneMinusSrcColor => gl::ONE_MINUS_SRC_COLOR,
            BlendFactor::SrcAlpha => gl::SRC_ALPHA,
            BlendFactor::OneMinusSrcAlpha => gl::ONE_MINUS_SRC_ALPHA,
            BlendFactor::DstColor => gl::DST_COLOR,
            BlendFactor::OneMinusDstColor => gl::ONE_MINUS_DST_COLOR,
            BlendFactor::DstAlpha => gl::DST_ALPHA,
            BlendFactor::OneMinusDstAlpha => gl::ONE_MINUS_DST_ALPHA,
        }
    }
}

impl From<Capability> for GLenum {
    fn from(cap: Capability) -> Self {
        match cap {
            Capability::Blend => gl::BLEND,
            Capability::CullFace => gl::CULL_FACE,
        }
    }
}

impl Device for GlDevice {
    fn create_buffer(&mut self) -> Result<BufferId> {
        unsafe {
            let mut id = 0;
            gl::GenBuffers(1, &mut id);
            self.check()?;
            Ok(BufferId(id))
        }
    }

    fn delete_buffer(&mut self, id: BufferId) {
        unsafe {
            gl::DeleteBuffers(1, &id.0);
        }
    }

    fn upload_vertices(&mut self, id: BufferId, data: &[f32]) -> Result<()> {
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, id.0);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                (data.len() * ::std::mem::size_of::<f32>()) as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::DYNAMIC_DRAW,
            );
            self.check()
        }
    }

    fn upload_indices(&mut self, id: BufferId, data: &[u16]) -> Result<()> {
        unsafe {
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, id.0);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                (data.len() * ::std::mem::size_of::<u16>()) as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gl::DYNAMIC_DRAW,
            );
            self.check()
        }
    }

    fn bind_vertex_buffer(&mut self, id: Option<BufferId>) {
        unsafe {
            gl::BindBuffer(gl::ARRAY_BUFFER, id.map_or(0, |v| v.0));
        }
    }

    fn bind_index_buffer(&mut self, id: Option<BufferId>) {
        unsafe {
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, id.map_or(0, |v| v.0));
        }
    }

    fn create_texture(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
        filter: TextureFilter,
        wrap: TextureWrap,
    ) -> Result<TextureId> {
        unsafe {
            let mut id = 0;
            gl::GenTextures(1, &mut id);
            gl::BindTexture(gl::TEXTURE_2D, id);

            let (min, mag) = match filter {
                TextureFilter::Nearest => (gl::NEAREST, gl::NEAREST),
                TextureFilter::Linear => (gl::LINEAR, gl::LINEAR),
            };
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag as GLint);

            let wrap = match wrap {
                TextureWrap::ClampToEdge => gl::CLAMP_TO_EDGE,
                TextureWrap::Repeat => gl::REPEAT,
                TextureWrap::MirroredRepeat => gl::MIRRORED_REPEAT,
            };
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap as GLint);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap as GLint);

            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                gl::RGBA as GLint,
                width as GLsizei,
                height as GLsizei,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                pixels.as_ptr() as *const c_void,
            );
            self.check()?;
            Ok(TextureId(id))
        }
    }

    fn delete_texture(&mut self, id: TextureId) {
        unsafe {
            gl::DeleteTextures(1, &id.0);
        }
    }

    fn bind_texture(&mut self, unit: u32, id: Option<TextureId>) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(gl::TEXTURE_2D, id.map_or(0, |v| v.0));
        }
    }

    fn create_program(&mut self, vs: &str, fs: &str) -> Result<ProgramId> {
        unsafe {
            let vs = self.compile(gl::VERTEX_SHADER, vs)?;
            let fs = match self.compile(gl::FRAGMENT_SHADER, fs) {
                Ok(v) => v,
                Err(err) => {
                    gl::DeleteShader(vs);
                    return Err(err);
                }
            };
            let id = self.link(vs, fs)?;
            Ok(ProgramId(id))
        }
    }

    fn delete_program(&mut self, id: ProgramId) {
        unsafe {
            gl::DeleteProgram(id.0);
        }
    }

    fn bind_program(&mut self, id: Option<ProgramId>) {
        unsafe {
            gl::UseProgram(id.map_or(0, |v| v.0));
        }
    }

    fn uniform_location(&mut self, id: ProgramId, name: &str) -> Option<UniformLocation> {
        let name = match CString::new(name) {
            Ok(v) => v,
            Err(_) => return None,
        };

        unsafe {
            let location = gl::GetUniformLocation(id.0, name.as_ptr());
            if location < 0 {
                None
            } else {
                Some(UniformLocation(location))
            }
        }
    }

    fn attribute_location(&mut self, id: ProgramId, name: &str) -> Option<u32> {
        let name = match CString::new(name) {
            Ok(v) => v,
            Err(_) => return None,
        };

        unsafe {
            let location = gl::GetAttribLocation(id.0, name.as_ptr());
            if location < 0 {
                None
            } else {
                Some(location as u32)
            }
        }
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) -> Result<()> {
        unsafe {
            match value {
                UniformValue::I32(v) => gl::Uniform1i(location.0, v),
                UniformValue::F32(v) => gl::Uniform1f(location.0, v),
                UniformValue::Vector2f(v) => gl::Uniform2f(location.0, v[0], v[1]),
                UniformValue::Vector3f(v) => gl::Uniform3f(location.0, v[0], v[1], v[2]),
                UniformValue::Vector4f(v) => gl::Uniform4f(location.0, v[0], v[1], v[2], v[3]),
                UniformValue::Matrix4f(v) => {
                    gl::UniformMatrix4fv(location.0, 1, gl::FALSE, v[0].as_ptr())
                }
            }
            self.check()
        }
    }

    fn enable_attribute(&mut self, location: u32, elements: u32, stride: u32, offset: u32) {
        unsafe {
            gl::EnableVertexAttribArray(location);
            gl::VertexAttribPointer(
                location,
                elements as GLint,
                gl::FLOAT,
                gl::FALSE,
                stride as GLsizei,
                offset as usize as *const c_void,
            );
        }
    }

    fn disable_attribute(&mut self, location: u32) {
        unsafe {
            gl::DisableVertexAttribArray(location);
        }
    }

    fn set_capability(&mut self, cap: Capability, enabled: bool) {
        unsafe {
            if enabled {
                gl::Enable(cap.into());
            } else {
                gl::Disable(cap.into());
            }
        }
    }

    fn capability(&self, cap: Capability) -> bool {
        unsafe { gl::IsEnabled(cap.into()) == gl::TRUE }
    }

    fn set_blend_function(
        &mut self,
        src_color: BlendFactor,
        src_alpha: BlendFactor,
        dst: BlendFactor,
    ) {
        unsafe {
            gl::BlendFuncSeparate(src_color.into(), dst.into(), src_alpha.into(), dst.into());
        }
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        unsafe {
            gl::Viewport(x, y, width as GLsizei, height as GLsizei);
        }
    }

    fn clear(&mut self, color: Color<f32>) {
        unsafe {
            gl::ClearColor(color.r, color.g, color.b, color.a);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    fn draw_elements(&mut self, primitive: Primitive, count: u32, offset: u32) -> Result<()> {
        unsafe {
            gl::DrawElements(
                primitive.into(),
                count as GLsizei,
                gl::UNSIGNED_SHORT,
                (offset as usize * 2) as *const c_void,
            );
            self.check()
        }
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) -> Result<()> {
        unsafe {
            gl::DrawArrays(primitive.into(), first as GLint, count as GLsizei);
            self.check()
        }
    }
}
