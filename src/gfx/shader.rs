//! Shader programs with retained GLSL sources. Locations are looked up by
//! name on every use instead of being cached, so a program rebuilt after a
//! context loss never hands out stale locations.

use std::cell::RefCell;
use std::rc::Rc;

use cgmath::Matrix4;

use crate::errors::{Error, Result};

use super::context::{Context, Restorable};
use super::device::{Device, ProgramId, UniformValue};

pub const ATTR_POSITION: &str = "a_position";
pub const ATTR_COLOR: &str = "a_color";
pub const ATTR_COLOR2: &str = "a_color2";
pub const ATTR_TEXCOORDS: &str = "a_texCoords";

pub const UNIFORM_MVP: &str = "u_projTrans";
pub const UNIFORM_TEXTURE: &str = "u_texture";

const COLORED_TEXTURED_VS: &str = r#"
attribute vec4 a_position;
attribute vec4 a_color;
attribute vec2 a_texCoords;
uniform mat4 u_projTrans;
varying vec4 v_color;
varying vec2 v_texCoords;

void main () {
    v_color = a_color;
    v_texCoords = a_texCoords;
    gl_Position = u_projTrans * a_position;
}
"#;

const COLORED_TEXTURED_FS: &str = r#"
#ifdef GL_ES
    #define LOWP lowp
    precision mediump float;
#else
    #define LOWP
#endif
varying LOWP vec4 v_color;
varying vec2 v_texCoords;
uniform sampler2D u_texture;

void main () {
    gl_FragColor = v_color * texture2D(u_texture, v_texCoords);
}
"#;

const TWO_COLORED_TEXTURED_VS: &str = r#"
attribute vec4 a_position;
attribute vec4 a_color;
attribute vec4 a_color2;
attribute vec2 a_texCoords;
uniform mat4 u_projTrans;
varying vec4 v_light;
varying vec4 v_dark;
varying vec2 v_texCoords;

void main () {
    v_light = a_color;
    v_dark = a_color2;
    v_texCoords = a_texCoords;
    gl_Position = u_projTrans * a_position;
}
"#;

const TWO_COLORED_TEXTURED_FS: &str = r#"
#ifdef GL_ES
    #define LOWP lowp
    precision mediump float;
#else
    #define LOWP
#endif
varying LOWP vec4 v_light;
varying LOWP vec4 v_dark;
varying vec2 v_texCoords;
uniform sampler2D u_texture;

void main () {
    vec4 texColor = texture2D(u_texture, v_texCoords);
    gl_FragColor.a = texColor.a * v_light.a;
    gl_FragColor.rgb = ((texColor.a - 1.0) * v_dark.a + 1.0 - texColor.rgb) * v_dark.rgb + texColor.rgb * v_light.rgb;
}
"#;

const COLORED_VS: &str = r#"
attribute vec4 a_position;
attribute vec4 a_color;
uniform mat4 u_projTrans;
varying vec4 v_color;

void main () {
    v_color = a_color;
    gl_Position = u_projTrans * a_position;
}
"#;

const COLORED_FS: &str = r#"
#ifdef GL_ES
    #define LOWP lowp
    precision mediump float;
#else
    #define LOWP
#endif
varying LOWP vec4 v_color;

void main () {
    gl_FragColor = v_color;
}
"#;

struct ShaderInner {
    context: Context,
    id: Option<ProgramId>,
    vs: String,
    fs: String,
}

impl ShaderInner {
    fn compile(&mut self, device: &mut dyn Device) -> Result<()> {
        let id = device.create_program(&self.vs, &self.fs)?;
        self.id = Some(id);
        Ok(())
    }
}

impl Restorable for ShaderInner {
    fn restore(&mut self, device: &mut dyn Device) -> Result<()> {
        self.id = None;
        self.compile(device)
    }
}

impl Drop for ShaderInner {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            if !self.context.is_lost() {
                self.context.device().delete_program(id);
            }
        }
    }
}

/// A compiled and linked shader program. Cloning shares the GPU object.
#[derive(Clone)]
pub struct ShaderProgram {
    inner: Rc<RefCell<ShaderInner>>,
}

impl ShaderProgram {
    /// Compiles and links a program from GLSL sources. The sources are
    /// retained so the program can recompile itself after a context loss.
    pub fn new(context: &Context, vs: &str, fs: &str) -> Result<Self> {
        let mut inner = ShaderInner {
            context: context.clone(),
            id: None,
            vs: vs.to_string(),
            fs: fs.to_string(),
        };

        if !context.is_lost() {
            inner.compile(&mut **context.device())?;
        }

        let inner = Rc::new(RefCell::new(inner));
        let handle: Rc<RefCell<dyn Restorable>> = inner.clone();
        context.register(Rc::downgrade(&handle));
        Ok(ShaderProgram { inner })
    }

    /// Position + color + texture coordinates, modulated against a single
    /// texture.
    pub fn colored_textured(context: &Context) -> Result<Self> {
        ShaderProgram::new(context, COLORED_TEXTURED_VS, COLORED_TEXTURED_FS)
    }

    /// Like [`ShaderProgram::colored_textured`] with a second color channel
    /// for dark-color tinting.
    pub fn two_colored_textured(context: &Context) -> Result<Self> {
        ShaderProgram::new(context, TWO_COLORED_TEXTURED_VS, TWO_COLORED_TEXTURED_FS)
    }

    /// Position + color, no texture. Used by the shape renderer.
    pub fn colored(context: &Context) -> Result<Self> {
        ShaderProgram::new(context, COLORED_VS, COLORED_FS)
    }

    pub fn bind(&self) {
        let inner = self.inner.borrow();
        if inner.context.is_lost() {
            return;
        }

        inner.context.device().bind_program(inner.id);
    }

    pub fn unbind(&self) {
        let inner = self.inner.borrow();
        if inner.context.is_lost() {
            return;
        }

        inner.context.device().bind_program(None);
    }

    /// Resolves an attribute location against the currently linked program.
    /// While the context is lost this returns a placeholder, since every
    /// downstream device call is suppressed anyway.
    pub fn attribute_location(&self, name: &str) -> Result<u32> {
        let inner = self.inner.borrow();
        if inner.context.is_lost() {
            return Ok(0);
        }

        let id = match inner.id {
            Some(v) => v,
            None => return Ok(0),
        };

        let mut device = inner.context.device();
        match device.attribute_location(id, name) {
            Some(v) => Ok(v),
            None => Err(Error::LocationNotFound(name.to_string())),
        }
    }

    pub fn set_uniform_i32(&self, name: &str, value: i32) -> Result<()> {
        self.set_uniform(name, UniformValue::I32(value))
    }

    pub fn set_uniform_f32(&self, name: &str, value: f32) -> Result<()> {
        self.set_uniform(name, UniformValue::F32(value))
    }

    pub fn set_uniform_2f(&self, name: &str, value: [f32; 2]) -> Result<()> {
        self.set_uniform(name, UniformValue::Vector2f(value))
    }

    pub fn set_uniform_4f(&self, name: &str, value: [f32; 4]) -> Result<()> {
        self.set_uniform(name, UniformValue::Vector4f(value))
    }

    pub fn set_uniform_mat4(&self, name: &str, value: &Matrix4<f32>) -> Result<()> {
        self.set_uniform(name, UniformValue::Matrix4f((*value).into()))
    }

    fn set_uniform(&self, name: &str, value: UniformValue) -> Result<()> {
        let inner = self.inner.borrow();
        if inner.context.is_lost() {
            return Ok(());
        }

        let id = match inner.id {
            Some(v) => v,
            None => return Ok(()),
        };

        let mut device = inner.context.device();
        let location = device
            .uniform_location(id, name)
            .ok_or_else(|| Error::LocationNotFound(name.to_string()))?;
        device.set_uniform(location, value)
    }
}
