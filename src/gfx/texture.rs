//! GPU textures with retained pixel data, so they can be rebuilt after a
//! context loss without asking the caller to keep the image around.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::{Error, Result};

use super::context::{Context, Restorable};
use super::device::{Device, TextureId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureWrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

struct TextureInner {
    context: Context,
    id: Option<TextureId>,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    filter: TextureFilter,
    wrap: TextureWrap,
}

impl TextureInner {
    fn upload(&mut self, device: &mut dyn Device) -> Result<()> {
        let id = device.create_texture(
            self.width,
            self.height,
            &self.pixels,
            self.filter,
            self.wrap,
        )?;
        self.id = Some(id);
        Ok(())
    }
}

impl Restorable for TextureInner {
    fn restore(&mut self, device: &mut dyn Device) -> Result<()> {
        // The old handle died with the lost context.
        self.id = None;
        self.upload(device)
    }
}

impl Drop for TextureInner {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            if !self.context.is_lost() {
                self.context.device().delete_texture(id);
            }
        }
    }
}

/// A 2D RGBA texture. Cloning is cheap and clones refer to the same GPU
/// object; equality is identity, which is what batch keying needs.
#[derive(Clone)]
pub struct Texture {
    inner: Rc<RefCell<TextureInner>>,
}

impl PartialEq for Texture {
    fn eq(&self, other: &Texture) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Texture {
    /// Creates a texture from tightly packed RGBA8 pixels. The pixel data
    /// is retained on the CPU for restores.
    pub fn new(
        context: &Context,
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        filter: TextureFilter,
        wrap: TextureWrap,
    ) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "texture of {}x{} needs {} bytes of RGBA data, got {}",
                width,
                height,
                expected,
                pixels.len()
            )));
        }

        let mut inner = TextureInner {
            context: context.clone(),
            id: None,
            width,
            height,
            pixels,
            filter,
            wrap,
        };

        if !context.is_lost() {
            inner.upload(&mut **context.device())?;
        }

        let inner = Rc::new(RefCell::new(inner));
        let handle: Rc<RefCell<dyn Restorable>> = inner.clone();
        context.register(Rc::downgrade(&handle));
        Ok(Texture { inner })
    }

    pub fn width(&self) -> u32 {
        self.inner.borrow().width
    }

    pub fn height(&self) -> u32 {
        self.inner.borrow().height
    }

    /// Binds the texture to the given unit. A no-op while the context is
    /// lost.
    pub fn bind(&self, unit: u32) {
        let inner = self.inner.borrow();
        if inner.context.is_lost() {
            return;
        }

        inner.context.device().bind_texture(unit, inner.id);
    }
}

/// An axis-aligned sub-rectangle of a texture in normalized coordinates.
#[derive(Clone, PartialEq)]
pub struct TextureRegion {
    pub texture: Texture,
    pub u: f32,
    pub v: f32,
    pub u2: f32,
    pub v2: f32,
}

impl TextureRegion {
    /// The region covering the whole texture.
    pub fn new(texture: Texture) -> Self {
        TextureRegion {
            texture,
            u: 0.0,
            v: 0.0,
            u2: 1.0,
            v2: 1.0,
        }
    }

    pub fn with_uv(texture: Texture, u: f32, v: f32, u2: f32, v2: f32) -> Self {
        TextureRegion { texture, u, v, u2, v2 }
    }
}
