//! The shared graphics context. Owns the [`Device`] and tracks every GPU
//! resource that must be rebuilt when the underlying context is lost.

use std::cell::{Cell, RefCell, RefMut};
use std::os::raw::c_void;
use std::rc::{Rc, Weak};

use crate::errors::Result;
use crate::math::Color;

use super::device::headless::DeviceEvents;
use super::device::{Device, GlDevice, HeadlessDevice};

/// A GPU resource that can rebuild itself from retained CPU-side state
/// after the context has been lost and recovered.
pub trait Restorable {
    fn restore(&mut self, device: &mut dyn Device) -> Result<()>;
}

struct ContextInner {
    device: RefCell<Box<dyn Device>>,
    // Weak handles only; a resource dropped by its owner must not be kept
    // alive (or restored) by the registry. Dead entries are pruned on
    // every restore pass.
    registry: RefCell<Vec<Weak<RefCell<dyn Restorable>>>>,
    lost: Cell<bool>,
}

/// Cheap-to-clone handle onto the graphics context. All resources created
/// from the same `Context` share one device and one restore registry.
#[derive(Clone)]
pub struct Context {
    inner: Rc<ContextInner>,
}

impl Context {
    pub fn new(device: Box<dyn Device>) -> Self {
        Context {
            inner: Rc::new(ContextInner {
                device: RefCell::new(device),
                registry: RefCell::new(Vec::new()),
                lost: Cell::new(false),
            }),
        }
    }

    /// Creates a context over the OpenGL backend.
    ///
    /// # Safety
    ///
    /// See [`GlDevice::new`].
    pub unsafe fn gl<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void,
    {
        Context::new(Box::new(GlDevice::new(loader)))
    }

    /// Creates a context over the recording backend, returning the handle
    /// onto its command stream alongside.
    pub fn headless() -> (Self, DeviceEvents) {
        let device = HeadlessDevice::new();
        let events = device.events();
        (Context::new(Box::new(device)), events)
    }

    /// Borrows the device mutably. Callers must not hold the guard across
    /// calls into other resources on the same context.
    pub(crate) fn device(&self) -> RefMut<'_, Box<dyn Device>> {
        self.inner.device.borrow_mut()
    }

    pub(crate) fn register(&self, item: Weak<RefCell<dyn Restorable>>) {
        self.inner.registry.borrow_mut().push(item);
    }

    /// Whether the underlying context is currently lost. While lost, GPU
    /// handles are invalid and resources suppress device work.
    pub fn is_lost(&self) -> bool {
        self.inner.lost.get()
    }

    /// Marks the context lost. Existing GPU handles are treated as garbage
    /// from this point on.
    pub fn notify_lost(&self) {
        info!("graphics context lost");
        self.inner.lost.set(true);
    }

    /// Marks the context live again and rebuilds every registered resource
    /// in registration order. Safe to call repeatedly; resources that are
    /// already live are rebuilt from their retained state either way.
    pub fn notify_restored(&self) -> Result<()> {
        info!("graphics context restored");
        self.inner.lost.set(false);

        let mut registry = self.inner.registry.borrow_mut();
        registry.retain(|v| v.upgrade().is_some());

        let mut device = self.inner.device.borrow_mut();
        for item in registry.iter() {
            if let Some(item) = item.upgrade() {
                item.borrow_mut().restore(&mut **device)?;
            }
        }

        Ok(())
    }

    /// Clears the color buffer.
    pub fn clear(&self, color: Color<f32>) {
        if self.is_lost() {
            return;
        }

        self.inner.device.borrow_mut().clear(color);
    }

    pub fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        if self.is_lost() {
            return;
        }

        self.inner.device.borrow_mut().set_viewport(x, y, width, height);
    }
}
