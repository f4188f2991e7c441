//! A small 2D mesh-batching and rendering engine. Geometry is packed into
//! shared vertex/index buffers and flushed in as few draw calls as state
//! changes allow, with every GPU resource able to rebuild itself after the
//! underlying context is lost.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate cgmath;
extern crate gl;
extern crate smallvec;

pub mod errors;
pub mod gfx;
pub mod math;
pub mod renderer;

pub mod prelude;
