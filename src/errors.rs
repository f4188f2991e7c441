//! Crate-wide error taxonomy. Every fallible operation in the engine returns
//! [`Result`] with one of these variants; nothing is silently dropped.

/// Errors raised by the batching and GPU-resource layer.
#[derive(Debug, Fail)]
pub enum Error {
    /// A call arrived outside the protocol it belongs to, e.g. `draw` without
    /// an active `begin`, or `begin` while already drawing.
    #[fail(display = "Invalid usage: {}", _0)]
    InvalidUsage(String),

    /// More vertices or indices were written than the geometry buffer was
    /// sized for at construction. The write is rejected wholesale.
    #[fail(display = "Capacity exceeded: {}", _0)]
    CapacityExceeded(String),

    /// A caller-supplied value is out of range or malformed.
    #[fail(display = "Invalid argument: {}", _0)]
    InvalidArgument(String),

    /// Shader compilation or program linking failed on a live context.
    #[fail(display = "Failed to compile shader, errors:\n{}", _0)]
    ShaderCompileFailure(String),

    /// A uniform or attribute name could not be resolved against the
    /// currently linked program.
    #[fail(display = "Couldn't find location for {:?}.", _0)]
    LocationNotFound(String),

    /// The underlying graphics device rejected an operation.
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;
