//! The GPU-resource layer: device abstraction, resource context with
//! restore-on-context-loss, and the batching renderers that pack geometry
//! into the fewest possible draw calls.

pub mod batcher;
pub mod context;
pub mod device;
pub mod mesh;
pub mod shader;
pub mod shapes;
pub mod texture;

pub use self::batcher::{PolygonBatcher, MAX_BATCH_TRIANGLES};
pub use self::context::{Context, Restorable};
pub use self::device::{BlendFactor, Device, Primitive};
pub use self::mesh::{Mesh, VertexAttribute};
pub use self::shader::ShaderProgram;
pub use self::shapes::{ShapeRenderer, ShapeType};
pub use self::texture::{Texture, TextureFilter, TextureRegion, TextureWrap};
