pub use crate::errors::{Error, Result};

pub use crate::gfx::{
    BlendFactor, Context, Mesh, PolygonBatcher, Primitive, Restorable, ShaderProgram,
    ShapeRenderer, ShapeType, Texture, TextureFilter, TextureRegion, TextureWrap,
    VertexAttribute,
};

pub use crate::renderer::{
    Attachment, BlendMode, ClippedGeometry, ClippingAttachment, MeshAttachment, NullClipper,
    OrthoCamera, PolygonClipper, RegionAttachment, ResizeMode, SceneRenderer, Skeleton,
    SkeletonRenderer, Slot, QUAD_TRIANGLES,
};

pub use crate::math::Color;
