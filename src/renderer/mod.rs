//! The high-level rendering layer: the skeleton data model, the renderer
//! that turns skeletons into batched triangles, the clipping seam, and the
//! scene orchestrator that multiplexes batcher and shape drawing.

pub mod camera;
pub mod clipper;
pub mod scene;
pub mod skeleton;
pub mod skeleton_renderer;

pub use self::camera::OrthoCamera;
pub use self::clipper::{ClippedGeometry, NullClipper, PolygonClipper};
pub use self::scene::{ResizeMode, SceneRenderer};
pub use self::skeleton::{
    Attachment, BlendMode, ClippingAttachment, MeshAttachment, RegionAttachment, Skeleton, Slot,
    QUAD_TRIANGLES,
};
pub use self::skeleton_renderer::SkeletonRenderer;
