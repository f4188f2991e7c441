//! The CPU-side skeleton model the renderer consumes: slots in draw order,
//! their attachments with world-space vertices already computed, and the
//! per-slot blend mode.

use crate::gfx::device::BlendFactor;
use crate::gfx::texture::Texture;
use crate::math::Color;

/// Index pattern of a quad split into two triangles.
pub const QUAD_TRIANGLES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// How a slot composites over what is already in the framebuffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Normal,
    Additive,
    Multiply,
    Screen,
}

impl BlendMode {
    /// The `(src_color, src_alpha, dst)` blend factors for this mode.
    /// Premultiplied-alpha textures fold alpha into the color channels, so
    /// their source color factor is `One` for the straight modes.
    pub fn blend_factors(self, premultiplied_alpha: bool) -> (BlendFactor, BlendFactor, BlendFactor) {
        let src_straight = if premultiplied_alpha {
            BlendFactor::One
        } else {
            BlendFactor::SrcAlpha
        };

        match self {
            BlendMode::Normal => (src_straight, BlendFactor::One, BlendFactor::OneMinusSrcAlpha),
            BlendMode::Additive => (src_straight, BlendFactor::One, BlendFactor::One),
            BlendMode::Multiply => (
                BlendFactor::DstColor,
                BlendFactor::OneMinusSrcAlpha,
                BlendFactor::OneMinusSrcAlpha,
            ),
            BlendMode::Screen => (
                BlendFactor::One,
                BlendFactor::OneMinusSrcColor,
                BlendFactor::OneMinusSrcColor,
            ),
        }
    }
}

/// A textured quad. World positions and texture coordinates are four
/// (x, y) / (u, v) pairs in [`QUAD_TRIANGLES`] winding.
#[derive(Clone)]
pub struct RegionAttachment {
    pub world_vertices: [f32; 8],
    pub uvs: [f32; 8],
    pub color: Color<f32>,
    pub texture: Texture,
}

/// An arbitrary textured triangle mesh.
#[derive(Clone)]
pub struct MeshAttachment {
    /// (x, y) pairs.
    pub world_vertices: Vec<f32>,
    /// One (u, v) pair per vertex.
    pub uvs: Vec<f32>,
    pub triangles: Vec<u16>,
    pub color: Color<f32>,
    pub texture: Texture,
}

/// A convex clipping polygon. Clipping starts at the slot holding this
/// attachment and ends at `end_slot`, or at the end of the draw order when
/// `end_slot` is `None`.
#[derive(Clone)]
pub struct ClippingAttachment {
    /// (x, y) pairs of the clip polygon in world space.
    pub world_vertices: Vec<f32>,
    pub end_slot: Option<usize>,
}

/// Everything a slot can carry. Bounding boxes and paths are metadata only
/// and never produce geometry.
#[derive(Clone)]
pub enum Attachment {
    Region(RegionAttachment),
    Mesh(MeshAttachment),
    Clipping(ClippingAttachment),
    BoundingBox,
    Path,
}

/// One drawable layer of a skeleton.
#[derive(Clone)]
pub struct Slot {
    /// Slots on inactive bones are skipped entirely.
    pub bone_active: bool,
    pub color: Color<f32>,
    /// Second color for two-color tinting; `None` when the slot doesn't
    /// tint.
    pub dark_color: Option<Color<f32>>,
    pub blend_mode: BlendMode,
    pub attachment: Option<Attachment>,
}

impl Slot {
    pub fn new(attachment: Option<Attachment>) -> Self {
        Slot {
            bone_active: true,
            color: Color::white(),
            dark_color: None,
            blend_mode: BlendMode::Normal,
            attachment,
        }
    }
}

/// A posed skeleton, ready to render.
#[derive(Clone)]
pub struct Skeleton {
    pub color: Color<f32>,
    pub slots: Vec<Slot>,
    /// Indices into `slots`, back to front.
    pub draw_order: Vec<usize>,
}

impl Skeleton {
    /// A skeleton drawing its slots in storage order.
    pub fn new(slots: Vec<Slot>) -> Self {
        let draw_order = (0..slots.len()).collect();
        Skeleton {
            color: Color::white(),
            slots,
            draw_order,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::gfx::device::BlendFactor::*;

    #[test]
    fn blend_factors_straight_alpha() {
        assert_eq!(
            BlendMode::Normal.blend_factors(false),
            (SrcAlpha, One, OneMinusSrcAlpha)
        );
        assert_eq!(BlendMode::Additive.blend_factors(false), (SrcAlpha, One, One));
        assert_eq!(
            BlendMode::Multiply.blend_factors(false),
            (DstColor, OneMinusSrcAlpha, OneMinusSrcAlpha)
        );
        assert_eq!(
            BlendMode::Screen.blend_factors(false),
            (One, OneMinusSrcColor, OneMinusSrcColor)
        );
    }

    #[test]
    fn blend_factors_premultiplied() {
        assert_eq!(
            BlendMode::Normal.blend_factors(true),
            (One, One, OneMinusSrcAlpha)
        );
        assert_eq!(BlendMode::Additive.blend_factors(true), (One, One, One));
    }
}
