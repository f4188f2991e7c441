//! The clipping seam of the skeleton renderer. The renderer drives this
//! interface while walking the draw order; implementations own the clip
//! state and the actual triangle-against-polygon math.

use crate::math::Color;

use super::skeleton::ClippingAttachment;

/// Fully interleaved output of a clip pass, ready for the polygon batcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClippedGeometry {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
}

/// Clips batches of triangles against the active clipping polygon.
///
/// `clip_start` opens a clip at the slot carrying the attachment;
/// `clip_end_with_slot` closes it when the walk reaches the attachment's
/// end slot; `clip_end` force-closes at the end of the draw order. The
/// renderer calls `clip_end_with_slot` for every slot it visits, active or
/// skipped, so implementations must treat non-matching slots as no-ops.
pub trait PolygonClipper {
    fn clip_start(&mut self, slot_index: usize, attachment: &ClippingAttachment);
    fn clip_end_with_slot(&mut self, slot_index: usize);
    fn clip_end(&mut self);
    fn is_clipping(&self) -> bool;

    /// Clips a triangle list. `positions` are tightly packed (x, y) pairs,
    /// `uvs` one (u, v) pair per vertex. The result is interleaved as
    /// position, light color, texture coordinates and, with `two_color`,
    /// the dark color.
    fn clip_triangles(
        &mut self,
        positions: &[f32],
        triangles: &[u16],
        uvs: &[f32],
        light: &Color<f32>,
        dark: &Color<f32>,
        two_color: bool,
    ) -> ClippedGeometry;
}

/// Interleaves unclipped geometry in the batcher's vertex layout.
pub(crate) fn interleave(
    positions: &[f32],
    uvs: &[f32],
    light: &Color<f32>,
    dark: &Color<f32>,
    two_color: bool,
) -> Vec<f32> {
    let count = positions.len() / 2;
    let stride = if two_color { 12 } else { 8 };
    let mut out = Vec::with_capacity(count * stride);

    for i in 0..count {
        out.push(positions[i * 2]);
        out.push(positions[i * 2 + 1]);
        out.push(light.r);
        out.push(light.g);
        out.push(light.b);
        out.push(light.a);
        out.push(uvs[i * 2]);
        out.push(uvs[i * 2 + 1]);
        if two_color {
            out.push(dark.r);
            out.push(dark.g);
            out.push(dark.b);
            out.push(dark.a);
        }
    }

    out
}

/// A clipper that never clips. Triangles pass through untouched, which
/// keeps the renderer correct for skeletons without clipping attachments.
#[derive(Debug, Default)]
pub struct NullClipper;

impl NullClipper {
    pub fn new() -> Self {
        NullClipper
    }
}

impl PolygonClipper for NullClipper {
    fn clip_start(&mut self, _slot_index: usize, _attachment: &ClippingAttachment) {}

    fn clip_end_with_slot(&mut self, _slot_index: usize) {}

    fn clip_end(&mut self) {}

    fn is_clipping(&self) -> bool {
        false
    }

    fn clip_triangles(
        &mut self,
        positions: &[f32],
        triangles: &[u16],
        uvs: &[f32],
        light: &Color<f32>,
        dark: &Color<f32>,
        two_color: bool,
    ) -> ClippedGeometry {
        ClippedGeometry {
            vertices: interleave(positions, uvs, light, dark, two_color),
            indices: triangles.to_vec(),
        }
    }
}
