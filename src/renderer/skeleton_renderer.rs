//! Turns a posed skeleton into batched triangles: walks the draw order,
//! composites colors, tracks blend-mode changes and routes geometry through
//! the clipper when one is active.

use crate::errors::Result;
use crate::gfx::batcher::PolygonBatcher;
use crate::math::Color;

use super::clipper::{NullClipper, PolygonClipper};
use super::skeleton::{Attachment, BlendMode, Skeleton, QUAD_TRIANGLES};

/// Renders [`Skeleton`]s through a [`PolygonBatcher`].
///
/// The renderer keeps a grow-only scratch buffer for interleaving, so
/// steady-state rendering allocates nothing.
pub struct SkeletonRenderer {
    /// Whether textures carry premultiplied alpha. Affects both the vertex
    /// colors and the blend factors pushed to the batcher.
    pub premultiplied_alpha: bool,
    two_color_tint: bool,
    clipper: Box<dyn PolygonClipper>,
    scratch: Vec<f32>,
}

impl SkeletonRenderer {
    /// A renderer without clipping support. `two_color_tint` must match
    /// the layout of the batcher passed to [`SkeletonRenderer::draw`].
    pub fn new(two_color_tint: bool) -> Self {
        SkeletonRenderer::with_clipper(two_color_tint, Box::new(NullClipper::new()))
    }

    pub fn with_clipper(two_color_tint: bool, clipper: Box<dyn PolygonClipper>) -> Self {
        SkeletonRenderer {
            premultiplied_alpha: false,
            two_color_tint,
            clipper,
            scratch: Vec::new(),
        }
    }

    /// Draws the skeleton's slots in draw order. When `slot_range_start`
    /// is set, slots before it are skipped; when `slot_range_end` is set,
    /// it is the last slot rendered. Skipped slots still feed the clipper
    /// so clip regions stay balanced.
    pub fn draw(
        &mut self,
        batcher: &mut PolygonBatcher,
        skeleton: &Skeleton,
        slot_range_start: Option<usize>,
        slot_range_end: Option<usize>,
    ) -> Result<()> {
        let two_color = self.two_color_tint;
        let stride = if two_color { 12 } else { 8 };
        let mut blend: Option<BlendMode> = None;
        let mut in_range = slot_range_start.is_none();

        for &slot_index in &skeleton.draw_order {
            let slot = &skeleton.slots[slot_index];

            if !slot.bone_active {
                self.clipper.clip_end_with_slot(slot_index);
                continue;
            }
            if slot_range_start == Some(slot_index) {
                in_range = true;
            }
            if !in_range {
                self.clipper.clip_end_with_slot(slot_index);
                continue;
            }
            if slot_range_end == Some(slot_index) {
                in_range = false;
            }

            let (positions, uvs, triangles, attachment_color, texture) = match slot.attachment {
                Some(Attachment::Region(ref a)) => (
                    &a.world_vertices[..],
                    &a.uvs[..],
                    &QUAD_TRIANGLES[..],
                    a.color,
                    a.texture.clone(),
                ),
                Some(Attachment::Mesh(ref a)) => (
                    &a.world_vertices[..],
                    &a.uvs[..],
                    &a.triangles[..],
                    a.color,
                    a.texture.clone(),
                ),
                Some(Attachment::Clipping(ref a)) => {
                    self.clipper.clip_start(slot_index, a);
                    continue;
                }
                _ => {
                    self.clipper.clip_end_with_slot(slot_index);
                    continue;
                }
            };

            let mut light = skeleton
                .color
                .modulate(&slot.color)
                .modulate(&attachment_color);
            if self.premultiplied_alpha {
                light = light.premultiplied();
            }
            let dark = match slot.dark_color {
                None => Color::new(0.0, 0.0, 0.0, 1.0),
                Some(d) => {
                    if self.premultiplied_alpha {
                        Color::new(d.r * light.a, d.g * light.a, d.b * light.a, 1.0)
                    } else {
                        Color::new(d.r, d.g, d.b, 0.0)
                    }
                }
            };

            if blend != Some(slot.blend_mode) {
                blend = Some(slot.blend_mode);
                let (src_color, src_alpha, dst) =
                    slot.blend_mode.blend_factors(self.premultiplied_alpha);
                batcher.set_blend_mode(src_color, src_alpha, dst)?;
            }

            if self.clipper.is_clipping() {
                let clipped =
                    self.clipper
                        .clip_triangles(positions, triangles, uvs, &light, &dark, two_color);
                if !clipped.indices.is_empty() {
                    batcher.draw(&texture, &clipped.vertices, &clipped.indices)?;
                }
            } else {
                let len = positions.len() / 2 * stride;
                grow(&mut self.scratch, len);
                pack(&mut self.scratch[..len], positions, uvs, &light, &dark, two_color);
                batcher.draw(&texture, &self.scratch[..len], triangles)?;
            }

            self.clipper.clip_end_with_slot(slot_index);
        }

        self.clipper.clip_end();
        Ok(())
    }
}

/// Grows by doubling, never shrinks.
fn grow(scratch: &mut Vec<f32>, len: usize) {
    if scratch.len() < len {
        let mut capacity = scratch.len().max(64);
        while capacity < len {
            capacity *= 2;
        }
        scratch.resize(capacity, 0.0);
    }
}

fn pack(
    dst: &mut [f32],
    positions: &[f32],
    uvs: &[f32],
    light: &Color<f32>,
    dark: &Color<f32>,
    two_color: bool,
) {
    let stride = if two_color { 12 } else { 8 };
    for i in 0..positions.len() / 2 {
        let v = i * stride;
        dst[v] = positions[i * 2];
        dst[v + 1] = positions[i * 2 + 1];
        dst[v + 2] = light.r;
        dst[v + 3] = light.g;
        dst[v + 4] = light.b;
        dst[v + 5] = light.a;
        dst[v + 6] = uvs[i * 2];
        dst[v + 7] = uvs[i * 2 + 1];
        if two_color {
            dst[v + 8] = dark.r;
            dst[v + 9] = dark.g;
            dst[v + 10] = dark.b;
            dst[v + 11] = dark.a;
        }
    }
}
