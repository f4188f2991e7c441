extern crate meshbatch;

use meshbatch::gfx::device::DeviceEvent;
use meshbatch::prelude::*;

fn texture(ctx: &Context) -> Texture {
    Texture::new(
        ctx,
        1,
        1,
        vec![255; 4],
        TextureFilter::Nearest,
        TextureWrap::ClampToEdge,
    )
    .unwrap()
}

#[test]
fn switching_renderers_flushes_the_previous_one() {
    let (ctx, events) = Context::headless();
    let tex = texture(&ctx);

    let mut scene = SceneRenderer::new(&ctx, 800.0, 600.0, false).unwrap();
    scene.begin().unwrap();
    scene.draw_texture(&tex, 0.0, 0.0, 10.0, 10.0, None).unwrap();
    scene.line(0.0, 0.0, 5.0, 5.0, None).unwrap();
    scene.draw_texture(&tex, 5.0, 5.0, 10.0, 10.0, None).unwrap();
    scene.end().unwrap();

    let indexed = events
        .borrow()
        .iter()
        .filter(|e| match e {
            DeviceEvent::DrawElements(..) => true,
            _ => false,
        })
        .count();
    let arrays = events
        .borrow()
        .iter()
        .filter(|e| match e {
            DeviceEvent::DrawArrays(..) => true,
            _ => false,
        })
        .count();

    // Two batcher passes around one shape pass.
    assert_eq!(indexed, 2);
    assert_eq!(arrays, 1);
}

#[test]
fn consecutive_texture_draws_share_one_batch() {
    let (ctx, _) = Context::headless();
    let tex = texture(&ctx);

    let mut scene = SceneRenderer::new(&ctx, 800.0, 600.0, false).unwrap();
    scene.begin().unwrap();
    scene.draw_texture(&tex, 0.0, 0.0, 10.0, 10.0, None).unwrap();
    scene.draw_texture(&tex, 20.0, 0.0, 10.0, 10.0, None).unwrap();
    scene.end().unwrap();

    assert_eq!(scene.batcher_draw_calls(), 1);
}

#[test]
fn texture_quads_pack_position_color_uv() {
    let (ctx, events) = Context::headless();
    let tex = texture(&ctx);

    let mut scene = SceneRenderer::new(&ctx, 800.0, 600.0, false).unwrap();
    scene.begin().unwrap();
    scene.draw_texture(&tex, 2.0, 3.0, 10.0, 20.0, None).unwrap();
    scene.end().unwrap();

    let uploads: Vec<Vec<f32>> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            DeviceEvent::UploadVertices(_, data) => Some(data.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(uploads.len(), 1);
    let data = &uploads[0];
    assert_eq!(data.len(), 4 * 8);
    // Bottom-left corner, white, v flipped.
    assert_eq!(data[..8], [2.0, 3.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0]);
    // Top-right corner.
    assert_eq!(data[16..24], [12.0, 23.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
}

#[test]
fn drawing_outside_a_frame_is_an_error() {
    let (ctx, _) = Context::headless();
    let tex = texture(&ctx);

    let mut scene = SceneRenderer::new(&ctx, 800.0, 600.0, false).unwrap();
    match scene.draw_texture(&tex, 0.0, 0.0, 1.0, 1.0, None) {
        Err(Error::InvalidUsage(_)) => {}
        other => panic!("expected InvalidUsage, got {:?}", other),
    }

    scene.begin().unwrap();
    match scene.begin() {
        Err(Error::InvalidUsage(_)) => {}
        other => panic!("expected InvalidUsage, got {:?}", other),
    }
    scene.end().unwrap();
    match scene.end() {
        Err(Error::InvalidUsage(_)) => {}
        other => panic!("expected InvalidUsage, got {:?}", other),
    }
}

#[test]
fn resize_stretch_keeps_the_camera_viewport() {
    let (ctx, events) = Context::headless();
    let mut scene = SceneRenderer::new(&ctx, 800.0, 600.0, false).unwrap();

    scene.resize(ResizeMode::Stretch, 400, 400);
    assert_eq!(scene.camera().viewport_width, 800.0);
    assert_eq!(scene.camera().viewport_height, 600.0);

    assert!(events
        .borrow()
        .iter()
        .any(|e| *e == DeviceEvent::SetViewport(0, 0, 400, 400)));
}

#[test]
fn resize_expand_matches_the_surface() {
    let (ctx, _) = Context::headless();
    let mut scene = SceneRenderer::new(&ctx, 800.0, 600.0, false).unwrap();

    scene.resize(ResizeMode::Expand, 400, 400);
    assert_eq!(scene.camera().viewport_width, 400.0);
    assert_eq!(scene.camera().viewport_height, 400.0);
}

#[test]
fn resize_fit_scales_uniformly() {
    let (ctx, _) = Context::headless();
    let mut scene = SceneRenderer::new(&ctx, 800.0, 600.0, false).unwrap();

    // Surface is squarer than the 800x600 target, so width drives scale.
    scene.resize(ResizeMode::Fit, 400, 400);
    assert_eq!(scene.camera().viewport_width, 800.0);
    assert_eq!(scene.camera().viewport_height, 800.0);
}

#[test]
fn skeletons_and_quads_interleave_in_one_batcher_pass() {
    let (ctx, _) = Context::headless();
    let tex = texture(&ctx);

    let slot = Slot::new(Some(Attachment::Region(RegionAttachment {
        world_vertices: [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
        uvs: [0.0; 8],
        color: Color::white(),
        texture: tex.clone(),
    })));
    let skeleton = Skeleton::new(vec![slot]);

    let mut scene = SceneRenderer::new(&ctx, 800.0, 600.0, false).unwrap();
    scene.begin().unwrap();
    scene.draw_skeleton(&skeleton, false, None, None).unwrap();
    scene.draw_texture(&tex, 0.0, 0.0, 1.0, 1.0, None).unwrap();
    scene.end().unwrap();

    // Same texture, same blend mode: a single draw call for both.
    assert_eq!(scene.batcher_draw_calls(), 1);
}
