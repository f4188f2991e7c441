extern crate meshbatch;

use meshbatch::gfx::device::DeviceEvent;
use meshbatch::gfx::MAX_BATCH_TRIANGLES;
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

// 4 vertices, stride 8 (x, y, rgba, uv).
fn quad() -> Vec<f32> {
    let mut v = Vec::new();
    for i in 0..4 {
        v.extend_from_slice(&[i as f32, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }
    v
}

#[test]
fn flushes_only_on_texture_change() {
    let (ctx, _events) = Context::headless();
    let shader = ShaderProgram::colored_textured(&ctx).unwrap();
    let a = texture(&ctx);
    let b = texture(&ctx);

    let mut batcher = PolygonBatcher::new(&ctx, false).unwrap();
    batcher.begin(&shader).unwrap();
    batcher.draw(&a, &quad(), &QUAD_TRIANGLES).unwrap();
    batcher.draw(&a, &quad(), &QUAD_TRIANGLES).unwrap();
    batcher.draw(&b, &quad(), &QUAD_TRIANGLES).unwrap();
    batcher.draw(&b, &quad(), &QUAD_TRIANGLES).unwrap();
    batcher.draw(&a, &quad(), &QUAD_TRIANGLES).unwrap();
    batcher.end().unwrap();

    assert_eq!(batcher.draw_calls(), 3);
}

#[test]
fn same_texture_batches_with_offset_indices() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored_textured(&ctx).unwrap();
    let tex = texture(&ctx);

    let mut batcher = PolygonBatcher::new(&ctx, false).unwrap();
    batcher.begin(&shader).unwrap();
    batcher.draw(&tex, &quad(), &QUAD_TRIANGLES).unwrap();
    let triangle = quad();
    batcher.draw(&tex, &triangle[..24], &[0, 1, 2]).unwrap();
    batcher.end().unwrap();

    assert_eq!(batcher.draw_calls(), 1);

    let uploads: Vec<Vec<u16>> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            DeviceEvent::UploadIndices(_, data) => Some(data.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(uploads, vec![vec![0, 1, 2, 2, 3, 0, 4, 5, 6]]);
}

#[test]
fn identical_blend_mode_is_free() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored_textured(&ctx).unwrap();
    let tex = texture(&ctx);

    let mut batcher = PolygonBatcher::new(&ctx, false).unwrap();
    batcher.begin(&shader).unwrap();
    batcher.draw(&tex, &quad(), &QUAD_TRIANGLES).unwrap();

    let before = events
        .borrow()
        .iter()
        .filter(|e| match e {
            DeviceEvent::SetBlendFunction(..) => true,
            _ => false,
        })
        .count();

    // The defaults; nothing should flush and no device state should move.
    batcher
        .set_blend_mode(
            BlendFactor::SrcAlpha,
            BlendFactor::One,
            BlendFactor::OneMinusSrcAlpha,
        )
        .unwrap();

    assert_eq!(batcher.draw_calls(), 0);
    let after = events
        .borrow()
        .iter()
        .filter(|e| match e {
            DeviceEvent::SetBlendFunction(..) => true,
            _ => false,
        })
        .count();
    assert_eq!(before, after);

    batcher.end().unwrap();
}

#[test]
fn blend_change_flushes_pending_geometry() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored_textured(&ctx).unwrap();
    let tex = texture(&ctx);

    let mut batcher = PolygonBatcher::new(&ctx, false).unwrap();
    batcher.begin(&shader).unwrap();
    batcher.draw(&tex, &quad(), &QUAD_TRIANGLES).unwrap();
    batcher
        .set_blend_mode(BlendFactor::SrcAlpha, BlendFactor::One, BlendFactor::One)
        .unwrap();

    // Queued geometry rendered under the factors it was recorded with.
    assert_eq!(batcher.draw_calls(), 1);

    batcher.draw(&tex, &quad(), &QUAD_TRIANGLES).unwrap();
    batcher.end().unwrap();
    assert_eq!(batcher.draw_calls(), 2);

    let blends: Vec<_> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            DeviceEvent::SetBlendFunction(s, sa, d) => Some((*s, *sa, *d)),
            _ => None,
        })
        .collect();
    assert_eq!(
        blends,
        vec![
            (
                BlendFactor::SrcAlpha,
                BlendFactor::One,
                BlendFactor::OneMinusSrcAlpha
            ),
            (BlendFactor::SrcAlpha, BlendFactor::One, BlendFactor::One),
        ]
    );
}

#[test]
fn draw_outside_begin_end_is_an_error() {
    let (ctx, _) = Context::headless();
    let shader = ShaderProgram::colored_textured(&ctx).unwrap();
    let tex = texture(&ctx);

    let mut batcher = PolygonBatcher::new(&ctx, false).unwrap();
    match batcher.draw(&tex, &quad(), &QUAD_TRIANGLES) {
        Err(Error::InvalidUsage(_)) => {}
        other => panic!("expected InvalidUsage, got {:?}", other),
    }
    match batcher.end() {
        Err(Error::InvalidUsage(_)) => {}
        other => panic!("expected InvalidUsage, got {:?}", other),
    }

    batcher.begin(&shader).unwrap();
    match batcher.begin(&shader) {
        Err(Error::InvalidUsage(_)) => {}
        other => panic!("expected InvalidUsage, got {:?}", other),
    }
}

#[test]
fn blend_mode_outside_begin_end_is_an_error() {
    let (ctx, events) = Context::headless();

    let mut batcher = PolygonBatcher::new(&ctx, false).unwrap();
    match batcher.set_blend_mode(BlendFactor::One, BlendFactor::One, BlendFactor::One) {
        Err(Error::InvalidUsage(_)) => {}
        other => panic!("expected InvalidUsage, got {:?}", other),
    }

    // Nothing reached the device either.
    let blends = events
        .borrow()
        .iter()
        .filter(|e| match e {
            DeviceEvent::SetBlendFunction(..) => true,
            _ => false,
        })
        .count();
    assert_eq!(blends, 0);
}

#[test]
fn oversized_draw_is_rejected() {
    let (ctx, _) = Context::headless();
    let shader = ShaderProgram::colored_textured(&ctx).unwrap();
    let tex = texture(&ctx);

    // Room for a single triangle only.
    let mut batcher = PolygonBatcher::with_capacity(&ctx, false, 1).unwrap();
    batcher.begin(&shader).unwrap();
    match batcher.draw(&tex, &quad(), &QUAD_TRIANGLES) {
        Err(Error::CapacityExceeded(_)) => {}
        other => panic!("expected CapacityExceeded, got {:?}", other),
    }
    batcher.end().unwrap();
}

#[test]
fn capacity_above_the_index_range_is_rejected() {
    let (ctx, _) = Context::headless();
    match PolygonBatcher::with_capacity(&ctx, false, MAX_BATCH_TRIANGLES + 1) {
        Err(Error::InvalidArgument(_)) => {}
        other => {
            panic!("expected InvalidArgument, got {:?}", other.map(|_| ()))
        }
    }
}

#[test]
fn full_batch_flushes_and_continues() {
    let (ctx, _) = Context::headless();
    let shader = ShaderProgram::colored_textured(&ctx).unwrap();
    let tex = texture(&ctx);

    // Two triangles of room; each quad needs two.
    let mut batcher = PolygonBatcher::with_capacity(&ctx, false, 2).unwrap();
    batcher.begin(&shader).unwrap();
    batcher.draw(&tex, &quad(), &QUAD_TRIANGLES).unwrap();
    batcher.draw(&tex, &quad(), &QUAD_TRIANGLES).unwrap();
    assert_eq!(batcher.draw_calls(), 1);
    batcher.end().unwrap();
    assert_eq!(batcher.draw_calls(), 2);
}
