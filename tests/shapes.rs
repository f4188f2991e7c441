extern crate meshbatch;

use meshbatch::gfx::device::DeviceEvent;
use meshbatch::prelude::*;

fn draw_arrays(events: &std::cell::RefCell<Vec<DeviceEvent>>) -> Vec<(Primitive, u32)> {
    events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            DeviceEvent::DrawArrays(p, _, count) => Some((*p, *count)),
            _ => None,
        })
        .collect()
}

fn uploads(events: &std::cell::RefCell<Vec<DeviceEvent>>) -> Vec<Vec<f32>> {
    events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            DeviceEvent::UploadVertices(_, data) => Some(data.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn circle_segment_heuristic_follows_the_radius() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    shapes.begin(&shader).unwrap();
    // cbrt(8) = 2, so 12 segments and 24 line vertices.
    shapes.circle(false, 0.0, 0.0, 8.0, None, 0).unwrap();
    shapes.end().unwrap();

    assert_eq!(draw_arrays(&events), vec![(Primitive::Lines, 24)]);
}

#[test]
fn filled_circle_closes_the_fan() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    shapes.begin(&shader).unwrap();
    shapes.circle(true, 0.0, 0.0, 10.0, None, 4).unwrap();
    shapes.end().unwrap();

    // 3 vertices per segment.
    assert_eq!(draw_arrays(&events), vec![(Primitive::Triangles, 12)]);
}

#[test]
fn topology_change_splits_the_batch() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    shapes.begin(&shader).unwrap();
    shapes.rect(true, 0.0, 0.0, 2.0, 2.0, None).unwrap();
    shapes.line(0.0, 0.0, 1.0, 1.0, None).unwrap();
    shapes.rect(true, 1.0, 1.0, 2.0, 2.0, None).unwrap();
    shapes.end().unwrap();

    assert_eq!(
        draw_arrays(&events),
        vec![
            (Primitive::Triangles, 6),
            (Primitive::Lines, 2),
            (Primitive::Triangles, 6),
        ]
    );
}

#[test]
fn caller_color_wins_over_the_default() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    shapes.set_color(Color::red());
    shapes.begin(&shader).unwrap();
    shapes
        .line(0.0, 0.0, 1.0, 0.0, Some(Color::green()))
        .unwrap();
    shapes.point(2.0, 2.0, None).unwrap();
    shapes.end().unwrap();

    let uploads = uploads(&events);
    // Lines flushed first, then the point batch.
    assert_eq!(uploads[0][2..6], [0.0, 1.0, 0.0, 1.0]);
    assert_eq!(uploads[1][2..6], [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn curve_emits_its_segment_count() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    shapes.begin(&shader).unwrap();
    shapes
        .curve(0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 0.0, 8, None)
        .unwrap();
    shapes.end().unwrap();

    assert_eq!(draw_arrays(&events), vec![(Primitive::Lines, 18)]);
}

#[test]
fn curve_endpoint_is_exact() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    shapes.begin(&shader).unwrap();
    shapes
        .curve(0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0, 0.0, 8, None)
        .unwrap();
    shapes.end().unwrap();

    let uploads = uploads(&events);
    let data = &uploads[0];
    let last = data.len() - 6;
    assert_eq!(data[last], 10.0);
    assert_eq!(data[last + 1], 0.0);
}

#[test]
fn zero_segment_curve_is_rejected() {
    let (ctx, _) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    shapes.begin(&shader).unwrap();
    match shapes.curve(0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 0, None) {
        Err(Error::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
    shapes.end().unwrap();
}

#[test]
fn degenerate_polygon_is_rejected() {
    let (ctx, _) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    shapes.begin(&shader).unwrap();
    match shapes.polygon(&[0.0, 0.0, 1.0, 1.0], 0, 2, None) {
        Err(Error::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
    shapes.end().unwrap();
}

#[test]
fn polygon_closes_back_to_the_first_point() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let points = [0.0, 0.0, 4.0, 0.0, 4.0, 4.0];
    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    shapes.begin(&shader).unwrap();
    shapes.polygon(&points, 0, 3, None).unwrap();
    shapes.end().unwrap();

    let uploads = uploads(&events);
    let data = &uploads[0];
    assert_eq!(data.len(), 6 * 6);
    // The last line ends where the polygon started.
    assert_eq!(data[30], 0.0);
    assert_eq!(data[31], 0.0);
}

#[test]
fn drawing_outside_begin_end_is_an_error() {
    let (ctx, _) = Context::headless();
    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    match shapes.point(0.0, 0.0, None) {
        Err(Error::InvalidUsage(_)) => {}
        other => panic!("expected InvalidUsage, got {:?}", other),
    }
}

#[test]
fn blend_mode_outside_begin_end_is_an_error() {
    let (ctx, events) = Context::headless();
    let mut shapes = ShapeRenderer::new(&ctx).unwrap();
    match shapes.set_blend_mode(BlendFactor::One, BlendFactor::One, BlendFactor::One) {
        Err(Error::InvalidUsage(_)) => {}
        other => panic!("expected InvalidUsage, got {:?}", other),
    }
    assert!(events.borrow().is_empty());
}
