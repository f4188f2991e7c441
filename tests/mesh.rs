extern crate meshbatch;

use meshbatch::gfx::device::DeviceEvent;
use meshbatch::prelude::*;

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
fn oversized_write_leaves_contents_untouched() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut mesh = Mesh::new(
        &ctx,
        vec![VertexAttribute::position(), VertexAttribute::color()],
        2,
        0,
    )
    .unwrap();

    let two = [
        0.0, 0.0, 1.0, 1.0, 1.0, 1.0, //
        1.0, 0.0, 1.0, 1.0, 1.0, 1.0,
    ];
    mesh.set_vertices(&two).unwrap();

    let three = [0.5f32; 18];
    match mesh.set_vertices(&three) {
        Err(Error::CapacityExceeded(_)) => {}
        other => panic!("expected CapacityExceeded, got {:?}", other),
    }

    assert_eq!(mesh.num_vertices(), 2);
    mesh.draw(&shader, Primitive::Points).unwrap();
    assert_eq!(uploads(&events), vec![two.to_vec()]);
}

#[test]
fn repeated_writes_upload_once_per_draw() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut mesh = Mesh::new(
        &ctx,
        vec![VertexAttribute::position(), VertexAttribute::color()],
        8,
        0,
    )
    .unwrap();

    mesh.set_vertices(&[0.0; 6]).unwrap();
    mesh.set_vertices(&[1.0; 6]).unwrap();
    mesh.draw(&shader, Primitive::Points).unwrap();

    // Only the last write reaches the device.
    assert_eq!(uploads(&events), vec![vec![1.0; 6]]);

    // A clean draw re-issues no upload.
    mesh.draw(&shader, Primitive::Points).unwrap();
    assert_eq!(uploads(&events).len(), 1);

    let draws = events
        .borrow()
        .iter()
        .filter(|e| match e {
            DeviceEvent::DrawArrays(..) => true,
            _ => false,
        })
        .count();
    assert_eq!(draws, 2);
}

#[test]
fn indexed_meshes_draw_elements() {
    let (ctx, events) = Context::headless();
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut mesh = Mesh::new(
        &ctx,
        vec![VertexAttribute::position(), VertexAttribute::color()],
        4,
        6,
    )
    .unwrap();
    mesh.set_vertices(&[0.0; 24]).unwrap();
    mesh.set_indices(&[0, 1, 2, 2, 3, 0]).unwrap();
    mesh.draw(&shader, Primitive::Triangles).unwrap();

    let events = events.borrow();
    assert!(events
        .iter()
        .any(|e| *e == DeviceEvent::DrawElements(Primitive::Triangles, 6, 0)));
}

#[test]
fn index_capacity_is_enforced() {
    let (ctx, _) = Context::headless();
    let mut mesh = Mesh::new(&ctx, vec![VertexAttribute::position()], 4, 3).unwrap();

    match mesh.set_indices(&[0, 1, 2, 0]) {
        Err(Error::CapacityExceeded(_)) => {}
        other => panic!("expected CapacityExceeded, got {:?}", other),
    }
    assert_eq!(mesh.num_indices(), 0);
}

#[test]
fn unknown_attribute_name_is_an_error() {
    let (ctx, _) = Context::headless();
    // The colored shader has no a_texCoords attribute.
    let shader = ShaderProgram::colored(&ctx).unwrap();

    let mut mesh = Mesh::new(
        &ctx,
        vec![VertexAttribute::position(), VertexAttribute::tex_coords()],
        4,
        0,
    )
    .unwrap();
    mesh.set_vertices(&[0.0; 8]).unwrap();

    match mesh.draw(&shader, Primitive::Points) {
        Err(Error::LocationNotFound(_)) => {}
        other => panic!("expected LocationNotFound, got {:?}", other),
    }
}
