//! A 2D orthographic camera.

use crate::math::prelude::*;
use crate::math::{ortho, Matrix4, Vector3, Vector4};

/// Orthographic camera with position, zoom and a logical viewport. The
/// combined projection-view matrix is recomputed by [`OrthoCamera::update`];
/// mutate the public fields, then call it.
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    pub position: Vector3<f32>,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,

    projection_view: Matrix4<f32>,
    inverse_projection_view: Matrix4<f32>,
}

impl OrthoCamera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = OrthoCamera {
            position: Vector3::new(0.0, 0.0, 0.0),
            viewport_width,
            viewport_height,
            zoom: 1.0,
            near: 0.0,
            far: 200.0,
            projection_view: Matrix4::identity(),
            inverse_projection_view: Matrix4::identity(),
        };
        camera.update();
        camera
    }

    /// Recomputes the projection-view matrix and its inverse from the
    /// current position, zoom and viewport.
    pub fn update(&mut self) {
        let half_w = self.viewport_width / 2.0;
        let half_h = self.viewport_height / 2.0;
        let projection = ortho(
            self.zoom * -half_w,
            self.zoom * half_w,
            self.zoom * -half_h,
            self.zoom * half_h,
            self.near,
            self.far,
        );
        let view = Matrix4::from_translation(-self.position);

        self.projection_view = projection * view;
        self.inverse_projection_view = self
            .projection_view
            .invert()
            .unwrap_or_else(Matrix4::identity);
    }

    pub fn projection_view(&self) -> &Matrix4<f32> {
        &self.projection_view
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
        self.update();
    }

    /// Maps window coordinates (origin top-left, y down) into world space.
    pub fn screen_to_world(
        &self,
        screen: Vector3<f32>,
        screen_width: f32,
        screen_height: f32,
    ) -> Vector3<f32> {
        let x = screen.x;
        let y = screen_height - screen.y - 1.0;
        let ndc = Vector4::new(
            2.0 * x / screen_width - 1.0,
            2.0 * y / screen_height - 1.0,
            2.0 * screen.z - 1.0,
            1.0,
        );

        project(&self.inverse_projection_view, ndc)
    }

    /// Maps world coordinates into window coordinates.
    pub fn world_to_screen(
        &self,
        world: Vector3<f32>,
        screen_width: f32,
        screen_height: f32,
    ) -> Vector3<f32> {
        let v = project(&self.projection_view, world.extend(1.0));
        Vector3::new(
            screen_width * (v.x + 1.0) / 2.0,
            screen_height * (v.y + 1.0) / 2.0,
            (v.z + 1.0) / 2.0,
        )
    }
}

fn project(m: &Matrix4<f32>, v: Vector4<f32>) -> Vector3<f32> {
    let v = m * v;
    let w = if v.w != 0.0 { v.w } else { 1.0 };
    Vector3::new(v.x / w, v.y / w, v.z / w)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn screen_world_round_trip() {
        let mut camera = OrthoCamera::new(800.0, 600.0);
        camera.position = Vector3::new(100.0, 50.0, 0.0);
        camera.update();

        let screen = Vector3::new(400.0, 300.0, 0.0);
        let world = camera.screen_to_world(screen, 800.0, 600.0);
        let back = camera.world_to_screen(world, 800.0, 600.0);

        // screen_to_world flips the window's top-left origin;
        // world_to_screen hands back bottom-origin coordinates.
        assert!((back.x - screen.x).abs() < 1e-3);
        assert!((back.y - (600.0 - screen.y - 1.0)).abs() < 1e-3);
    }

    #[test]
    fn center_of_screen_maps_to_camera_position() {
        let mut camera = OrthoCamera::new(800.0, 600.0);
        camera.position = Vector3::new(25.0, -40.0, 0.0);
        camera.update();

        // Window y axis points down, so the exact center is off by the
        // one-pixel bias in the mapping.
        let world = camera.screen_to_world(Vector3::new(400.0, 299.0, 0.0), 800.0, 600.0);
        assert!((world.x - 25.0).abs() < 1.0);
        assert!((world.y - -40.0).abs() < 1.0);
    }
}
