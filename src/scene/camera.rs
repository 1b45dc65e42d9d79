// Orbit-style camera: eye moves on X/Y, always looks at a fixed target.
// Right-drag spins the scene about Z.

use glam::{Mat4, Vec3};

use crate::config::CameraConfig;

const MAX_X: f32 = 30.0;
const MIN_Y: f32 = 3.0;
const MAX_Y: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMove {
    /// W: towards -X
    Forward,
    /// S: towards +X
    Back,
    /// A: towards -Y
    Left,
    /// D: towards +Y
    Right,
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Model rotation about Z, radians
    pub rotation: f32,
    move_step: f32,
    rotate_step: f32,
    drag_start: Option<f32>,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::from(config.position),
            target: Vec3::from(config.target),
            up: Vec3::Z,
            fov_y: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            rotation: 0.0,
            move_step: config.move_step,
            rotate_step: config.rotate_step,
            drag_start: None,
        }
    }

    pub fn apply_move(&mut self, direction: CameraMove) {
        let step = self.move_step;
        let p = &mut self.position;
        match direction {
            // Unclamped towards the target side
            CameraMove::Forward => p.x -= step,
            CameraMove::Back => p.x = (p.x + step).min(MAX_X),
            CameraMove::Left => p.y = (p.y - step).max(MIN_Y),
            CameraMove::Right => p.y = (p.y + step).min(MAX_Y),
        }
    }

    pub fn begin_drag(&mut self, cursor_x: f32) {
        self.drag_start = Some(cursor_x);
    }

    pub fn end_drag(&mut self) {
        self.drag_start = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_start.is_some()
    }

    /// One rotation step per motion event, in the direction of the drag
    pub fn drag_to(&mut self, cursor_x: f32) {
        if let Some(start) = self.drag_start {
            if cursor_x - start > 0.0 {
                self.rotation += self.rotate_step;
            } else {
                self.rotation -= self.rotate_step;
            }
        }
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_rotation_z(self.rotation)
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Vulkan-style projection: 0..1 depth, Y pointing down in clip space
    pub fn projection(&self, aspect: f32) -> Mat4 {
        let mut proj = Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far);
        proj.y_axis.y *= -1.0;
        proj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default())
    }

    #[test]
    fn test_moves_and_clamps() {
        let mut cam = camera();
        cam.position = Vec3::new(29.9, 3.1, 2.0);

        cam.apply_move(CameraMove::Back);
        assert_relative_eq!(cam.position.x, 30.0);

        cam.apply_move(CameraMove::Left);
        assert_relative_eq!(cam.position.y, 3.0);

        cam.apply_move(CameraMove::Forward);
        assert_relative_eq!(cam.position.x, 29.8, epsilon = 1e-5);

        cam.position.y = 29.95;
        cam.apply_move(CameraMove::Right);
        assert_relative_eq!(cam.position.y, 30.0);
    }

    #[test]
    fn test_drag_rotates_by_direction() {
        let mut cam = camera();
        cam.drag_to(50.0);
        assert_eq!(cam.rotation, 0.0);

        cam.begin_drag(100.0);
        cam.drag_to(120.0);
        cam.drag_to(130.0);
        assert_relative_eq!(cam.rotation, 0.02);
        cam.drag_to(90.0);
        assert_relative_eq!(cam.rotation, 0.01);

        cam.end_drag();
        cam.drag_to(500.0);
        assert_relative_eq!(cam.rotation, 0.01);
    }

    #[test]
    fn test_projection_flips_y() {
        let cam = camera();
        let flipped = cam.projection(16.0 / 9.0);
        let plain = Mat4::perspective_rh(cam.fov_y, 16.0 / 9.0, cam.near, cam.far);
        assert_relative_eq!(flipped.y_axis.y, -plain.y_axis.y);
        assert_relative_eq!(flipped.x_axis.x, plain.x_axis.x);
    }

    #[test]
    fn test_view_looks_at_target() {
        let cam = camera();
        let target_in_view = cam.view().transform_point3(cam.target);
        // Right-handed view space looks down -Z
        assert_relative_eq!(target_in_view.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(target_in_view.y, 0.0, epsilon = 1e-5);
        assert!(target_in_view.z < 0.0);
    }
}
