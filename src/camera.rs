//! A first-person camera driven by the per-frame input snapshot.
//!
//! The camera owns its own state (position, yaw/pitch, zoom); each frame
//! the app calls [`FpsCamera::update`] with the current [`Input`] and delta
//! time, then hands the camera to the renderer for view and projection
//! matrices. There is no process-wide camera state.

use glam::{Mat4, Vec3};
use winit::keyboard::KeyCode;

use crate::input::Input;

const MIN_PITCH: f32 = -std::f32::consts::FRAC_PI_2 + 0.01;
const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Vertical FOV bounds in degrees, adjusted by the scroll wheel.
const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;

/// A free-flying first-person camera.
///
/// Yaw 0 looks toward -Z; positive pitch looks up. `zoom` is the vertical
/// field of view in degrees.
#[derive(Clone, Copy, Debug)]
pub struct FpsCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Mouse sensitivity in radians per pixel.
    pub sensitivity: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FpsCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw: 0.0,
            pitch: 0.0,
            zoom: MAX_ZOOM,
            speed: 2.5,
            sensitivity: 0.003,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl FpsCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the camera position.
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Forward direction from the current yaw and pitch.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
        .normalize_or_zero()
    }

    /// Right direction on the horizontal plane, used for strafing.
    fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin()).normalize_or_zero()
    }

    /// Apply one frame of input: mouse look, scroll zoom, WASD movement.
    pub fn update(&mut self, input: &Input, dt: f32) {
        let mouse = input.mouse_delta();
        self.yaw += mouse.x * self.sensitivity;
        self.pitch = (self.pitch - mouse.y * self.sensitivity).clamp(MIN_PITCH, MAX_PITCH);

        self.zoom = (self.zoom - input.scroll_delta().y).clamp(MIN_ZOOM, MAX_ZOOM);

        let forward = self.forward();
        let right = self.right();
        let mut velocity = Vec3::ZERO;
        if input.key_down(KeyCode::KeyW) {
            velocity += forward;
        }
        if input.key_down(KeyCode::KeyS) {
            velocity -= forward;
        }
        if input.key_down(KeyCode::KeyA) {
            velocity -= right;
        }
        if input.key_down(KeyCode::KeyD) {
            velocity += right;
        }
        if velocity.length_squared() > 0.0 {
            self.position += velocity.normalize() * self.speed * dt;
        }
    }

    /// World-to-view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    /// Perspective projection for the given aspect ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_clamps_to_fov_bounds() {
        let mut camera = FpsCamera::new();
        camera.zoom = 100.0;
        camera.update(&Input::new(), 0.016);
        assert_eq!(camera.zoom, MAX_ZOOM);

        camera.zoom = 0.0;
        camera.update(&Input::new(), 0.016);
        assert_eq!(camera.zoom, MIN_ZOOM);
    }

    #[test]
    fn pitch_stays_short_of_the_poles() {
        let mut camera = FpsCamera::new();
        camera.pitch = 10.0;
        camera.update(&Input::new(), 0.016);
        assert!(camera.pitch <= MAX_PITCH);

        camera.pitch = -10.0;
        camera.update(&Input::new(), 0.016);
        assert!(camera.pitch >= MIN_PITCH);
    }

    #[test]
    fn raw_mouse_motion_turns_the_camera() {
        let mut camera = FpsCamera::new();
        let mut input = Input::new();

        // With the cursor grabbed its reported position never changes;
        // look input arrives as raw device deltas instead.
        input.handle_device_event(&winit::event::DeviceEvent::MouseMotion {
            delta: (100.0, 0.0),
        });

        let yaw_before = camera.yaw;
        camera.update(&input, 0.016);
        assert!(camera.yaw > yaw_before);
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = FpsCamera::new();
        let forward = camera.forward();
        assert!((forward - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-6);

        // The origin sits 3 units in front of the default camera.
        let view_space = camera.view_matrix().transform_point3(Vec3::ZERO);
        assert!((view_space - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-5);
    }
}
