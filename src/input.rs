//! Per-frame input snapshot.
//!
//! The app feeds winit events in via [`Input::handle_event`] and
//! [`Input::handle_device_event`], and resets the per-frame accumulators
//! with [`Input::begin_frame`] at the end of each frame. The camera and
//! quit handling read from the snapshot; nothing else touches winit event
//! types directly.
//!
//! Mouse look prefers raw device motion: a grabbed cursor is pinned in
//! place, so its reported window position stops changing and differencing
//! positions would leave the look input permanently zero. Cursor positions
//! are only differenced until the first raw delta arrives.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{DeviceEvent, ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard state plus mouse and scroll deltas.
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    last_cursor: Option<Vec2>,
    /// True once raw device motion has been seen; cursor positions then
    /// stop contributing to the mouse delta.
    raw_motion: bool,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            keys_down: HashSet::new(),
            keys_pressed: HashSet::new(),
            last_cursor: None,
            raw_motion: false,
            mouse_delta: Vec2::ZERO,
            scroll_delta: Vec2::ZERO,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset per-frame state. Call once per frame after the frame callback.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if !self.keys_down.contains(&key) {
                                self.keys_pressed.insert(key);
                            }
                            self.keys_down.insert(key);
                        }
                        ElementState::Released => {
                            self.keys_down.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.push_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    winit::event::MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    winit::event::MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
                self.scroll_delta += d;
            }
            _ => {}
        }
    }

    /// Process a device event. Raw mouse motion keeps mouse look working
    /// while the cursor is grabbed.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.push_mouse_motion(Vec2::new(delta.0 as f32, delta.1 as f32));
        }
    }

    fn push_mouse_motion(&mut self, delta: Vec2) {
        self.raw_motion = true;
        self.mouse_delta += delta;
    }

    fn push_cursor(&mut self, pos: Vec2) {
        // Position differencing is the fallback for an ungrabbed cursor.
        // No delta on the first event, which would otherwise snap the view
        // toward wherever the cursor entered the window.
        if !self.raw_motion {
            if let Some(last) = self.last_cursor {
                self.mouse_delta += pos - last;
            }
        }
        self.last_cursor = Some(pos);
    }

    /// True if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// True if the key went down this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Mouse movement accumulated this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll wheel movement accumulated this frame, in lines.
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_cursor_event_produces_no_delta() {
        let mut input = Input::new();
        input.push_cursor(Vec2::new(400.0, 300.0));
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn cursor_deltas_accumulate_within_a_frame() {
        let mut input = Input::new();
        input.push_cursor(Vec2::new(100.0, 100.0));
        input.push_cursor(Vec2::new(110.0, 95.0));
        input.push_cursor(Vec2::new(112.0, 95.0));
        assert_eq!(input.mouse_delta(), Vec2::new(12.0, -5.0));

        input.begin_frame();
        assert_eq!(input.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn raw_motion_accumulates_while_the_cursor_is_pinned() {
        let mut input = Input::new();
        // A grabbed cursor reports the same position forever.
        for _ in 0..100 {
            input.push_cursor(Vec2::new(400.0, 300.0));
        }
        assert_eq!(input.mouse_delta(), Vec2::ZERO);

        input.push_mouse_motion(Vec2::new(3.0, -2.0));
        input.push_mouse_motion(Vec2::new(1.0, 1.0));
        assert_eq!(input.mouse_delta(), Vec2::new(4.0, -1.0));
    }

    #[test]
    fn raw_motion_supersedes_cursor_position_deltas() {
        let mut input = Input::new();
        input.push_mouse_motion(Vec2::new(2.0, 0.0));
        input.push_cursor(Vec2::new(10.0, 10.0));
        input.push_cursor(Vec2::new(50.0, 50.0));
        assert_eq!(input.mouse_delta(), Vec2::new(2.0, 0.0));
    }
}
