//! The demo scene as data.
//!
//! Object placements, light constants, and the clear color live in
//! [`SceneConfig`] so the frame loop and the tests read from one place.
//! `SceneConfig::default()` is the built-in scene: one model drawn twice,
//! sixteen point lights.

use std::path::PathBuf;

use glam::Vec3;

/// One placement of the scene model: translation plus uniform scale.
#[derive(Clone, Copy, Debug)]
pub struct ObjectPlacement {
    pub position: Vec3,
    pub scale: f32,
}

/// Everything that defines the fixed demo scene.
#[derive(Clone, Debug)]
pub struct SceneConfig {
    /// Model loaded at startup. Missing file falls back to a built-in cube.
    pub model_path: PathBuf,
    pub objects: Vec<ObjectPlacement>,
    pub light_count: usize,
    /// Linear attenuation coefficient shared by all lights.
    pub linear: f32,
    /// Quadratic attenuation coefficient shared by all lights.
    pub quadratic: f32,
    /// Ambient contribution factor in the lighting pass.
    pub ambient: f32,
    pub clear_color: wgpu::Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("assets/model.stl"),
            objects: vec![
                ObjectPlacement {
                    position: Vec3::new(-0.1, 0.0, -0.5),
                    scale: 0.25,
                },
                ObjectPlacement {
                    position: Vec3::new(-0.1, 0.0, 1.0),
                    scale: 0.25,
                },
            ],
            light_count: 16,
            linear: 2.0,
            quadratic: 3.0,
            ambient: 0.1,
            clear_color: wgpu::Color {
                r: 0.05,
                g: 0.05,
                b: 0.05,
                a: 1.0,
            },
        }
    }
}
