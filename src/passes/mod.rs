//! The deferred pipeline's render passes.
//!
//! Three fixed passes run in order every frame:
//!
//! 1. [`GeometryPass`] rasterizes the scene into the G-buffer's three color
//!    targets plus depth.
//! 2. [`LightingPass`] shades the whole screen from the G-buffer with every
//!    point light.
//! 3. [`MarkerPass`] draws a small colored cube at each light position,
//!    depth-tested against the G-buffer's depth so markers sit in the scene.
//!
//! The ordering lives in [`crate::renderer::STAGE_ORDER`]; the passes only
//! know how to record themselves into a command encoder.

mod geometry;
mod lighting;
mod markers;

pub use geometry::{BoundTexture, GeometryPass, SceneDraw};
pub use lighting::{LightingPass, MAX_LIGHTS};
pub use markers::MarkerPass;

/// Per-frame camera data shared by the geometry and marker pipelines.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    /// Combined projection * view matrix.
    pub view_proj: [[f32; 4]; 4],
    /// World-space camera position, for specular in the lighting pass.
    pub camera_pos: [f32; 3],
    pub _pad: f32,
}

/// Uniform buffer slots are spaced at this stride so per-draw uniforms can
/// share one buffer via dynamic offsets. 256 is the largest
/// `min_uniform_buffer_offset_alignment` wgpu's default limits allow.
pub(crate) const UNIFORM_STRIDE: u64 = 256;
