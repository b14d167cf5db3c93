//! # Pharos
//!
//! A deferred shading demo on wgpu.
//!
//! The frame renders in three fixed passes: geometry into a G-buffer
//! (world position, normal, albedo plus specular intensity), a full-screen
//! lighting pass that shades every pixel from the G-buffer with up to
//! sixteen animated point lights, and a marker pass that draws a small
//! cube at each light, depth-tested against the scene.
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     env_logger::init();
//!     pharos::run()
//! }
//! ```
//!
//! [`run_with_config`] takes a custom [`AppConfig`] and [`SceneConfig`] for
//! a different window or scene.

mod app;
mod camera;
mod clock;
mod gbuffer;
mod gpu;
mod input;
mod lights;
mod mesh;
mod model;
mod passes;
mod renderer;
mod scene;
mod texture;

pub use app::{AppConfig, CloseSignal, run, run_with_config};
pub use camera::FpsCamera;
pub use clock::FrameClock;
pub use gbuffer::{GBuffer, GBufferDesc, GBufferError, formats};
pub use gpu::{GpuContext, GpuError};
pub use input::Input;
pub use lights::{Light, LightRig};
pub use mesh::{Mesh, Transform, Vertex3d};
pub use model::{ModelError, RawGeometry, load_scene_model};
pub use passes::{
    BoundTexture, CameraUniforms, GeometryPass, LightingPass, MAX_LIGHTS, MarkerPass, SceneDraw,
};
pub use renderer::{DeferredRenderer, RenderStage, STAGE_ORDER};
pub use scene::{ObjectPlacement, SceneConfig};
pub use texture::Texture;
