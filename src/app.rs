//! Window lifecycle and the frame loop.
//!
//! The app starts in a `Pending` state and builds its GPU resources on the
//! first `resumed` callback, since winit only hands out windows there.
//! Every frame: advance the clock, apply input to the camera, animate the
//! light rig, then hand the scene to the renderer.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use crate::camera::FpsCamera;
use crate::clock::FrameClock;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::lights::LightRig;
use crate::mesh::{Mesh, Transform};
use crate::model::load_scene_model;
use crate::passes::SceneDraw;
use crate::renderer::DeferredRenderer;
use crate::scene::SceneConfig;

/// Window configuration.
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "pharos".to_string(),
            width: 800,
            height: 600,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// One-way shutdown latch. Once requested, the request never resets, so
/// a close can't be lost to a later frame observing stale state.
#[derive(Debug, Default)]
pub struct CloseSignal {
    requested: bool,
}

impl CloseSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        self.requested = true;
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: DeferredRenderer,
    camera: FpsCamera,
    input: Input,
    clock: FrameClock,
    rig: LightRig,
    mesh: Mesh,
    scene: SceneConfig,
    close: CloseSignal,
}

enum App {
    Pending { config: AppConfig, scene: SceneConfig },
    Running(Box<Running>),
    /// Setup failed in `resumed`; the error is carried out of the event
    /// loop so `run` can return it.
    Failed(anyhow::Error),
}

impl App {
    fn setup(
        event_loop: &ActiveEventLoop,
        config: &AppConfig,
        scene: SceneConfig,
    ) -> anyhow::Result<Running> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("failed to create window")?,
        );

        // Mouse-look wants raw deltas. Locked grab is not available on
        // every platform, so fall back to confining the cursor.
        if let Err(e) = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        {
            log::warn!("cursor grab unavailable: {e}");
        }
        window.set_cursor_visible(false);

        let gpu = GpuContext::new(window.clone()).context("failed to initialize GPU")?;

        let mesh = match load_scene_model(&scene.model_path) {
            Ok(geometry) => geometry.upload(&gpu),
            Err(e) => {
                log::warn!(
                    "could not load {}: {e}; using built-in cube",
                    scene.model_path.display()
                );
                Mesh::cube(&gpu)
            }
        };

        let renderer = DeferredRenderer::new(&gpu, &scene, scene.objects.len())
            .context("failed to build renderer")?;
        let rig = LightRig::new(scene.light_count, scene.linear, scene.quadratic);

        Ok(Running {
            window,
            gpu,
            renderer,
            camera: FpsCamera::new(),
            input: Input::new(),
            clock: FrameClock::new(),
            rig,
            mesh,
            scene,
            close: CloseSignal::new(),
        })
    }

    fn frame(state: &mut Running) {
        let now = Instant::now();
        let dt = state.clock.tick(now);
        let elapsed = state.clock.elapsed_at(now);

        if state.input.key_pressed(KeyCode::Escape) {
            state.close.request();
        }

        state.camera.update(&state.input, dt);
        state.rig.animate(elapsed);

        let draws: Vec<SceneDraw> = state
            .scene
            .objects
            .iter()
            .map(|obj| SceneDraw {
                mesh: &state.mesh,
                transform: Transform::from_position(obj.position).uniform_scale(obj.scale),
                texture: None,
                specular: 1.0,
            })
            .collect();

        match state
            .renderer
            .render_frame(&state.gpu, &state.camera, &state.rig, &draws)
        {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = (state.gpu.width(), state.gpu.height());
                state.gpu.resize(w, h);
                if let Err(e) = state.renderer.resize(&state.gpu) {
                    log::error!("could not rebuild render targets: {e}");
                    state.close.request();
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                state.close.request();
            }
            Err(e) => log::warn!("dropped frame: {e}"),
        }

        state.input.begin_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let App::Pending { config, scene } = self {
            let scene = std::mem::take(scene);
            *self = match Self::setup(event_loop, config, scene) {
                Ok(running) => App::Running(Box::new(running)),
                Err(e) => {
                    event_loop.exit();
                    App::Failed(e)
                }
            };
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        // Raw mouse deltas; the grabbed cursor's window position is pinned
        // and useless for look input.
        if let App::Running(state) = self {
            state.input.handle_device_event(&event);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let App::Running(state) = self else {
            return;
        };

        state.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                state.close.request();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state.gpu.resize(size.width, size.height);
                if let Err(e) = state.renderer.resize(&state.gpu) {
                    log::error!("could not rebuild render targets: {e}");
                    state.close.request();
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                Self::frame(state);
                if state.close.is_requested() {
                    event_loop.exit();
                } else {
                    state.window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Run the demo with the default window and scene.
pub fn run() -> anyhow::Result<()> {
    run_with_config(AppConfig::default(), SceneConfig::default())
}

/// Run the demo with a custom window and scene configuration.
pub fn run_with_config(config: AppConfig, scene: SceneConfig) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::Pending { config, scene };
    event_loop.run_app(&mut app).context("event loop error")?;

    match app {
        App::Failed(e) => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_signal_latches() {
        let mut close = CloseSignal::new();
        assert!(!close.is_requested());
        close.request();
        assert!(close.is_requested());
        close.request();
        assert!(close.is_requested());
    }

    #[test]
    fn default_config_matches_window() {
        let config = AppConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
    }
}
