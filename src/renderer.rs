//! Frame orchestration for the deferred pipeline.
//!
//! [`DeferredRenderer`] owns the G-buffer and the three render passes and
//! records them into one command encoder per frame, in [`STAGE_ORDER`].

use crate::camera::FpsCamera;
use crate::gbuffer::{GBuffer, GBufferDesc, GBufferError};
use crate::gpu::GpuContext;
use crate::lights::LightRig;
use crate::passes::{CameraUniforms, GeometryPass, LightingPass, MAX_LIGHTS, MarkerPass, SceneDraw};
use crate::scene::SceneConfig;

/// The stages of a deferred frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Scene geometry into the G-buffer.
    Geometry,
    /// Full-screen shading from the G-buffer into the surface.
    Lighting,
    /// Light marker cubes composited over the shaded surface.
    Markers,
}

/// The fixed execution order of a frame. Lighting reads what geometry
/// wrote, and markers depth-test against the geometry pass's depth, so
/// the order is not configurable.
pub const STAGE_ORDER: [RenderStage; 3] = [
    RenderStage::Geometry,
    RenderStage::Lighting,
    RenderStage::Markers,
];

pub struct DeferredRenderer {
    gbuffer: GBuffer,
    geometry: GeometryPass,
    lighting: LightingPass,
    markers: MarkerPass,
    clear_color: wgpu::Color,
}

impl DeferredRenderer {
    /// Build the G-buffer and all three passes for the surface's current
    /// extent. Fails if the surface has a zero dimension.
    pub fn new(gpu: &GpuContext, scene: &SceneConfig, max_draws: usize) -> Result<Self, GBufferError> {
        let gbuffer = GBuffer::new(gpu, GBufferDesc::new(gpu.width(), gpu.height()))?;
        let geometry = GeometryPass::new(gpu, max_draws);
        let lighting = LightingPass::new(gpu, &gbuffer, scene.ambient);
        let markers = MarkerPass::new(gpu, MAX_LIGHTS);
        Ok(Self {
            gbuffer,
            geometry,
            lighting,
            markers,
            clear_color: scene.clear_color,
        })
    }

    /// Rebuild the G-buffer to match the surface after a resize. All
    /// attachments in a pass must share one extent, so the G-buffer
    /// cannot stay at its old size.
    pub fn resize(&mut self, gpu: &GpuContext) -> Result<(), GBufferError> {
        self.gbuffer = GBuffer::new(gpu, GBufferDesc::new(gpu.width(), gpu.height()))?;
        self.lighting.rebind_gbuffer(gpu, &self.gbuffer);
        Ok(())
    }

    /// Record and submit one frame.
    ///
    /// Surface errors are returned to the caller; `Lost` and `Outdated`
    /// are recoverable by reconfiguring the surface.
    pub fn render_frame(
        &self,
        gpu: &GpuContext,
        camera: &FpsCamera,
        rig: &LightRig,
        draws: &[SceneDraw],
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = gpu.surface.get_current_texture()?;
        let surface_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let view_proj = camera.projection_matrix(gpu.aspect()) * camera.view_matrix();
        let camera_uniforms = CameraUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera.position.to_array(),
            _pad: 0.0,
        };

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Deferred Frame Encoder"),
            });

        for stage in STAGE_ORDER {
            match stage {
                RenderStage::Geometry => {
                    self.geometry.render(
                        gpu,
                        &mut encoder,
                        &self.gbuffer,
                        &camera_uniforms,
                        draws,
                    );
                }
                RenderStage::Lighting => {
                    self.lighting.render(
                        gpu,
                        &mut encoder,
                        &surface_view,
                        self.clear_color,
                        camera.position,
                        rig.lights(),
                    );
                }
                RenderStage::Markers => {
                    self.markers.render(
                        gpu,
                        &mut encoder,
                        &surface_view,
                        &self.gbuffer,
                        &camera_uniforms,
                        rig.lights(),
                    );
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_run_geometry_first_and_markers_last() {
        assert_eq!(STAGE_ORDER[0], RenderStage::Geometry);
        assert_eq!(STAGE_ORDER[1], RenderStage::Lighting);
        assert_eq!(STAGE_ORDER[2], RenderStage::Markers);
    }
}
