//! G-buffer allocation for the deferred pipeline.
//!
//! Three color targets plus a depth texture, all sized to the window:
//!
//! - `position`: world-space position, `Rgba16Float` (alpha unused)
//! - `normal`: world-space normal, `Rgba16Float` (alpha unused)
//! - `albedo_spec`: albedo RGB with specular intensity in alpha, `Rgba8Unorm`
//! - `depth`: `Depth32Float`, shared with the light-marker pass
//!
//! The buffer is rebuilt whenever the surface changes size, since every
//! attachment in a render pass must share one extent. An invalid
//! descriptor is a hard error: a framebuffer that can never be complete
//! is not worth rendering into.

use thiserror::Error;

use crate::gpu::GpuContext;

/// Texture formats for the G-buffer attachments.
pub mod formats {
    use wgpu::TextureFormat;

    /// World-space position needs more range than 8 bits per channel.
    pub const POSITION: TextureFormat = TextureFormat::Rgba16Float;
    pub const NORMAL: TextureFormat = TextureFormat::Rgba16Float;
    /// Albedo in RGB, specular intensity in alpha.
    pub const ALBEDO_SPEC: TextureFormat = TextureFormat::Rgba8Unorm;
    pub const DEPTH: TextureFormat = TextureFormat::Depth32Float;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GBufferError {
    #[error("G-buffer targets would be empty at {width}x{height}")]
    Empty { width: u32, height: u32 },
}

/// Dimensions for a G-buffer, validated before any GPU allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GBufferDesc {
    pub width: u32,
    pub height: u32,
}

impl GBufferDesc {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The completeness check: every attachment shares these dimensions, so
    /// the only way to build an unusable framebuffer is a zero extent.
    pub fn validate(&self) -> Result<(), GBufferError> {
        if self.width == 0 || self.height == 0 {
            return Err(GBufferError::Empty {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// The allocated G-buffer attachments.
pub struct GBuffer {
    desc: GBufferDesc,
    pub position: wgpu::Texture,
    pub position_view: wgpu::TextureView,
    pub normal: wgpu::Texture,
    pub normal_view: wgpu::TextureView,
    pub albedo_spec: wgpu::Texture,
    pub albedo_spec_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
}

impl GBuffer {
    /// Allocate all four attachments, failing fast on an invalid descriptor.
    pub fn new(gpu: &GpuContext, desc: GBufferDesc) -> Result<Self, GBufferError> {
        desc.validate()?;

        let make = |format, label| {
            let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: desc.width,
                    height: desc.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            });
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            (texture, view)
        };

        let (position, position_view) = make(formats::POSITION, "GBuffer Position");
        let (normal, normal_view) = make(formats::NORMAL, "GBuffer Normal");
        let (albedo_spec, albedo_spec_view) = make(formats::ALBEDO_SPEC, "GBuffer AlbedoSpec");
        let (depth, depth_view) = make(formats::DEPTH, "GBuffer Depth");

        Ok(Self {
            desc,
            position,
            position_view,
            normal,
            normal_view,
            albedo_spec,
            albedo_spec_view,
            depth,
            depth_view,
        })
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_viewport_is_complete() {
        assert_eq!(GBufferDesc::new(800, 600).validate(), Ok(()));
    }

    #[test]
    fn empty_extents_are_rejected() {
        assert_eq!(
            GBufferDesc::new(0, 600).validate(),
            Err(GBufferError::Empty {
                width: 0,
                height: 600
            })
        );
        assert_eq!(
            GBufferDesc::new(800, 0).validate(),
            Err(GBufferError::Empty {
                width: 800,
                height: 0
            })
        );
    }
}
