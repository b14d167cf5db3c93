//! Light marker pass: draw a small emissive cube at each light.
//!
//! Runs after the lighting pass, loading both the shaded surface and the
//! G-buffer depth so the markers occlude correctly against the scene.

use crate::gbuffer::{GBuffer, formats};
use crate::gpu::GpuContext;
use crate::lights::Light;
use crate::mesh::{Mesh, Transform};
use crate::passes::{CameraUniforms, UNIFORM_STRIDE};

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MarkerUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

pub struct MarkerPass {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    marker_buffer: wgpu::Buffer,
    marker_bind_group: wgpu::BindGroup,
    max_markers: usize,
    cube: Mesh,
    /// Edge length of each marker cube.
    pub scale: f32,
}

impl MarkerPass {
    pub fn new(gpu: &GpuContext, max_markers: usize) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Light Marker Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/light_marker.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Marker Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Marker Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Marker Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let marker_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Marker Uniforms"),
            size: UNIFORM_STRIDE * max_markers.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let marker_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Marker Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<MarkerUniforms>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let marker_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Marker Bind Group"),
            layout: &marker_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &marker_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<MarkerUniforms>() as u64),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Marker Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout, &marker_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Marker Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[crate::mesh::Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                front_face: wgpu::FrontFace::Ccw,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: formats::DEPTH,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let cube = Mesh::cube(gpu);

        Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            marker_buffer,
            marker_bind_group,
            max_markers,
            cube,
            scale: 0.125,
        }
    }

    /// Record the marker pass. Both the surface color and the G-buffer depth
    /// are loaded, not cleared, so markers composite over the lit scene and
    /// sort against its geometry.
    pub fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        gbuffer: &GBuffer,
        camera: &CameraUniforms,
        lights: &[Light],
    ) {
        gpu.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*camera]));

        let count = lights.len().min(self.max_markers);
        for (i, light) in lights[..count].iter().enumerate() {
            let model = Transform::from_position(light.position)
                .uniform_scale(self.scale)
                .matrix();
            let uniforms = MarkerUniforms {
                model: model.to_cols_array_2d(),
                color: [light.color.x, light.color.y, light.color.z, 1.0],
            };
            gpu.queue.write_buffer(
                &self.marker_buffer,
                i as u64 * UNIFORM_STRIDE,
                bytemuck::cast_slice(&[uniforms]),
            );
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Light Marker Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &gbuffer.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
        pass.set_index_buffer(self.cube.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        for i in 0..count {
            let offset = (i as u64 * UNIFORM_STRIDE) as u32;
            pass.set_bind_group(1, &self.marker_bind_group, &[offset]);
            pass.draw_indexed(0..self.cube.index_count(), 0, 0..1);
        }
    }
}
