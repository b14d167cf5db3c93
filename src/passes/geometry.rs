//! Geometry pass: rasterize the scene into the G-buffer.
//!
//! One pipeline with three color targets (position, normal, albedo+spec)
//! and a depth attachment. Camera uniforms are uploaded once per frame;
//! per-object model uniforms live in a single buffer addressed with
//! dynamic offsets so every draw in the pass sees its own transform.

use crate::gbuffer::{GBuffer, formats};
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Transform, Vertex3d};
use crate::passes::{CameraUniforms, UNIFORM_STRIDE};
use crate::texture::Texture;

/// Per-object uniforms for the geometry shader.
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ModelUniforms {
    model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, for normals under scaling.
    normal_matrix: [[f32; 4]; 4],
    /// Specular intensity written to the G-buffer alpha channel.
    specular: f32,
    _pad: [f32; 3],
}

/// An albedo texture bound for the geometry pass. Build one per texture
/// with [`GeometryPass::bind_texture`] and reuse it every frame; bind
/// groups are not free to allocate in the draw loop.
pub struct BoundTexture {
    bind_group: wgpu::BindGroup,
}

/// One object to rasterize into the G-buffer this frame.
pub struct SceneDraw<'a> {
    pub mesh: &'a Mesh,
    pub transform: Transform,
    /// Albedo binding; `None` uses the pass's white fallback.
    pub texture: Option<&'a BoundTexture>,
    /// Specular intensity stored alongside the albedo.
    pub specular: f32,
}

pub struct GeometryPass {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    max_draws: usize,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    default_binding: BoundTexture,
}

impl GeometryPass {
    /// Build the pass, sizing the per-draw uniform buffer for `max_draws`
    /// objects per frame.
    pub fn new(gpu: &GpuContext, max_draws: usize) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Geometry Pass Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/geometry.wgsl").into()),
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Geometry Camera Uniforms"),
            size: std::mem::size_of::<CameraUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Geometry Camera Bind Group Layout"),
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
            label: Some("Geometry Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let model_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Geometry Model Uniforms"),
            size: UNIFORM_STRIDE * max_draws.max(1) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let model_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Geometry Model Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: true,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<ModelUniforms>() as u64,
                        ),
                    },
                    count: None,
                }],
            });

        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Geometry Model Bind Group"),
            layout: &model_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &model_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<ModelUniforms>() as u64),
                }),
            }],
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Geometry Texture Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        // The bind group keeps the white texture's view and sampler alive.
        let default_binding = Self::make_texture_bind_group(
            device,
            &texture_bind_group_layout,
            &Texture::white(gpu),
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Geometry Pipeline Layout"),
            bind_group_layouts: &[
                &camera_bind_group_layout,
                &model_bind_group_layout,
                &texture_bind_group_layout,
            ],
            push_constant_ranges: &[],
        });

        let color_target = |format| {
            Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Geometry Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs"),
                buffers: &[Vertex3d::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs"),
                targets: &[
                    color_target(formats::POSITION),
                    color_target(formats::NORMAL),
                    color_target(formats::ALBEDO_SPEC),
                ],
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

        Self {
            pipeline,
            camera_buffer,
            camera_bind_group,
            model_buffer,
            model_bind_group,
            max_draws,
            texture_bind_group_layout,
            default_binding,
        }
    }

    fn make_texture_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
    ) -> BoundTexture {
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Geometry Texture Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
        });
        BoundTexture { bind_group }
    }

    /// Bind an albedo texture for use in [`SceneDraw`]s.
    pub fn bind_texture(&self, gpu: &GpuContext, texture: &Texture) -> BoundTexture {
        Self::make_texture_bind_group(&gpu.device, &self.texture_bind_group_layout, texture)
    }

    /// Record the geometry pass: clear the G-buffer and draw every object.
    ///
    /// Draws beyond the pass's `max_draws` capacity are skipped with a log
    /// message rather than corrupting another object's uniforms.
    pub fn render(
        &self,
        gpu: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        gbuffer: &GBuffer,
        camera: &CameraUniforms,
        draws: &[SceneDraw],
    ) {
        gpu.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*camera]));

        let mut draw_count = draws.len();
        if draw_count > self.max_draws {
            log::warn!(
                "geometry pass capacity is {} draws, got {}; extra draws skipped",
                self.max_draws,
                draw_count
            );
            draw_count = self.max_draws;
        }

        for (i, draw) in draws[..draw_count].iter().enumerate() {
            let model = draw.transform.matrix();
            let uniforms = ModelUniforms {
                model: model.to_cols_array_2d(),
                normal_matrix: model.inverse().transpose().to_cols_array_2d(),
                specular: draw.specular,
                _pad: [0.0; 3],
            };
            gpu.queue.write_buffer(
                &self.model_buffer,
                i as u64 * UNIFORM_STRIDE,
                bytemuck::cast_slice(&[uniforms]),
            );
        }

        let clear_attachment = |view| {
            Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Geometry Pass"),
            color_attachments: &[
                clear_attachment(&gbuffer.position_view),
                clear_attachment(&gbuffer.normal_view),
                clear_attachment(&gbuffer.albedo_spec_view),
            ],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &gbuffer.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);

        for (i, draw) in draws[..draw_count].iter().enumerate() {
            let offset = (i as u64 * UNIFORM_STRIDE) as u32;
            pass.set_bind_group(1, &self.model_bind_group, &[offset]);

            let binding = draw.texture.unwrap_or(&self.default_binding);
            pass.set_bind_group(2, &binding.bind_group, &[]);

            pass.set_vertex_buffer(0, draw.mesh.vertex_buffer.slice(..));
            pass.set_index_buffer(draw.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..draw.mesh.index_count(), 0, 0..1);
        }
    }
}
