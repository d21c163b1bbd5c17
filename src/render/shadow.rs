//! Offscreen depth targets and the two shadow-pass pipelines.
//!
//! The directional light renders the scene once into a 2D depth map through
//! its orthographic light-space matrix. The point light renders six times,
//! once per cube face, and stores linear light-to-surface distance instead of
//! device depth. Both targets are created once at startup and sampled by the
//! main pass for the rest of the process lifetime.

use bytemuck::{bytes_of, Pod, Zeroable};
use glam::Mat4;
use thiserror::Error;

use crate::lights::PointLight;

use super::{vertex_layout, GpuDrawable};

const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Raised when the offscreen shadow targets or their pipelines fail
/// validation at creation time.
#[derive(Debug, Error)]
#[error("shadow targets failed validation: {message}")]
pub struct ShadowTargetError {
    message: String,
}

/// Fixed shadow configuration. Resolutions and frustum planes are hand tuned
/// startup constants, not runtime surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    pub directional_resolution: u32,
    pub cube_resolution: u32,
    pub point_near: f32,
    pub point_far: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            directional_resolution: 1024,
            cube_resolution: 1024,
            point_near: 0.5,
            point_far: 25.0,
        }
    }
}

/// Both shadow targets plus the depth-only pipelines that fill them.
pub struct ShadowMaps {
    settings: ShadowSettings,
    _directional_texture: wgpu::Texture,
    _cube_texture: wgpu::Texture,
    directional_view: wgpu::TextureView,
    face_views: [wgpu::TextureView; 6],
    directional_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
    directional_uniform: wgpu::Buffer,
    directional_bind_group: wgpu::BindGroup,
    face_uniforms: [wgpu::Buffer; 6],
    face_bind_groups: [wgpu::BindGroup; 6],
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl ShadowMaps {
    /// Creates the depth targets, samplers and pipelines.
    ///
    /// Everything is built inside a validation error scope; a broken target
    /// is reported once here as a fatal setup error rather than per frame.
    pub fn new(
        device: &wgpu::Device,
        object_layout: &wgpu::BindGroupLayout,
        settings: ShadowSettings,
    ) -> Result<Self, ShadowTargetError> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let maps = Self::create(device, object_layout, settings);
        let scope = device.pop_error_scope();
        let _ = device.poll(wgpu::PollType::Wait);
        if let Some(error) = pollster::block_on(scope) {
            return Err(ShadowTargetError {
                message: error.to_string(),
            });
        }
        Ok(maps)
    }

    fn create(
        device: &wgpu::Device,
        object_layout: &wgpu::BindGroupLayout,
        settings: ShadowSettings,
    ) -> Self {
        let directional_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("directional-shadow-map"),
            size: wgpu::Extent3d {
                width: settings.directional_resolution,
                height: settings.directional_resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let directional_view =
            directional_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let cube_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("point-shadow-cube"),
            size: wgpu::Extent3d {
                width: settings.cube_resolution,
                height: settings.cube_resolution,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let cube_view = cube_texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("point-shadow-cube-view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        // The render pass attaches one face at a time.
        let face_views: [wgpu::TextureView; 6] = std::array::from_fn(|face| {
            cube_texture.create_view(&wgpu::TextureViewDescriptor {
                label: Some("point-shadow-face-view"),
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_array_layer: face as u32,
                array_layer_count: Some(1),
                ..Default::default()
            })
        });

        let directional_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("directional-shadow-shader"),
            source: wgpu::ShaderSource::Wgsl(DIRECTIONAL_SHADER.into()),
        });
        let point_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("point-shadow-shader"),
            source: wgpu::ShaderSource::Wgsl(POINT_SHADER.into()),
        });

        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("light-space-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(
                            std::mem::size_of::<LightSpaceUniform>() as u64
                        )
                        .unwrap(),
                    ),
                },
                count: None,
            }],
        });
        let face_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cube-face-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<FaceUniform>() as u64)
                            .unwrap(),
                    ),
                },
                count: None,
            }],
        });

        let directional_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("directional-shadow-pipeline-layout"),
                bind_group_layouts: &[&light_layout, object_layout],
                push_constant_ranges: &[],
            });
        // Depth-only pass: no fragment stage, no material state.
        let directional_pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("directional-shadow-pipeline"),
                layout: Some(&directional_layout),
                vertex: wgpu::VertexState {
                    module: &directional_shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[vertex_layout()],
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: SHADOW_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    // rasterizer bias against acne on the receiving surfaces
                    bias: wgpu::DepthBiasState {
                        constant: 2,
                        slope_scale: 2.0,
                        clamp: 0.0,
                    },
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: None,
                multiview: None,
                cache: None,
            });

        let point_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("point-shadow-pipeline-layout"),
            bind_group_layouts: &[&face_layout, object_layout],
            push_constant_ranges: &[],
        });
        let point_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("point-shadow-pipeline"),
            layout: Some(&point_layout),
            vertex: wgpu::VertexState {
                module: &point_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: SHADOW_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            // No color targets; the fragment stage exists only to write the
            // linear normalized distance into the depth attachment.
            fragment: Some(wgpu::FragmentState {
                module: &point_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[],
            }),
            multiview: None,
            cache: None,
        });

        let directional_uniform = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("light-space-uniform"),
            size: std::mem::size_of::<LightSpaceUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let directional_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("light-space-bind-group"),
            layout: &light_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: directional_uniform.as_entire_binding(),
            }],
        });

        let face_uniforms: [wgpu::Buffer; 6] = std::array::from_fn(|_| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("cube-face-uniform"),
                size: std::mem::size_of::<FaceUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        let face_bind_groups: [wgpu::BindGroup; 6] = std::array::from_fn(|face| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("cube-face-bind-group"),
                layout: &face_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: face_uniforms[face].as_entire_binding(),
                }],
            })
        });

        let comparison_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("directional-shadow-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        let cube_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("point-shadow-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("shadow-sampling-layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::Cube,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::NonFiltering),
                        count: None,
                    },
                ],
            });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow-sampling-bind-group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&directional_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&comparison_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&cube_view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&cube_sampler),
                },
            ],
        });

        Self {
            settings,
            _directional_texture: directional_texture,
            _cube_texture: cube_texture,
            directional_view,
            face_views,
            directional_pipeline,
            point_pipeline,
            directional_uniform,
            directional_bind_group,
            face_uniforms,
            face_bind_groups,
            bind_group_layout,
            bind_group,
        }
    }

    pub fn settings(&self) -> &ShadowSettings {
        &self.settings
    }

    /// Layout of the sampling bind group consumed by the main pipeline.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Both depth targets plus their samplers, bound as group 2 of the main
    /// pass.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    /// Writes this frame's light transforms: the directional light-space
    /// matrix and one view-projection per cube face from the current point
    /// light position.
    pub(crate) fn update(&self, queue: &wgpu::Queue, light_space: Mat4, point: &PointLight) {
        let uniform = LightSpaceUniform {
            view_proj: light_space.to_cols_array_2d(),
        };
        queue.write_buffer(&self.directional_uniform, 0, bytes_of(&uniform));

        let projection =
            PointLight::cube_projection(self.settings.point_near, self.settings.point_far);
        for (buffer, view) in self.face_uniforms.iter().zip(point.cube_face_views()) {
            let uniform = FaceUniform {
                view_proj: (projection * view).to_cols_array_2d(),
                light_position: point.position.extend(self.settings.point_far).into(),
            };
            queue.write_buffer(buffer, 0, bytes_of(&uniform));
        }
    }

    /// Records the directional pass and the six cube-face passes, in that
    /// order, ahead of the main pass in the same encoder.
    pub(crate) fn record(&self, encoder: &mut wgpu::CommandEncoder, drawables: &[GpuDrawable]) {
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("directional-shadow-pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.directional_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.directional_pipeline);
            pass.set_bind_group(0, &self.directional_bind_group, &[]);
            draw_all(&mut pass, drawables);
        }

        for (face_view, face_bind_group) in self.face_views.iter().zip(&self.face_bind_groups) {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("point-shadow-pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: face_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.point_pipeline);
            pass.set_bind_group(0, face_bind_group, &[]);
            draw_all(&mut pass, drawables);
        }
    }
}

fn draw_all(pass: &mut wgpu::RenderPass<'_>, drawables: &[GpuDrawable]) {
    for drawable in drawables {
        pass.set_bind_group(1, &drawable.bind_group, &[]);
        pass.set_vertex_buffer(0, drawable.mesh.vertex.slice(..));
        pass.set_index_buffer(drawable.mesh.index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..drawable.mesh.index_count, 0, 0..1);
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct LightSpaceUniform {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FaceUniform {
    view_proj: [[f32; 4]; 4],
    light_position: [f32; 4],
}

const DIRECTIONAL_SHADER: &str = r#"
struct LightSpaceUniform {
    view_proj: mat4x4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    ambient: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> light: LightSpaceUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return light.view_proj * object.model * vec4<f32>(position, 1.0);
}
"#;

const POINT_SHADER: &str = r#"
struct FaceUniform {
    view_proj: mat4x4<f32>,
    light_position: vec4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    ambient: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> face: FaceUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(position, 1.0);
    out.position = face.view_proj * world_position;
    out.world_pos = world_position.xyz;
    return out;
}

// Depth stores light-to-surface distance over the far plane; device depth
// across six 90 degree frusta is too nonlinear to threshold against.
@fragment
fn fs_main(in: VertexOutput) -> @builtin(frag_depth) f32 {
    return distance(in.world_pos, face.light_position.xyz) / face.light_position.w;
}
"#;
