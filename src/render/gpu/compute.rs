//! Compute pipeline for sphere tracing.
//!
//! Owns the wgpu compute pipeline, the sphere storage buffer, the camera
//! uniform and the output storage texture, plus a small render pipeline
//! that blits the traced frame to a target view.
//!
//! ## Usage
//! ```ignore
//! let mut tracer = SphereTraceCompute::new(&device, width, height, format);
//! tracer.upload_scene(&device, &scene)?;
//! tracer.update_camera(&queue, &uniform);
//! tracer.dispatch(&mut encoder); // writes the output texture
//! tracer.blit(&mut encoder, &target_view);
//! ```

use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::scene::{records_as_bytes, Scene};
use crate::util::{Error, Result};

/// WGSL sources embedded at compile time.
const TRACE_WGSL: &str = include_str!("trace.wgsl");
const BLIT_WGSL: &str = include_str!("blit.wgsl");

/// Workgroup size (must match @workgroup_size in trace.wgsl).
const WG_SIZE: u32 = 8;

/// Sphere trace compute pipeline state.
pub struct SphereTraceCompute {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: Option<wgpu::BindGroup>,

    // Packed sphere records, uploaded per scene
    spheres_buffer: Option<wgpu::Buffer>,
    sphere_count: u32,

    camera_buffer: wgpu::Buffer,

    // Output texture the kernel writes (rgba8unorm storage)
    output_texture: wgpu::Texture,
    output_view: wgpu::TextureView,

    width: u32,
    height: u32,

    /// Frames dispatched since the last resize; seeds the per-frame jitter.
    pub frame_count: u32,

    scene_ready: bool,

    // Blit pipeline (traced output -> screen)
    blit_pipeline: wgpu::RenderPipeline,
    blit_bind_group_layout: wgpu::BindGroupLayout,
    blit_bind_group: Option<wgpu::BindGroup>,
    blit_sampler: wgpu::Sampler,
}

impl SphereTraceCompute {
    /// Create the pipelines and an output texture of the given size.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trace_shader"),
            source: wgpu::ShaderSource::Wgsl(TRACE_WGSL.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("trace_bind_group_layout"),
            entries: &[
                // @binding(0) sphere records storage
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // @binding(1) camera uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // @binding(2) output storage texture
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: wgpu::TextureFormat::Rgba8Unorm,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trace_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("trace_compute_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("trace_camera_buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (output_texture, output_view) = Self::create_output(device, width, height);

        // Blit pipeline (traced output -> screen)
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("trace_blit_shader"),
            source: wgpu::ShaderSource::Wgsl(BLIT_WGSL.into()),
        });

        let blit_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("trace_blit_bgl"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
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

        let blit_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("trace_blit_pl"),
            bind_group_layouts: &[&blit_bind_group_layout],
            push_constant_ranges: &[],
        });

        let blit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("trace_blit_pipeline"),
            layout: Some(&blit_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let blit_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("trace_blit_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let blit_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trace_blit_bg"),
            layout: &blit_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&output_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&blit_sampler),
                },
            ],
        }));

        Self {
            pipeline,
            bind_group_layout,
            bind_group: None,
            spheres_buffer: None,
            sphere_count: 0,
            camera_buffer,
            output_texture,
            output_view,
            width,
            height,
            frame_count: 0,
            scene_ready: false,
            blit_pipeline,
            blit_bind_group_layout,
            blit_bind_group,
            blit_sampler,
        }
    }

    /// Create the output storage texture. COPY_SRC is included so headless
    /// rendering can read the frame back.
    fn create_output(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("trace_output"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        (tex, view)
    }

    /// Recreate the output texture if the viewport size changed.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        let (tex, view) = Self::create_output(device, width, height);
        self.output_texture = tex;
        self.output_view = view;
        self.frame_count = 0; // restart the jitter sequence
        self.rebuild_bind_group(device);
    }

    /// Upload the packed scene. Verifies the byte length against the
    /// record stride before handing the buffer to the GPU.
    pub fn upload_scene(&mut self, device: &wgpu::Device, scene: &Scene) -> Result<()> {
        let records = scene.pack();
        let bytes = records_as_bytes(&records);
        if bytes.len() != scene.packed_size() {
            return Err(Error::BufferSizeMismatch {
                expected: scene.packed_size(),
                actual: bytes.len(),
            });
        }

        self.spheres_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("trace_spheres"),
            contents: bytes,
            usage: wgpu::BufferUsages::STORAGE,
        }));
        self.sphere_count = scene.len() as u32;
        self.scene_ready = true;
        self.rebuild_bind_group(device);
        Ok(())
    }

    /// Rebuild bind groups after a buffer or texture change.
    fn rebuild_bind_group(&mut self, device: &wgpu::Device) {
        let Some(spheres) = &self.spheres_buffer else {
            self.bind_group = None;
            return;
        };

        self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trace_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: spheres.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&self.output_view),
                },
            ],
        }));

        // The blit bind group references the output view too.
        self.blit_bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("trace_blit_bg"),
            layout: &self.blit_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&self.output_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.blit_sampler),
                },
            ],
        }));
    }

    /// Write the camera uniform for the next dispatch.
    pub fn update_camera(&mut self, queue: &wgpu::Queue, uniform: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(uniform));
    }

    /// Number of spheres in the uploaded scene.
    pub fn sphere_count(&self) -> u32 {
        self.sphere_count
    }

    /// Dispatch the kernel. Returns false if no scene is uploaded yet.
    pub fn dispatch(&mut self, encoder: &mut wgpu::CommandEncoder) -> bool {
        let Some(bg) = &self.bind_group else {
            return false;
        };
        if !self.scene_ready {
            return false;
        }

        self.frame_count += 1;

        let wg_x = self.width.div_ceil(WG_SIZE);
        let wg_y = self.height.div_ceil(WG_SIZE);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("trace_compute_pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bg, &[]);
        pass.dispatch_workgroups(wg_x, wg_y, 1);

        true
    }

    /// The traced output (for blitting or readback).
    pub fn output_view(&self) -> &wgpu::TextureView {
        &self.output_view
    }

    pub fn output_texture(&self) -> &wgpu::Texture {
        &self.output_texture
    }

    /// Whether a scene is uploaded and the kernel can run.
    pub fn is_ready(&self) -> bool {
        self.scene_ready && self.bind_group.is_some()
    }

    /// Current output dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Blit the traced output to a render target. Call after `dispatch`.
    pub fn blit(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView) {
        let Some(bg) = &self.blit_bind_group else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("trace_blit_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.blit_pipeline);
        pass.set_bind_group(0, bg, &[]);
        pass.draw(0..3, 0..1); // fullscreen triangle
    }
}
