//! WGPU-based implementation of [`RenderContext`]
//!
//! Calls arrive in the immediate, state-machine order the scene issues them.
//! Each `draw_arrays` snapshots the current program's uniform block, the bound
//! vertex array and the texture on the program's diffuse unit; `end_frame`
//! uploads every snapshot into one dynamic-offset uniform buffer and replays
//! the draws in a single depth-tested render pass.

use std::collections::{HashMap, HashSet};

use log::{debug, error, info, warn};
use wgpu::{util::DeviceExt, TextureFormat};

use super::{
    context::{ProgramId, RenderContext, TextureId, TextureImage, UniformValue, VertexArrayId},
    uniforms::{DrawUniforms, UniformState},
};
use crate::{
    error::{RenderError, Result, ShaderStage},
    gfx::{resources::texture_resource::TextureResource, scene::vertex::Vertex},
    wgpu_utils::{binding_types, DynamicUniformBuffer},
};

const INITIAL_DRAW_CAPACITY: usize = 64;

struct GpuVertexArray {
    buffer: wgpu::Buffer,
}

struct GpuTexture {
    label: String,
    resource: TextureResource,
    bind_group: wgpu::BindGroup,
}

struct GpuProgram {
    pipeline: wgpu::RenderPipeline,
    state: UniformState,
    unknown_uniforms: HashSet<String>,
}

struct DrawCommand {
    program: ProgramId,
    vertex_array: VertexArrayId,
    texture: Option<TextureId>,
    first: u32,
    count: u32,
    uniforms: DrawUniforms,
}

pub struct WgpuContext {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    format: TextureFormat,
    depth_texture: TextureResource,

    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_buffer: DynamicUniformBuffer<DrawUniforms>,
    uniform_bind_group: wgpu::BindGroup,
    fallback_texture: GpuTexture,

    vertex_arrays: HashMap<VertexArrayId, GpuVertexArray>,
    textures: HashMap<TextureId, GpuTexture>,
    programs: HashMap<ProgramId, GpuProgram>,
    next_id: u32,

    bound_vertex_array: Option<VertexArrayId>,
    bound_textures: HashMap<u32, TextureId>,
    current_program: Option<ProgramId>,
    viewport: (u32, u32),
    clear_color: wgpu::Color,
    draws: Vec<DrawCommand>,
}

impl WgpuContext {
    /// Creates a context presenting to `window`
    ///
    /// # Errors
    /// [`RenderError::ContextCreation`] when no surface, adapter or device
    /// can be obtained.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<WgpuContext> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::ContextCreation(format!("surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::ContextCreation(format!("adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Stellar Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::ContextCreation(format!("device: {e}")))?;
        info!("Using adapter {}", adapter.get_info().name);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| RenderError::ContextCreation("surface reports no formats".into()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniforms Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: binding_types::dynamic_uniform(DynamicUniformBuffer::<DrawUniforms>::element_size()),
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Diffuse Map Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: binding_types::texture_2d(),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Phong Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment;
        let uniform_buffer = DynamicUniformBuffer::new(&device, alignment, INITIAL_DRAW_CAPACITY);
        let uniform_bind_group = Self::uniform_bind_group(&device, &uniform_layout, &uniform_buffer);

        let fallback_texture = Self::gpu_texture(
            &device,
            &queue,
            &texture_layout,
            "fallback_white",
            &TextureImage::solid([255, 255, 255, 255]),
        );

        Ok(WgpuContext {
            surface,
            device,
            queue,
            viewport: (config.width, config.height),
            config,
            format,
            depth_texture,
            uniform_layout,
            texture_layout,
            pipeline_layout,
            uniform_buffer,
            uniform_bind_group,
            fallback_texture,
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            programs: HashMap::new(),
            next_id: 0,
            bound_vertex_array: None,
            bound_textures: HashMap::new(),
            current_program: None,
            clear_color: wgpu::Color::BLACK,
            draws: Vec::new(),
        })
    }

    fn uniform_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        buffer: &DynamicUniformBuffer<DrawUniforms>,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Draw Uniforms Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.binding_resource(),
            }],
        })
    }

    fn gpu_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        image: &TextureImage,
    ) -> GpuTexture {
        let resource = TextureResource::create_from_image(device, queue, image, label);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Bind Group", label)),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&resource.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&resource.sampler),
                },
            ],
        });
        GpuTexture {
            label: label.to_string(),
            resource,
            bind_group,
        }
    }

    fn next_handle(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn shader_module(&self, stage: ShaderStage, source: &str) -> Result<wgpu::ShaderModule> {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} shader", stage)),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(e) => Err(RenderError::ShaderCompile {
                stage,
                message: e.to_string(),
            }),
            None => Ok(module),
        }
    }

    /// Discards draws recorded since the last frame
    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }

    /// Submits the recorded draws and presents
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped; a
    /// timed-out one is skipped. Anything else is a [`RenderError::Surface`].
    pub fn end_frame(&mut self) -> Result<()> {
        let draws = std::mem::take(&mut self.draws);

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out waiting for a surface texture");
                return Ok(());
            }
            Err(e) => {
                error!("Surface failure: {e}");
                return Err(RenderError::Surface(e.to_string()));
            }
        };
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        if self.uniform_buffer.ensure_capacity(&self.device, draws.len()) {
            self.uniform_bind_group =
                Self::uniform_bind_group(&self.device, &self.uniform_layout, &self.uniform_buffer);
        }
        let blocks: Vec<DrawUniforms> = draws.iter().map(|d| d.uniforms).collect();
        self.uniform_buffer.write(&self.queue, &blocks);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let width = self.viewport.0.min(self.config.width) as f32;
            let height = self.viewport.1.min(self.config.height) as f32;
            render_pass.set_viewport(0.0, 0.0, width, height, 0.0, 1.0);

            for (index, draw) in draws.iter().enumerate() {
                let (Some(program), Some(vertex_array)) = (
                    self.programs.get(&draw.program),
                    self.vertex_arrays.get(&draw.vertex_array),
                ) else {
                    // Released between recording and submission.
                    continue;
                };
                let texture = draw
                    .texture
                    .and_then(|id| self.textures.get(&id))
                    .unwrap_or(&self.fallback_texture);

                render_pass.set_pipeline(&program.pipeline);
                render_pass.set_bind_group(
                    0,
                    &self.uniform_bind_group,
                    &[self.uniform_buffer.offset(index)],
                );
                render_pass.set_bind_group(1, &texture.bind_group, &[]);
                render_pass.set_vertex_buffer(0, vertex_array.buffer.slice(..));
                render_pass.draw(draw.first..draw.first + draw.count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and recreates the depth buffer
    ///
    /// Zero-sized requests (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }
}

impl RenderContext for WgpuContext {
    fn create_vertex_array(&mut self, label: &str, vertices: &[Vertex]) -> VertexArrayId {
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Vertex Buffer", label)),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let id = VertexArrayId(self.next_handle());
        self.vertex_arrays.insert(id, GpuVertexArray { buffer });
        id
    }

    fn delete_vertex_array(&mut self, id: VertexArrayId) {
        if let Some(array) = self.vertex_arrays.remove(&id) {
            array.buffer.destroy();
        }
        if self.bound_vertex_array == Some(id) {
            self.bound_vertex_array = None;
        }
    }

    fn bind_vertex_array(&mut self, id: VertexArrayId) {
        self.bound_vertex_array = Some(id);
    }

    fn draw_arrays(&mut self, first: u32, count: u32) {
        let (Some(program_id), Some(vertex_array)) = (self.current_program, self.bound_vertex_array)
        else {
            debug!("draw_arrays without a program and vertex array bound");
            return;
        };
        let Some(program) = self.programs.get(&program_id) else {
            return;
        };
        self.draws.push(DrawCommand {
            program: program_id,
            vertex_array,
            texture: self
                .bound_textures
                .get(&program.state.diffuse_map_unit)
                .copied(),
            first,
            count,
            uniforms: program.state.uniforms,
        });
    }

    fn create_texture(&mut self, label: &str, image: &TextureImage) -> TextureId {
        let texture = Self::gpu_texture(&self.device, &self.queue, &self.texture_layout, label, image);
        let id = TextureId(self.next_handle());
        self.textures.insert(id, texture);
        id
    }

    fn update_texture(&mut self, id: TextureId, image: &TextureImage) {
        let Some(texture) = self.textures.get_mut(&id) else {
            return;
        };
        if texture.resource.matches(image) {
            TextureResource::write_levels(&self.queue, &texture.resource.texture, image);
        } else {
            let replacement = Self::gpu_texture(
                &self.device,
                &self.queue,
                &self.texture_layout,
                &texture.label,
                image,
            );
            let old = std::mem::replace(texture, replacement);
            old.resource.texture.destroy();
        }
    }

    fn delete_texture(&mut self, id: TextureId) {
        if let Some(texture) = self.textures.remove(&id) {
            texture.resource.texture.destroy();
        }
        self.bound_textures.retain(|_, bound| *bound != id);
    }

    fn bind_texture(&mut self, unit: u32, id: TextureId) {
        self.bound_textures.insert(unit, id);
    }

    fn compile_program(&mut self, vertex_src: &str, fragment_src: &str) -> Result<ProgramId> {
        let vertex = self.shader_module(ShaderStage::Vertex, vertex_src)?;
        let fragment = self.shader_module(ShaderStage::Fragment, fragment_src)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Phong Pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::desc()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: TextureResource::DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });
        if let Some(e) = pollster::block_on(self.device.pop_error_scope()) {
            return Err(RenderError::ShaderLink(e.to_string()));
        }

        let id = ProgramId(self.next_handle());
        self.programs.insert(
            id,
            GpuProgram {
                pipeline,
                state: UniformState::default(),
                unknown_uniforms: HashSet::new(),
            },
        );
        info!("Compiled shader program {:?}", id);
        Ok(id)
    }

    fn use_program(&mut self, id: ProgramId) {
        self.current_program = Some(id);
    }

    fn set_uniform(&mut self, program: ProgramId, name: &str, value: UniformValue) {
        let Some(program) = self.programs.get_mut(&program) else {
            return;
        };
        if !program.state.apply(name, value) && program.unknown_uniforms.insert(name.to_string()) {
            warn!("Ignoring unknown uniform '{}'", name);
        }
    }

    fn delete_program(&mut self, id: ProgramId) {
        self.programs.remove(&id);
        if self.current_program == Some(id) {
            self.current_program = None;
        }
    }

    fn viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    fn clear(&mut self, color: [f32; 4]) {
        let [r, g, b, a] = color.map(f64::from);
        self.clear_color = wgpu::Color { r, g, b, a };
    }
}
