use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use image::RgbaImage;
use wgpu::util::DeviceExt;
use wgpu::*;

use crate::controller::PlayerController;
use crate::error::CaptureError;
use crate::model::{RenderLayers, Scene};
use crate::utils::{Mesh, Vertex};
use crate::view::capture::FrameReadback;
use crate::view::gpu_init::GpuContext;

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    /// x: camera effect weight, zw: viewport size in pixels
    pub effect: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct ModelUniform {
    pub transform: [[f32; 4]; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: Buffer,
    pub index_buffer: Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    pub fn upload(device: &Device, mesh: &Mesh, label: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// One mesh on one render layer, with its own model transform.
struct LayeredMesh {
    mesh: MeshBuffer,
    layers: RenderLayers,
    model_buffer: Buffer,
    model_bind_group: BindGroup,
}

/// egui output for the frame, tessellated and ready to draw.
pub struct EguiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen: egui_wgpu::ScreenDescriptor,
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_layout(device: &Device, label: &str, visibility: ShaderStages) -> BindGroupLayout {
    device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_scene_pipeline(
    device: &Device,
    format: TextureFormat,
    globals_layout: &BindGroupLayout,
    model_layout: &BindGroupLayout,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("scene_pipeline_layout"),
        bind_group_layouts: &[globals_layout, model_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
                step_mode: VertexStepMode::Vertex,
                attributes: &[
                    VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
                    VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x3 },
                    VertexAttribute { offset: 24, shader_location: 2, format: VertexFormat::Float32x4 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: Some(Face::Back),
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// GPU resources for the scene and the egui overlay.
pub struct RenderState {
    pipeline: RenderPipeline,
    globals_buffer: Buffer,
    globals_bind_group: BindGroup,
    world: LayeredMesh,
    body: LayeredMesh,
    _depth_texture: Texture,
    depth_view: TextureView,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl RenderState {
    pub fn new(gpu: &GpuContext, scene: &Scene, body_half_extents: Vec3) -> Self {
        let device = gpu.device.as_ref();

        let globals_layout = uniform_layout(device, "globals_layout", ShaderStages::VERTEX_FRAGMENT);
        let model_layout = uniform_layout(device, "model_layout", ShaderStages::VERTEX);

        let globals_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
            label: Some("globals_buffer"),
            contents: bytemuck::bytes_of(&GlobalsUniform {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                effect: [0.0; 4],
            }),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[BindGroupEntry { binding: 0, resource: globals_buffer.as_entire_binding() }],
        });

        let layered = |mesh: &Mesh, layers: RenderLayers, label: &str| {
            let model_buffer = device.create_buffer_init(&util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&ModelUniform {
                    transform: Mat4::IDENTITY.to_cols_array_2d(),
                }),
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            });
            let model_bind_group = device.create_bind_group(&BindGroupDescriptor {
                label: Some(label),
                layout: &model_layout,
                entries: &[BindGroupEntry { binding: 0, resource: model_buffer.as_entire_binding() }],
            });
            LayeredMesh {
                mesh: MeshBuffer::upload(device, mesh, label),
                layers,
                model_buffer,
                model_bind_group,
            }
        };

        let (world_mesh, world_layers) = scene.world_mesh();
        let (body_mesh, body_layers) = Scene::body_mesh(body_half_extents);
        let world = layered(&world_mesh, world_layers, "world_mesh");
        let body = layered(&body_mesh, body_layers, "body_mesh");

        let pipeline = create_scene_pipeline(device, gpu.format, &globals_layout, &model_layout);
        let (depth_texture, depth_view) = create_depth_texture(device, gpu.config.width, gpu.config.height);
        let egui_renderer = egui_wgpu::Renderer::new(device, gpu.format, egui_wgpu::RendererOptions::default());

        Self {
            pipeline,
            globals_buffer,
            globals_bind_group,
            world,
            body,
            _depth_texture: depth_texture,
            depth_view,
            egui_renderer,
        }
    }

    pub fn resize(&mut self, device: &Device, width: u32, height: u32) {
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        self._depth_texture = depth_texture;
        self.depth_view = depth_view;
    }

    /// Draw one frame. With `capture` set, the finished frame (HUD included) is also
    /// read back before it is presented.
    pub fn draw_frame(
        &mut self,
        gpu: &GpuContext,
        controller: &PlayerController,
        ui: EguiFrame,
        capture: bool,
    ) -> Result<Option<Result<RgbaImage, CaptureError>>, SurfaceError> {
        let device = gpu.device.as_ref();
        let queue = gpu.queue.as_ref();

        let globals = GlobalsUniform {
            view_proj: controller.view_proj().to_cols_array_2d(),
            effect: [
                controller.hud.effect_weight(),
                0.0,
                gpu.config.width as f32,
                gpu.config.height as f32,
            ],
        };
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let body_transform = Mat4::from_rotation_translation(
            Quat::from_rotation_y(controller.state().yaw.to_radians()),
            controller.body.position,
        );
        queue.write_buffer(
            &self.body.model_buffer,
            0,
            bytemuck::bytes_of(&ModelUniform { transform: body_transform.to_cols_array_2d() }),
        );

        let frame = gpu.surface.get_current_texture()?;
        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor { label: Some("encoder") });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color { r: 0.5, g: 0.8, b: 1.0, a: 1.0 }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations { load: LoadOp::Clear(1.0), store: StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.globals_bind_group, &[]);

            let mask = controller.rig.render_mask;
            for entry in [&self.world, &self.body] {
                if !mask.intersects(entry.layers) || entry.mesh.index_count == 0 {
                    continue;
                }
                rp.set_bind_group(1, &entry.model_bind_group, &[]);
                rp.set_vertex_buffer(0, entry.mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(entry.mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..entry.mesh.index_count, 0, 0..1);
            }
        }

        // Upload egui textures
        for (id, image_delta) in &ui.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &ui.primitives, &ui.screen);

        // Render egui overlay
        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations { load: LoadOp::Load, store: StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &ui.primitives, &ui.screen);
        }

        let readback = capture.then(|| FrameReadback::encode(device, &mut encoder, &frame.texture));

        queue.submit(std::iter::once(encoder.finish()));

        let captured = readback.map(|pending| pending.and_then(|r| r.read(device)));

        for id in &ui.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        frame.present();
        Ok(captured)
    }
}
