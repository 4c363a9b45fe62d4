use crate::device::GpuContext;
use bytemuck::{Pod, Zeroable};
use cloudlabel_core::{Error, Point3f, Result, Rgb, TriangleMesh};
use nalgebra::Matrix4;
use std::sync::Arc;
use tracing::{debug, warn};
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Corners of the two triangles covering one point sprite
const QUAD_CORNERS: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// Maps OpenGL clip depth (-1..1) to the 0..1 range wgpu expects
#[rustfmt::skip]
pub fn opengl_to_wgpu_matrix() -> Matrix4<f32> {
    Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.5, 0.5,
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Vertex data for point sprites and mesh triangles
///
/// Sprite vertices carry a corner in -1..1 that the vertex shader expands to
/// a screen-space disc; mesh vertices use a zero corner and are drawn as is.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PointVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub corner: [f32; 2],
}

impl PointVertex {
    pub fn new(point: &Point3f, color: Rgb, corner: [f32; 2]) -> Self {
        Self {
            position: [point.x, point.y, point.z],
            color,
            corner,
        }
    }

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PointVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Six sprite vertices per point; `colors` must be as long as `points`
pub fn point_sprite_vertices(points: &[Point3f], colors: &[Rgb]) -> Vec<PointVertex> {
    points
        .iter()
        .zip(colors)
        .flat_map(|(point, &color)| QUAD_CORNERS.iter().map(move |&corner| PointVertex::new(point, color, corner)))
        .collect()
}

/// Flat triangle list for a mesh, using its vertex colors
pub fn mesh_vertices(mesh: &TriangleMesh) -> Vec<PointVertex> {
    mesh.faces
        .iter()
        .flat_map(|face| face.iter())
        .filter_map(|&index| {
            let vertex = mesh.vertices.get(index)?;
            Some(PointVertex::new(vertex, mesh.vertex_color(index), [0.0, 0.0]))
        })
        .collect()
}

/// Camera uniform data
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub viewport: [f32; 2],
    pub point_size: f32,
    pub _padding: f32,
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Sprite diameter in pixels
    pub point_size: f32,
    pub background_color: [f64; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            point_size: 2.0,
            background_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

struct VertexBatch {
    buffer: wgpu::Buffer,
    count: u32,
}

/// GPU point cloud renderer with an optional overlay batch for markers
pub struct PointCloudRenderer {
    pub gpu_context: GpuContext,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub render_pipeline: wgpu::RenderPipeline,
    pub camera_uniform: CameraUniform,
    pub camera_buffer: wgpu::Buffer,
    pub camera_bind_group: wgpu::BindGroup,
    pub config: RenderConfig,
    depth_view: wgpu::TextureView,
    cloud: Option<VertexBatch>,
    overlay: Option<VertexBatch>,
}

impl PointCloudRenderer {
    /// Create new point cloud renderer
    pub async fn new(window: Arc<Window>, config: RenderConfig) -> Result<Self> {
        let size = window.inner_size();
        let (gpu_context, surface) = GpuContext::for_window(window).await?;

        let surface_caps = surface.get_capabilities(&gpu_context.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| Error::Gpu("Surface reports no texture formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu_context.device, &surface_config);

        let camera_uniform = CameraUniform {
            view_proj: Matrix4::identity().into(),
            viewport: [surface_config.width as f32, surface_config.height as f32],
            point_size: config.point_size,
            _padding: 0.0,
        };

        let camera_buffer = gpu_context.create_buffer_init(
            "Camera Buffer",
            &[camera_uniform],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let camera_bind_group_layout = gpu_context.create_bind_group_layout(
            "camera_bind_group_layout",
            &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        );

        let camera_bind_group = gpu_context.create_bind_group(
            "camera_bind_group",
            &camera_bind_group_layout,
            &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        );

        let shader = gpu_context.create_shader_module("Point Cloud Shader", include_str!("shaders/point_cloud.wgsl"));

        let render_pipeline_layout = gpu_context.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Cloud Render Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let render_pipeline = gpu_context.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Cloud Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[PointVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        let depth_view = create_depth_view(&gpu_context.device, &surface_config);

        Ok(Self {
            gpu_context,
            surface,
            surface_config,
            render_pipeline,
            camera_uniform,
            camera_buffer,
            camera_bind_group,
            config,
            depth_view,
            cloud: None,
            overlay: None,
        })
    }

    /// Update camera view and projection matrices
    pub fn update_camera(&mut self, view_matrix: Matrix4<f32>, proj_matrix: Matrix4<f32>) {
        let view_proj = opengl_to_wgpu_matrix() * proj_matrix * view_matrix;
        self.camera_uniform.view_proj = view_proj.into();
        self.camera_uniform.viewport = [self.surface_config.width as f32, self.surface_config.height as f32];
        self.camera_uniform.point_size = self.config.point_size;

        self.gpu_context
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&self.camera_uniform));
    }

    /// Resize renderer surface
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.gpu_context.device, &self.surface_config);
            self.depth_view = create_depth_view(&self.gpu_context.device, &self.surface_config);
        }
    }

    /// Replace the point cloud geometry
    pub fn set_cloud(&mut self, vertices: &[PointVertex]) {
        self.cloud = self.upload("Point Cloud Vertex Buffer", vertices);
        debug!(vertices = vertices.len(), "cloud geometry uploaded");
    }

    /// Replace the overlay geometry drawn after the cloud
    pub fn set_overlay(&mut self, vertices: &[PointVertex]) {
        self.overlay = self.upload("Overlay Vertex Buffer", vertices);
    }

    fn upload(&self, label: &str, vertices: &[PointVertex]) -> Option<VertexBatch> {
        if vertices.is_empty() {
            return None;
        }
        Some(VertexBatch {
            buffer: self
                .gpu_context
                .create_buffer_init(label, vertices, wgpu::BufferUsages::VERTEX),
            count: vertices.len() as u32,
        })
    }

    /// Draw one frame
    pub fn render(&mut self) -> Result<()> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.gpu_context.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface texture request timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(Error::Gpu(format!("Failed to get surface texture: {}", e))),
        };

        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu_context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Point Cloud Render Encoder"),
            });

        {
            let [r, g, b, a] = self.config.background_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Point Cloud Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            for batch in [&self.cloud, &self.overlay].into_iter().flatten() {
                render_pass.set_vertex_buffer(0, batch.buffer.slice(..));
                render_pass.draw(0..batch.count, 0..1);
            }
        }

        self.gpu_context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
