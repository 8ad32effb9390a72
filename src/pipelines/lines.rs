use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        model::{LineVertex, Vertex},
        texture::Texture,
    },
    overlay::ReferenceHelpers,
};

use super::basic::mk_render_pipeline;

/// Unlit coloured lines for the grid and axes.
pub fn mk_line_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Line Pipeline Layout"),
        bind_group_layouts: &[camera_bind_group_layout],
        push_constant_ranges: &[],
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Line Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("line.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        config.format,
        Some(wgpu::BlendState::REPLACE),
        Some(Texture::DEPTH_FORMAT),
        &[LineVertex::desc()],
        wgpu::PrimitiveTopology::LineList,
        None,
        shader,
    )
}

/// Uploaded helper geometry, tagged with the generation it was built from.
#[derive(Debug)]
pub struct HelperBuffers {
    pub buffer: wgpu::Buffer,
    pub count: u32,
    pub generation: u64,
}

impl HelperBuffers {
    pub fn new(device: &wgpu::Device, helpers: &ReferenceHelpers) -> Self {
        let vertices: Vec<LineVertex> = helpers.vertices().copied().collect();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Reference Helper Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            buffer,
            count: vertices.len() as u32,
            generation: helpers.generation,
        }
    }
}
