//! Render pipelines: `basic` for meshes, `lines` for the reference helpers.

pub mod basic;
pub mod lines;

#[derive(Debug)]
pub struct Pipelines {
    pub mesh: wgpu::RenderPipeline,
    pub lines: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            mesh: basic::mk_basic_pipeline(device, config, camera_bind_group_layout),
            lines: lines::mk_line_pipeline(device, config, camera_bind_group_layout),
        }
    }
}
