//! Drawing a scene graph with the wgpu [`Context`].
//!
//! Mesh geometry is uploaded once per load ([`Renderer::upload`]); world
//! transforms are re-read every frame and written to each mesh's instance
//! buffer so animated nodes move without re-uploading vertices.

use wgpu::util::DeviceExt;

use crate::{
    camera::{Camera, Projection},
    context::Context,
    data_structures::{
        instance::InstanceRaw,
        model::{GpuMesh, ModelVertex},
        scene_graph::{MeshData, SceneNode, traverse},
    },
    overlay::ReferenceHelpers,
    pipelines::lines::HelperBuffers,
    viewport::{RenderTarget, ViewportConfig},
};

pub trait Renderer: RenderTarget {
    /// Create GPU buffers for every mesh of `scene`, replacing earlier uploads.
    fn upload(&mut self, scene: &dyn SceneNode);

    /// Draw `scene` (and the helpers, if any) from `camera`.
    fn render(
        &mut self,
        scene: &dyn SceneNode,
        camera: &Camera,
        projection: &Projection,
        helpers: Option<&ReferenceHelpers>,
    ) -> Result<(), wgpu::SurfaceError>;

    /// Clear to the background colour; used while no model is shown.
    fn render_background(&mut self) -> Result<(), wgpu::SurfaceError>;
}

impl RenderTarget for Context {
    fn backing_size(&self) -> ViewportConfig {
        ViewportConfig::new(self.config.width, self.config.height)
    }

    fn set_backing_size(&mut self, size: ViewportConfig) {
        self.resize(size.width, size.height);
    }
}

fn mk_gpu_mesh(device: &wgpu::Device, mesh: &MeshData, world: &cgmath::Matrix4<f32>) -> GpuMesh {
    let geometry = &mesh.geometry;
    let vertices: Vec<ModelVertex> = geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, position)| ModelVertex {
            position: *position,
            normal: geometry.normals.get(i).copied().unwrap_or_default(),
        })
        .collect();
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Vertex Buffer", mesh.name)),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = geometry.indices.as_ref().map(|indices| {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", mesh.name)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        })
    });
    let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{:?} Instance Buffer", mesh.name)),
        contents: bytemuck::cast_slice(&[InstanceRaw::from_world(world)]),
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
    });
    let num_elements = match &geometry.indices {
        Some(indices) => indices.len(),
        None => geometry.positions.len(),
    } as u32;
    GpuMesh {
        vertex_buffer,
        index_buffer,
        instance_buffer,
        num_elements,
    }
}

impl Context {
    fn begin_frame(
        &self,
    ) -> Result<Option<(wgpu::SurfaceTexture, wgpu::TextureView)>, wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(None);
        }
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Some((output, view)))
    }

    fn draw(
        &self,
        scene: Option<&dyn SceneNode>,
        draw_helpers: bool,
    ) -> Result<(), wgpu::SurfaceError> {
        let Some((output, view)) = self.begin_frame()? else {
            return Ok(());
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
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

            if let Some(scene) = scene {
                render_pass.set_pipeline(&self.pipelines.mesh);
                render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
                let meshes = &self.meshes;
                traverse(scene, &mut |node, _| {
                    let Some(gpu) = node.as_mesh().and_then(|mesh| meshes.get(&mesh.id)) else {
                        return;
                    };
                    if gpu.num_elements == 0 {
                        return;
                    }
                    render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                    render_pass.set_vertex_buffer(1, gpu.instance_buffer.slice(..));
                    match &gpu.index_buffer {
                        Some(index_buffer) => {
                            render_pass
                                .set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                            render_pass.draw_indexed(0..gpu.num_elements, 0, 0..1);
                        }
                        None => render_pass.draw(0..gpu.num_elements, 0..1),
                    }
                });
            }

            if let (true, Some(helpers)) = (draw_helpers, &self.helpers) {
                render_pass.set_pipeline(&self.pipelines.lines);
                render_pass.set_bind_group(0, &self.camera.bind_group, &[]);
                render_pass.set_vertex_buffer(0, helpers.buffer.slice(..));
                render_pass.draw(0..helpers.count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl Renderer for Context {
    fn upload(&mut self, scene: &dyn SceneNode) {
        let device = &self.device;
        let mut meshes = std::collections::HashMap::new();
        traverse(scene, &mut |node, world| {
            if let Some(mesh) = node.as_mesh() {
                meshes.insert(mesh.id, mk_gpu_mesh(device, mesh, world));
            }
        });
        log::info!("Uploaded {} meshes", meshes.len());
        self.meshes = meshes;
    }

    fn render(
        &mut self,
        scene: &dyn SceneNode,
        camera: &Camera,
        projection: &Projection,
        helpers: Option<&ReferenceHelpers>,
    ) -> Result<(), wgpu::SurfaceError> {
        self.camera.write(&self.queue, camera, projection);

        let (queue, meshes) = (&self.queue, &self.meshes);
        traverse(scene, &mut |node, world| {
            if let Some(gpu) = node.as_mesh().and_then(|mesh| meshes.get(&mesh.id)) {
                queue.write_buffer(
                    &gpu.instance_buffer,
                    0,
                    bytemuck::cast_slice(&[InstanceRaw::from_world(world)]),
                );
            }
        });

        match helpers {
            Some(helpers) => {
                let stale = self
                    .helpers
                    .as_ref()
                    .is_none_or(|uploaded| uploaded.generation != helpers.generation);
                if stale {
                    self.helpers = Some(HelperBuffers::new(&self.device, helpers));
                }
            }
            None => self.helpers = None,
        }

        self.draw(Some(scene), helpers.is_some())
    }

    fn render_background(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.draw(None, false)
    }
}
