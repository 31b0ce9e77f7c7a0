//! GPU-resident vertex model

use ash::vk;

use crate::render::api::{GpuDevice, GpuVertexBuffer};
use crate::render::primitives::Vertex;
use crate::render::{RenderError, RenderResult};

/// Vertex buffer uploaded once and drawn as a triangle list
///
/// The buffer is destroyed when the model is dropped.
pub struct Model<D: GpuDevice> {
    device: D,
    vertex_buffer: GpuVertexBuffer,
}

impl<D: GpuDevice> Model<D> {
    /// Upload `vertices` into host-visible memory
    pub fn new(device: D, vertices: &[Vertex]) -> RenderResult<Self> {
        let vertex_count = u32::try_from(vertices.len())
            .map_err(|_| RenderError::BufferCreationFailed(vk::Result::ERROR_OUT_OF_HOST_MEMORY))?;
        let vertex_buffer = device.create_vertex_buffer(bytemuck::cast_slice(vertices), vertex_count)?;
        log::debug!("Uploaded model with {} vertices", vertex_count);
        Ok(Self {
            device,
            vertex_buffer,
        })
    }

    /// Bind the vertex buffer at binding 0
    pub fn bind(&self, command_buffer: vk::CommandBuffer) {
        self.device
            .cmd_bind_vertex_buffers(command_buffer, 0, &[self.vertex_buffer.buffer], &[0]);
    }

    /// Draw every vertex once
    pub fn draw(&self, command_buffer: vk::CommandBuffer) {
        self.device
            .cmd_draw(command_buffer, self.vertex_buffer.vertex_count, 1, 0, 0);
    }

    /// Number of vertices in the buffer
    pub fn vertex_count(&self) -> u32 {
        self.vertex_buffer.vertex_count
    }

    /// Underlying buffer handle
    pub fn buffer(&self) -> vk::Buffer {
        self.vertex_buffer.buffer
    }
}

impl<D: GpuDevice> Drop for Model<D> {
    fn drop(&mut self) {
        self.device.destroy_vertex_buffer(&self.vertex_buffer);
    }
}
