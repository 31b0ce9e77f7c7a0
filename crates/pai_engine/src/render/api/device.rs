//! Device seam: resource creation and command recording

use ash::prelude::VkResult;
use ash::vk;

use crate::config::ShaderConfig;
use crate::render::pipeline::PipelineConfig;
use crate::render::RenderResult;

/// Vertex buffer living in host-visible, coherent memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuVertexBuffer {
    /// Buffer handle
    pub buffer: vk::Buffer,
    /// Backing memory
    pub memory: vk::DeviceMemory,
    /// Number of vertices stored
    pub vertex_count: u32,
}

/// Parameters of `vkCmdBeginRenderPass`
///
/// The render area always starts at (0, 0) and covers `extent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPassBegin {
    /// Render pass to begin
    pub render_pass: vk::RenderPass,
    /// Target framebuffer
    pub framebuffer: vk::Framebuffer,
    /// Render area extent
    pub extent: vk::Extent2D,
    /// Clear value of the color attachment
    pub clear_color: [f32; 4],
    /// Clear value of the depth attachment
    pub clear_depth: f32,
    /// Clear value of the stencil attachment
    pub clear_stencil: u32,
}

impl RenderPassBegin {
    /// Color then depth/stencil clear values, in attachment order
    pub fn clear_values(&self) -> [vk::ClearValue; 2] {
        [
            vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: self.clear_color,
                },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: self.clear_depth,
                    stencil: self.clear_stencil,
                },
            },
        ]
    }

    /// Full-extent render area
    pub fn render_area(&self) -> vk::Rect2D {
        vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: self.extent,
        }
    }
}

/// Logical device operations the render core needs
///
/// Implementations are cheap handles (`Clone`) so resource owners can keep one
/// for cleanup in `Drop`. All `cmd_*` calls record into a command buffer that
/// is in the recording state and cannot fail.
pub trait GpuDevice: Clone {
    /// Create a pipeline layout
    fn create_pipeline_layout(
        &self,
        set_layouts: &[vk::DescriptorSetLayout],
        push_constant_ranges: &[vk::PushConstantRange],
    ) -> VkResult<vk::PipelineLayout>;

    /// Destroy a pipeline layout
    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout);

    /// Load the shader pair and build a graphics pipeline from `config`
    fn create_graphics_pipeline(
        &self,
        shaders: &ShaderConfig,
        config: &PipelineConfig,
    ) -> RenderResult<vk::Pipeline>;

    /// Destroy a pipeline
    fn destroy_pipeline(&self, pipeline: vk::Pipeline);

    /// Upload raw vertex bytes into a new vertex buffer
    fn create_vertex_buffer(&self, bytes: &[u8], vertex_count: u32) -> RenderResult<GpuVertexBuffer>;

    /// Destroy a vertex buffer and free its memory
    fn destroy_vertex_buffer(&self, buffer: &GpuVertexBuffer);

    /// Allocate primary command buffers from the device command pool
    fn allocate_command_buffers(&self, count: u32) -> VkResult<Vec<vk::CommandBuffer>>;

    /// Return command buffers to the device command pool
    fn free_command_buffers(&self, buffers: &[vk::CommandBuffer]);

    /// `vkBeginCommandBuffer`
    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()>;

    /// `vkEndCommandBuffer`
    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()>;

    /// Begin a render pass with inline subpass contents
    fn cmd_begin_render_pass(&self, command_buffer: vk::CommandBuffer, begin: &RenderPassBegin);

    /// End the current render pass
    fn cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer);

    /// Bind a graphics pipeline
    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline);

    /// Bind vertex buffers starting at `first_binding`
    fn cmd_bind_vertex_buffers(
        &self,
        command_buffer: vk::CommandBuffer,
        first_binding: u32,
        buffers: &[vk::Buffer],
        offsets: &[vk::DeviceSize],
    );

    /// Bind graphics descriptor sets starting at `first_set`
    fn cmd_bind_descriptor_sets(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    );

    /// Push constant bytes
    fn cmd_push_constants(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    );

    /// Non-indexed draw
    fn cmd_draw(
        &self,
        command_buffer: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    );

    /// Block until the device has finished all submitted work
    fn wait_idle(&self) -> VkResult<()>;
}
