//! [`GpuDevice`] implementation over an `ash` logical device

use ash::prelude::VkResult;
use ash::{vk, Device, Instance};

use crate::config::ShaderConfig;
use crate::render::api::{GpuDevice, GpuVertexBuffer, RenderPassBegin};
use crate::render::backends::vulkan::{shader, HostBuffer};
use crate::render::pipeline::PipelineConfig;
use crate::render::RenderResult;

/// Handles of a host-created Vulkan device
///
/// The host keeps ownership of the instance, device and command pool and must
/// outlive every renderer object built from this handle.
#[derive(Clone)]
pub struct VulkanDevice {
    instance: Instance,
    device: Device,
    physical_device: vk::PhysicalDevice,
    command_pool: vk::CommandPool,
}

impl VulkanDevice {
    /// Wrap host-created handles
    pub fn new(
        instance: Instance,
        device: Device,
        physical_device: vk::PhysicalDevice,
        command_pool: vk::CommandPool,
    ) -> Self {
        Self {
            instance,
            device,
            physical_device,
            command_pool,
        }
    }

    /// Raw `ash` device
    pub fn raw(&self) -> &Device {
        &self.device
    }

    /// Raw `ash` instance
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Physical device backing the logical device
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    /// Command pool used for command buffer allocation
    pub fn command_pool(&self) -> vk::CommandPool {
        self.command_pool
    }

    /// Create a host-visible buffer on this device
    pub fn create_host_buffer(
        &self,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
    ) -> RenderResult<HostBuffer> {
        HostBuffer::new(&self.instance, &self.device, self.physical_device, size, usage)
    }
}

impl GpuDevice for VulkanDevice {
    fn create_pipeline_layout(
        &self,
        set_layouts: &[vk::DescriptorSetLayout],
        push_constant_ranges: &[vk::PushConstantRange],
    ) -> VkResult<vk::PipelineLayout> {
        let layout_info = vk::PipelineLayoutCreateInfo::builder()
            .set_layouts(set_layouts)
            .push_constant_ranges(push_constant_ranges);
        unsafe { self.device.create_pipeline_layout(&layout_info, None) }
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        unsafe { self.device.destroy_pipeline_layout(layout, None) };
    }

    fn create_graphics_pipeline(
        &self,
        shaders: &ShaderConfig,
        config: &PipelineConfig,
    ) -> RenderResult<vk::Pipeline> {
        shader::create_graphics_pipeline(&self.device, shaders, config)
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        unsafe { self.device.destroy_pipeline(pipeline, None) };
    }

    fn create_vertex_buffer(&self, bytes: &[u8], vertex_count: u32) -> RenderResult<GpuVertexBuffer> {
        let buffer = self.create_host_buffer(bytes.len() as vk::DeviceSize, vk::BufferUsageFlags::VERTEX_BUFFER)?;
        buffer.write(bytes)?;
        let (buffer, memory) = buffer.into_raw();
        Ok(GpuVertexBuffer {
            buffer,
            memory,
            vertex_count,
        })
    }

    fn destroy_vertex_buffer(&self, buffer: &GpuVertexBuffer) {
        unsafe {
            self.device.destroy_buffer(buffer.buffer, None);
            self.device.free_memory(buffer.memory, None);
        }
    }

    fn allocate_command_buffers(&self, count: u32) -> VkResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::builder()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(count);
        unsafe { self.device.allocate_command_buffers(&alloc_info) }
    }

    fn free_command_buffers(&self, buffers: &[vk::CommandBuffer]) {
        unsafe { self.device.free_command_buffers(self.command_pool, buffers) };
    }

    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        let begin_info = vk::CommandBufferBeginInfo::builder();
        unsafe { self.device.begin_command_buffer(command_buffer, &begin_info) }
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        unsafe { self.device.end_command_buffer(command_buffer) }
    }

    fn cmd_begin_render_pass(&self, command_buffer: vk::CommandBuffer, begin: &RenderPassBegin) {
        let clear_values = begin.clear_values();
        let render_pass_info = vk::RenderPassBeginInfo::builder()
            .render_pass(begin.render_pass)
            .framebuffer(begin.framebuffer)
            .render_area(begin.render_area())
            .clear_values(&clear_values);
        unsafe {
            self.device
                .cmd_begin_render_pass(command_buffer, &render_pass_info, vk::SubpassContents::INLINE);
        }
    }

    fn cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer) {
        unsafe { self.device.cmd_end_render_pass(command_buffer) };
    }

    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline) {
        unsafe {
            self.device
                .cmd_bind_pipeline(command_buffer, vk::PipelineBindPoint::GRAPHICS, pipeline);
        }
    }

    fn cmd_bind_vertex_buffers(
        &self,
        command_buffer: vk::CommandBuffer,
        first_binding: u32,
        buffers: &[vk::Buffer],
        offsets: &[vk::DeviceSize],
    ) {
        unsafe {
            self.device
                .cmd_bind_vertex_buffers(command_buffer, first_binding, buffers, offsets);
        }
    }

    fn cmd_bind_descriptor_sets(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    ) {
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                layout,
                first_set,
                sets,
                &[],
            );
        }
    }

    fn cmd_push_constants(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) {
        unsafe {
            self.device
                .cmd_push_constants(command_buffer, layout, stages, offset, data);
        }
    }

    fn cmd_draw(
        &self,
        command_buffer: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        unsafe {
            self.device
                .cmd_draw(command_buffer, vertex_count, instance_count, first_vertex, first_instance);
        }
    }

    fn wait_idle(&self) -> VkResult<()> {
        unsafe { self.device.device_wait_idle() }
    }
}
