//! Per-frame global uniform buffers and their descriptor sets
//!
//! One persistently mapped [`GlobalUbo`] buffer per frame in flight, each
//! exposed through its own descriptor set at set 0, binding 0. The layout is
//! visible to all graphics stages so both the base and the light shaders can
//! read the camera and the lights.

use ash::{vk, Device};
use std::mem;

use crate::render::api::GlobalUniforms;
use crate::render::backends::vulkan::{HostBuffer, VulkanDevice};
use crate::render::frame::GlobalUbo;
use crate::render::{RenderError, RenderResult};

/// Uniform buffers, descriptor set layout, pool and sets for the [`GlobalUbo`]
pub struct GlobalUniformBuffers {
    device: Device,
    layout: vk::DescriptorSetLayout,
    pool: vk::DescriptorPool,
    buffers: Vec<HostBuffer>,
    sets: Vec<vk::DescriptorSet>,
}

impl GlobalUniformBuffers {
    /// Create `frame_count` mapped uniform buffers with one descriptor set each
    pub fn new(vulkan: &VulkanDevice, frame_count: usize) -> RenderResult<Self> {
        let device = vulkan.raw().clone();
        let descriptor_error = |what: &str, e: vk::Result| {
            log::error!("Failed to create global {}: {:?}", what, e);
            RenderError::UniformUploadFailed(format!("{what}: {e:?}"))
        };
        let count = u32::try_from(frame_count)
            .map_err(|_| RenderError::UniformUploadFailed(format!("invalid frame count {frame_count}")))?;

        let bindings = [vk::DescriptorSetLayoutBinding::builder()
            .binding(0)
            .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(1)
            .stage_flags(vk::ShaderStageFlags::ALL_GRAPHICS)
            .build()];
        let layout_info = vk::DescriptorSetLayoutCreateInfo::builder().bindings(&bindings);
        let layout = unsafe { device.create_descriptor_set_layout(&layout_info, None) }
            .map_err(|e| descriptor_error("descriptor set layout", e))?;

        // Owned from here on; Drop releases whatever was created
        let mut uniforms = Self {
            device: device.clone(),
            layout,
            pool: vk::DescriptorPool::null(),
            buffers: Vec::with_capacity(frame_count),
            sets: Vec::new(),
        };

        let pool_sizes = [vk::DescriptorPoolSize::builder()
            .ty(vk::DescriptorType::UNIFORM_BUFFER)
            .descriptor_count(count)
            .build()];
        let pool_info = vk::DescriptorPoolCreateInfo::builder()
            .max_sets(count)
            .pool_sizes(&pool_sizes);
        uniforms.pool = unsafe { device.create_descriptor_pool(&pool_info, None) }
            .map_err(|e| descriptor_error("descriptor pool", e))?;

        for _ in 0..frame_count {
            let mut buffer = vulkan.create_host_buffer(
                mem::size_of::<GlobalUbo>() as vk::DeviceSize,
                vk::BufferUsageFlags::UNIFORM_BUFFER,
            )?;
            buffer.map()?;
            uniforms.buffers.push(buffer);
        }

        let set_layouts = vec![layout; frame_count];
        let alloc_info = vk::DescriptorSetAllocateInfo::builder()
            .descriptor_pool(uniforms.pool)
            .set_layouts(&set_layouts);
        uniforms.sets = unsafe { device.allocate_descriptor_sets(&alloc_info) }
            .map_err(|e| descriptor_error("descriptor sets", e))?;

        for (set, buffer) in uniforms.sets.iter().zip(&uniforms.buffers) {
            let buffer_info = [vk::DescriptorBufferInfo {
                buffer: buffer.handle(),
                offset: 0,
                range: buffer.size(),
            }];
            let write = vk::WriteDescriptorSet::builder()
                .dst_set(*set)
                .dst_binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(&buffer_info)
                .build();
            unsafe { device.update_descriptor_sets(&[write], &[]) };
        }

        log::info!(
            "Created {} global uniform buffers of {} bytes",
            frame_count,
            mem::size_of::<GlobalUbo>()
        );
        Ok(uniforms)
    }
}

impl GlobalUniforms for GlobalUniformBuffers {
    fn frame_count(&self) -> usize {
        self.buffers.len()
    }

    fn descriptor_set_layout(&self) -> vk::DescriptorSetLayout {
        self.layout
    }

    fn descriptor_set(&self, frame_index: usize) -> vk::DescriptorSet {
        self.sets.get(frame_index).copied().unwrap_or_else(vk::DescriptorSet::null)
    }

    fn write(&mut self, frame_index: usize, ubo: &GlobalUbo) -> RenderResult<()> {
        let buffer = self.buffers.get(frame_index).ok_or_else(|| {
            RenderError::UniformUploadFailed(format!(
                "frame {} out of range ({} buffers)",
                frame_index,
                self.buffers.len()
            ))
        })?;
        buffer.write(ubo.as_bytes())
    }
}

impl Drop for GlobalUniformBuffers {
    fn drop(&mut self) {
        // Sets are freed with the pool
        self.buffers.clear();
        unsafe {
            self.device.destroy_descriptor_pool(self.pool, None);
            self.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}
