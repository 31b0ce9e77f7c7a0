//! Host-visible buffers
//!
//! Everything the renderer uploads (the base mesh and the uniform blocks) is
//! small and rewritten from the CPU, so buffers live in host-visible, coherent
//! memory and need no staging or explicit flushes.

use ash::{vk, Device, Instance};
use std::ffi::c_void;

use crate::render::{RenderError, RenderResult};

/// Buffer bound to its own host-visible, coherent allocation
///
/// Destroys the buffer and frees the memory on drop.
pub struct HostBuffer {
    device: Device,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    size: vk::DeviceSize,
    mapped: Option<*mut c_void>,
}

impl HostBuffer {
    /// Create a buffer of `size` bytes for `usage`
    pub fn new(
        instance: &Instance,
        device: &Device,
        physical_device: vk::PhysicalDevice,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
    ) -> RenderResult<Self> {
        let buffer_info = vk::BufferCreateInfo::builder()
            .size(size)
            .usage(usage)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe { device.create_buffer(&buffer_info, None) }
            .map_err(RenderError::BufferCreationFailed)?;

        let requirements = unsafe { device.get_buffer_memory_requirements(buffer) };
        let memory_type_index = match find_memory_type(
            instance,
            physical_device,
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        ) {
            Some(index) => index,
            None => {
                unsafe { device.destroy_buffer(buffer, None) };
                return Err(RenderError::NoSuitableMemoryType);
            }
        };

        let alloc_info = vk::MemoryAllocateInfo::builder()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type_index);

        let memory = match unsafe { device.allocate_memory(&alloc_info, None) } {
            Ok(memory) => memory,
            Err(e) => {
                unsafe { device.destroy_buffer(buffer, None) };
                return Err(RenderError::BufferCreationFailed(e));
            }
        };

        let host_buffer = Self {
            device: device.clone(),
            buffer,
            memory,
            size,
            mapped: None,
        };

        unsafe { device.bind_buffer_memory(buffer, memory, 0) }
            .map_err(RenderError::BufferCreationFailed)?;

        Ok(host_buffer)
    }

    /// Keep the whole buffer mapped until drop
    pub fn map(&mut self) -> RenderResult<()> {
        if self.mapped.is_none() {
            let ptr = unsafe {
                self.device
                    .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
            }
            .map_err(RenderError::BufferCreationFailed)?;
            self.mapped = Some(ptr);
        }
        Ok(())
    }

    /// Copy `bytes` to the start of the buffer
    ///
    /// Maps the buffer for the duration of the copy unless it is persistently mapped.
    pub fn write(&self, bytes: &[u8]) -> RenderResult<()> {
        if bytes.len() as vk::DeviceSize > self.size {
            return Err(RenderError::UniformUploadFailed(format!(
                "write of {} bytes exceeds buffer size {}",
                bytes.len(),
                self.size
            )));
        }

        match self.mapped {
            Some(ptr) => unsafe {
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.cast::<u8>(), bytes.len());
            },
            None => unsafe {
                let ptr = self
                    .device
                    .map_memory(self.memory, 0, self.size, vk::MemoryMapFlags::empty())
                    .map_err(RenderError::BufferCreationFailed)?;
                std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.cast::<u8>(), bytes.len());
                self.device.unmap_memory(self.memory);
            },
        }
        Ok(())
    }

    /// Buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Size in bytes
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Give up ownership of the buffer and its memory without destroying them
    pub fn into_raw(self) -> (vk::Buffer, vk::DeviceMemory) {
        let raw = (self.buffer, self.memory);
        if self.mapped.is_some() {
            unsafe { self.device.unmap_memory(self.memory) };
        }
        std::mem::forget(self);
        raw
    }
}

impl Drop for HostBuffer {
    fn drop(&mut self) {
        unsafe {
            if self.mapped.take().is_some() {
                self.device.unmap_memory(self.memory);
            }
            self.device.destroy_buffer(self.buffer, None);
            self.device.free_memory(self.memory, None);
        }
    }
}

/// Find a memory type allowed by `type_filter` with all of `properties`
pub fn find_memory_type(
    instance: &Instance,
    physical_device: vk::PhysicalDevice,
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
) -> Option<u32> {
    let memory_properties = unsafe { instance.get_physical_device_memory_properties(physical_device) };
    select_memory_type(&memory_properties, type_filter, properties)
}

fn select_memory_type(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_filter: u32,
    properties: vk::MemoryPropertyFlags,
) -> Option<u32> {
    (0..memory_properties.memory_type_count).find(|&i| {
        type_filter & (1 << i) != 0
            && memory_properties.memory_types[i as usize]
                .property_flags
                .contains(properties)
    })
}
