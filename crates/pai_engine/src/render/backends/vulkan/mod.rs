//! Vulkan backend on top of `ash`
//!
//! The host creates the instance, logical device, command pool and swapchain.
//! [`VulkanDevice`] borrows those handles to build pipelines and buffers and
//! to record commands. [`GlobalUniformBuffers`] owns the per-frame uniform
//! buffers and their descriptor sets.

pub mod buffer;
pub mod device;
pub mod shader;
pub mod uniform_buffer;

pub use buffer::HostBuffer;
pub use device::VulkanDevice;
pub use shader::ShaderModule;
pub use uniform_buffer::GlobalUniformBuffers;
