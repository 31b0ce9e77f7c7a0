//! Rendering
//!
//! The render core is written against the collaborator traits in [`api`], so
//! the same frame loop drives real Vulkan objects from [`backends::vulkan`] or
//! test doubles.
//!
//! ## Frame flow
//!
//! ```text
//! FrameRenderer::draw_scene_frame
//!   ├─ Swapchain::acquire_next_image
//!   ├─ FrameContext { frame_time, command_buffer, camera, objects, .. }
//!   ├─ PointLightSystem::update     (orbit lights, fill GlobalUbo)
//!   ├─ GlobalUniforms::write        (upload GlobalUbo)
//!   ├─ record base geometry, then PointLightSystem::render
//!   └─ Swapchain::submit_command_buffers
//! ```

pub mod api;
pub mod backends;
pub mod frame;
pub mod frame_renderer;
pub mod pipeline;
pub mod primitives;
pub mod systems;

pub use frame_renderer::FrameRenderer;

use ash::vk;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by the render core
///
/// Every variant is fatal at this layer. Nothing is retried internally; the
/// host decides whether to terminate or rebuild.
#[derive(Error, Debug)]
pub enum RenderError {
    /// `vkCreatePipelineLayout` failed
    #[error("failed to create pipeline layout: {0:?}")]
    PipelineLayoutCreationFailed(vk::Result),

    /// Graphics pipeline construction failed
    #[error("failed to create graphics pipeline: {0}")]
    PipelineCreationFailed(String),

    /// A SPIR-V file could not be read
    #[error("failed to load shader {path}")]
    ShaderLoadFailed {
        /// Path of the shader file
        path: String,
        /// Underlying IO or SPIR-V error
        source: std::io::Error,
    },

    /// Buffer creation, allocation or binding failed
    #[error("failed to create buffer: {0:?}")]
    BufferCreationFailed(vk::Result),

    /// The configured mesh depth yields more vertices than one draw can address
    #[error("sierpinski depth {depth} exceeds the vertex limit of {}", u32::MAX)]
    MeshTooLarge {
        /// Configured subdivision depth
        depth: i32,
    },

    /// No memory type satisfies the requested properties
    #[error("no suitable memory type")]
    NoSuitableMemoryType,

    /// `vkAllocateCommandBuffers` failed
    #[error("failed to allocate command buffers: {0:?}")]
    CommandBufferAllocationFailed(vk::Result),

    /// Beginning or ending a command buffer failed
    #[error("failed to record command buffer {image_index}: {result:?}")]
    CommandBufferRecordingFailed {
        /// Swapchain image the buffer belongs to
        image_index: usize,
        /// Result returned by the driver
        result: vk::Result,
    },

    /// Acquiring a swapchain image failed with something other than suboptimal
    #[error("failed to acquire swap chain image: {0:?}")]
    SwapchainAcquireFailed(vk::Result),

    /// Submitting or presenting did not return plain success
    #[error("failed to present swap chain image: {0:?}")]
    SwapchainPresentFailed(vk::Result),

    /// The swapchain returned an image index without a command buffer
    #[error("swap chain image index {index} out of range ({image_count} images)")]
    ImageIndexOutOfRange {
        /// Index returned by the swapchain
        index: u32,
        /// Number of recorded command buffers
        image_count: usize,
    },

    /// The swapchain's frame slot has no uniform buffer or command buffer
    #[error("frame slot {slot} out of range ({frame_count} frames in flight)")]
    FrameSlotOutOfRange {
        /// Slot reported by the swapchain
        slot: usize,
        /// Frames the resources were created for
        frame_count: usize,
    },

    /// `vkDeviceWaitIdle` failed
    #[error("failed to wait for device idle: {0:?}")]
    DeviceWaitIdleFailed(vk::Result),

    /// Descriptor or uniform buffer setup/upload failed
    #[error("uniform buffer error: {0}")]
    UniformUploadFailed(String),

    /// Configuration could not be loaded or validated
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
