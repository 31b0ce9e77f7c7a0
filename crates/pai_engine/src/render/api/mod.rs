//! Collaborator interfaces used by the render core
//!
//! The core never creates devices, swapchains or windows. The host supplies
//! them through these traits.

pub mod device;
pub mod swapchain;
pub mod uniforms;
pub mod window;

pub use device::{GpuDevice, GpuVertexBuffer, RenderPassBegin};
pub use swapchain::Swapchain;
pub use uniforms::GlobalUniforms;
pub use window::WindowHost;
