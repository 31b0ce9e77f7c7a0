//! Per-frame data shared by the render systems

pub mod frame_context;
pub mod global_ubo;

pub use frame_context::FrameContext;
pub use global_ubo::{GlobalUbo, PointLight, MAX_LIGHTS};
