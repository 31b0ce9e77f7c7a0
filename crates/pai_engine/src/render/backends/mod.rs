//! Graphics API backends implementing the [`api`](crate::render::api) traits

pub mod vulkan;
