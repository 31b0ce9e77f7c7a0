//! Frame-scoped context handed to every render system

use ash::vk;

use crate::render::primitives::Camera;
use crate::scene::SceneObjects;

/// Everything a render system needs for the frame being recorded
///
/// Built by the frame renderer after acquiring an image and dropped once the
/// frame is submitted. Update passes take it mutably so they can move objects.
/// Render passes only read it.
pub struct FrameContext<'a> {
    /// Index of the per-frame uniform copy in use
    pub frame_index: usize,
    /// Seconds since the previous frame
    pub frame_time: f32,
    /// Command buffer in the recording state
    pub command_buffer: vk::CommandBuffer,
    /// Active camera
    pub camera: &'a Camera,
    /// Descriptor set exposing this frame's [`GlobalUbo`](super::GlobalUbo)
    pub global_descriptor_set: vk::DescriptorSet,
    /// Live scene objects
    pub objects: &'a mut SceneObjects,
}
