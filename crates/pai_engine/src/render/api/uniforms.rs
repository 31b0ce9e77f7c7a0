//! Global uniform buffer seam

use ash::vk;

use crate::render::frame::GlobalUbo;
use crate::render::RenderResult;

/// Per-frame copies of the [`GlobalUbo`] and the descriptor sets exposing them
///
/// Indexed by the swapchain's frame slot. `frame_count` must cover every slot,
/// so a copy is only rewritten after the acquire that retired its last reader.
pub trait GlobalUniforms {
    /// Number of per-frame copies
    fn frame_count(&self) -> usize;

    /// Layout of the global set (binding 0, uniform buffer)
    fn descriptor_set_layout(&self) -> vk::DescriptorSetLayout;

    /// Descriptor set of frame `frame_index`
    fn descriptor_set(&self, frame_index: usize) -> vk::DescriptorSet;

    /// Upload `ubo` into the copy of frame `frame_index`
    fn write(&mut self, frame_index: usize, ubo: &GlobalUbo) -> RenderResult<()>;
}
