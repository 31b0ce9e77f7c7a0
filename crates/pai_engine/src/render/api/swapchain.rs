//! Swapchain seam
//!
//! Image, framebuffer and synchronization management (fences, semaphores,
//! recreation) belong to the implementation. The render core only sees the
//! acquire/submit protocol and the frame slot it is currently filling.
//!
//! ## Frame slots
//! The implementation keeps `frames_in_flight` slots, each guarded by its own
//! fence, and advances the current slot once per submission. Per-frame
//! resources the core rewrites every frame (scene command buffers, uniform
//! copies) are indexed by slot, never by image index, because an image can be
//! reacquired while the slot that last rendered it is still executing.

use ash::prelude::VkResult;
use ash::vk;

/// Presentable image chain the frame loop renders into
pub trait Swapchain {
    /// Number of swapchain images
    fn image_count(&self) -> usize;

    /// Render pass compatible with every framebuffer
    fn render_pass(&self) -> vk::RenderPass;

    /// Framebuffer of image `index`
    fn framebuffer(&self, index: usize) -> vk::Framebuffer;

    /// Image extent
    fn extent(&self) -> vk::Extent2D;

    /// Number of frame slots
    fn frames_in_flight(&self) -> usize;

    /// Slot the next submission belongs to
    fn current_frame(&self) -> usize;

    /// Wait for the current frame slot and acquire an image
    ///
    /// Must not return before every submission previously made from
    /// [`Self::current_frame`] has retired. Returns the image index and whether
    /// the swapchain is suboptimal.
    fn acquire_next_image(&mut self) -> VkResult<(u32, bool)>;

    /// Submit `command_buffers` for `image_index` and present it
    ///
    /// Waits for earlier work on the same image before submitting, then
    /// advances [`Self::current_frame`]. Returns whether presentation
    /// reported the swapchain as suboptimal.
    fn submit_command_buffers(
        &mut self,
        command_buffers: &[vk::CommandBuffer],
        image_index: u32,
    ) -> VkResult<bool>;
}
