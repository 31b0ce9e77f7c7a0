//! Fixed-function state of a graphics pipeline
//!
//! [`PipelineConfig`] is plain data. The device turns it into Vulkan create
//! infos at pipeline creation time, so a config can be built, tweaked and
//! inspected without a device.

use ash::vk;

use crate::render::pipeline::VertexLayout;

/// Configuration for a graphics pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Viewport covering the swapchain extent
    pub viewport: vk::Viewport,
    /// Scissor covering the swapchain extent
    pub scissor: vk::Rect2D,
    /// Primitive topology
    pub topology: vk::PrimitiveTopology,
    /// Polygon fill mode
    pub polygon_mode: vk::PolygonMode,
    /// Face culling
    pub cull_mode: vk::CullModeFlags,
    /// Front face winding
    pub front_face: vk::FrontFace,
    /// Blend state of the single color attachment
    pub color_blend_attachment: vk::PipelineColorBlendAttachmentState,
    /// Enable depth testing
    pub depth_test_enable: bool,
    /// Enable depth writes
    pub depth_write_enable: bool,
    /// Depth comparison
    pub depth_compare_op: vk::CompareOp,
    /// Vertex buffer bindings
    pub binding_descriptions: Vec<vk::VertexInputBindingDescription>,
    /// Vertex attributes
    pub attribute_descriptions: Vec<vk::VertexInputAttributeDescription>,
    /// Render pass the pipeline is used in
    pub render_pass: vk::RenderPass,
    /// Pipeline layout
    pub pipeline_layout: vk::PipelineLayout,
    /// Subpass index
    pub subpass: u32,
}

impl PipelineConfig {
    /// Opaque triangle-list pipeline covering `extent`, using the [`Vertex`] layout
    ///
    /// `render_pass` and `pipeline_layout` are left null for the caller to fill.
    ///
    /// [`Vertex`]: crate::render::primitives::Vertex
    pub fn default_for_extent(extent: vk::Extent2D) -> Self {
        Self {
            viewport: vk::Viewport {
                x: 0.0,
                y: 0.0,
                width: extent.width as f32,
                height: extent.height as f32,
                min_depth: 0.0,
                max_depth: 1.0,
            },
            scissor: vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            },
            topology: vk::PrimitiveTopology::TRIANGLE_LIST,
            polygon_mode: vk::PolygonMode::FILL,
            cull_mode: vk::CullModeFlags::NONE,
            front_face: vk::FrontFace::CLOCKWISE,
            color_blend_attachment: vk::PipelineColorBlendAttachmentState {
                blend_enable: vk::FALSE,
                src_color_blend_factor: vk::BlendFactor::ONE,
                dst_color_blend_factor: vk::BlendFactor::ZERO,
                color_blend_op: vk::BlendOp::ADD,
                src_alpha_blend_factor: vk::BlendFactor::ONE,
                dst_alpha_blend_factor: vk::BlendFactor::ZERO,
                alpha_blend_op: vk::BlendOp::ADD,
                color_write_mask: vk::ColorComponentFlags::RGBA,
            },
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: vk::CompareOp::LESS,
            binding_descriptions: VertexLayout::binding_descriptions(),
            attribute_descriptions: VertexLayout::attribute_descriptions(),
            render_pass: vk::RenderPass::null(),
            pipeline_layout: vk::PipelineLayout::null(),
            subpass: 0,
        }
    }

    /// Source-over alpha blending on the color attachment
    pub fn enable_alpha_blending(&mut self) -> &mut Self {
        self.color_blend_attachment = vk::PipelineColorBlendAttachmentState {
            blend_enable: vk::TRUE,
            src_color_blend_factor: vk::BlendFactor::SRC_ALPHA,
            dst_color_blend_factor: vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
            color_blend_op: vk::BlendOp::ADD,
            src_alpha_blend_factor: vk::BlendFactor::ONE,
            dst_alpha_blend_factor: vk::BlendFactor::ZERO,
            alpha_blend_op: vk::BlendOp::ADD,
            color_write_mask: vk::ColorComponentFlags::RGBA,
        };
        self
    }

    /// Drop all vertex input, for pipelines that generate vertices in the shader
    pub fn clear_vertex_input(&mut self) -> &mut Self {
        self.binding_descriptions.clear();
        self.attribute_descriptions.clear();
        self
    }

    /// Target `render_pass` with `pipeline_layout`
    pub fn with_targets(
        mut self,
        render_pass: vk::RenderPass,
        pipeline_layout: vk::PipelineLayout,
    ) -> Self {
        self.render_pass = render_pass;
        self.pipeline_layout = pipeline_layout;
        self
    }
}
