//! SPIR-V loading and graphics pipeline creation
//!
//! Turns a [`ShaderConfig`] and a [`PipelineConfig`] into a `vk::Pipeline`.
//! Shader modules only live for the duration of pipeline creation.

use ash::{vk, Device};
use std::ffi::CStr;
use std::fs::File;
use std::path::Path;

use crate::config::ShaderConfig;
use crate::render::pipeline::PipelineConfig;
use crate::render::{RenderError, RenderResult};

// SAFETY: the literal is nul-terminated with no interior nul
const ENTRY_POINT: &CStr = unsafe { CStr::from_bytes_with_nul_unchecked(b"main\0") };

/// Shader module wrapper with RAII cleanup
pub struct ShaderModule {
    device: Device,
    module: vk::ShaderModule,
}

impl ShaderModule {
    /// Create a shader module from SPIR-V words
    pub fn from_words(device: &Device, words: &[u32]) -> RenderResult<Self> {
        let create_info = vk::ShaderModuleCreateInfo::builder().code(words);
        let module = unsafe { device.create_shader_module(&create_info, None) }
            .map_err(|e| RenderError::PipelineCreationFailed(format!("shader module: {e:?}")))?;
        Ok(Self {
            device: device.clone(),
            module,
        })
    }

    /// Load a shader module from a SPIR-V file
    pub fn from_file(device: &Device, path: impl AsRef<Path>) -> RenderResult<Self> {
        let path = path.as_ref();
        let load_failed = |source| RenderError::ShaderLoadFailed {
            path: path.display().to_string(),
            source,
        };
        let mut file = File::open(path).map_err(load_failed)?;
        let words = ash::util::read_spv(&mut file).map_err(load_failed)?;
        log::debug!("Loaded {} ({} words)", path.display(), words.len());
        Self::from_words(device, &words)
    }

    /// Shader module handle
    pub fn handle(&self) -> vk::ShaderModule {
        self.module
    }

    fn stage_info(&self, stage: vk::ShaderStageFlags) -> vk::PipelineShaderStageCreateInfo {
        vk::PipelineShaderStageCreateInfo::builder()
            .stage(stage)
            .module(self.module)
            .name(ENTRY_POINT)
            .build()
    }
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_shader_module(self.module, None);
        }
    }
}

/// Build a graphics pipeline from a shader pair and fixed-function config
pub fn create_graphics_pipeline(
    device: &Device,
    shaders: &ShaderConfig,
    config: &PipelineConfig,
) -> RenderResult<vk::Pipeline> {
    shaders.validate().map_err(|e| {
        log::error!("Shader pair unavailable: {}", e);
        RenderError::from(e)
    })?;
    let vertex_shader = ShaderModule::from_file(device, &shaders.vertex_shader_path)?;
    let fragment_shader = ShaderModule::from_file(device, &shaders.fragment_shader_path)?;

    let shader_stages = [
        vertex_shader.stage_info(vk::ShaderStageFlags::VERTEX),
        fragment_shader.stage_info(vk::ShaderStageFlags::FRAGMENT),
    ];

    let vertex_input = vk::PipelineVertexInputStateCreateInfo::builder()
        .vertex_binding_descriptions(&config.binding_descriptions)
        .vertex_attribute_descriptions(&config.attribute_descriptions);

    let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::builder()
        .topology(config.topology)
        .primitive_restart_enable(false);

    let viewports = [config.viewport];
    let scissors = [config.scissor];
    let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
        .viewports(&viewports)
        .scissors(&scissors);

    let rasterizer = vk::PipelineRasterizationStateCreateInfo::builder()
        .depth_clamp_enable(false)
        .rasterizer_discard_enable(false)
        .polygon_mode(config.polygon_mode)
        .line_width(1.0)
        .cull_mode(config.cull_mode)
        .front_face(config.front_face)
        .depth_bias_enable(false);

    let multisampling = vk::PipelineMultisampleStateCreateInfo::builder()
        .sample_shading_enable(false)
        .rasterization_samples(vk::SampleCountFlags::TYPE_1);

    let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::builder()
        .depth_test_enable(config.depth_test_enable)
        .depth_write_enable(config.depth_write_enable)
        .depth_compare_op(config.depth_compare_op)
        .depth_bounds_test_enable(false)
        .stencil_test_enable(false);

    let color_blend_attachments = [config.color_blend_attachment];
    let color_blending = vk::PipelineColorBlendStateCreateInfo::builder()
        .logic_op_enable(false)
        .attachments(&color_blend_attachments);

    let pipeline_info = vk::GraphicsPipelineCreateInfo::builder()
        .stages(&shader_stages)
        .vertex_input_state(&vertex_input)
        .input_assembly_state(&input_assembly)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterizer)
        .multisample_state(&multisampling)
        .depth_stencil_state(&depth_stencil)
        .color_blend_state(&color_blending)
        .layout(config.pipeline_layout)
        .render_pass(config.render_pass)
        .subpass(config.subpass);

    let pipelines = unsafe {
        device.create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info.build()], None)
    }
    .map_err(|(_, err)| RenderError::PipelineCreationFailed(format!("{err:?}")))?;

    pipelines
        .into_iter()
        .next()
        .ok_or_else(|| RenderError::PipelineCreationFailed("driver returned no pipeline".to_string()))
}
