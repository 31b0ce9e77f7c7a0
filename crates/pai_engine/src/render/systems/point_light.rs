//! # Point Light System
//!
//! Turns light-emitting scene objects into GPU lights and draws them as
//! camera-facing billboards.
//!
//! ## Per frame
//! 1. [`PointLightSystem::update`] orbits every light around a fixed axis by
//!    an angle proportional to the frame time and writes the lights, in scene
//!    iteration order, into the [`GlobalUbo`].
//! 2. The uniform block is uploaded by the frame renderer.
//! 3. [`PointLightSystem::render`] draws one six-vertex quad per light, sorted
//!    farthest first so translucent billboards composite correctly.
//!
//! The billboard pipeline has no vertex input. The vertex shader expands each
//! quad from the push constants and the camera axes in the uniform block.

use ash::vk;
use bytemuck::{Pod, Zeroable};

use crate::config::{LightOrbitConfig, ShaderConfig};
use crate::foundation::math::{Rotation3, Unit, Vec3};
use crate::render::api::GpuDevice;
use crate::render::frame::{FrameContext, GlobalUbo, PointLight};
use crate::render::pipeline::PipelineConfig;
use crate::render::{RenderError, RenderResult};
use crate::scene::{ObjectId, RenderableObject, SceneObjects};

/// Vertices per billboard: two triangles
pub const BILLBOARD_VERTEX_COUNT: u32 = 6;

/// Shader stages reading the billboard push constants
pub const PUSH_CONSTANT_STAGES: vk::ShaderStageFlags = vk::ShaderStageFlags::from_raw(
    vk::ShaderStageFlags::VERTEX.as_raw() | vk::ShaderStageFlags::FRAGMENT.as_raw(),
);

/// Per-billboard push constant block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightPushConstants {
    /// World position, `w` = 1
    pub position: [f32; 4],
    /// RGB color, intensity in `w`
    pub color: [f32; 4],
    /// Billboard radius
    pub radius: f32,
}

impl PointLightPushConstants {
    /// Size in bytes of the push constant range
    pub const SIZE: u32 = std::mem::size_of::<Self>() as u32;

    /// Push constants for a light-bearing object
    pub fn from_object(object: &RenderableObject, intensity: f32) -> Self {
        let light = PointLight::new(object.transform.translation, object.color, intensity);
        Self {
            position: light.position,
            color: light.color,
            radius: object.light_radius(),
        }
    }

    /// The push constant range used by the billboard pipeline layout
    pub fn range() -> vk::PushConstantRange {
        vk::PushConstantRange {
            stage_flags: PUSH_CONSTANT_STAGES,
            offset: 0,
            size: Self::SIZE,
        }
    }
}

/// Rotation applied to every light each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightOrbit {
    angular_velocity: f32,
    axis: Unit<Vec3>,
}

impl Default for LightOrbit {
    fn default() -> Self {
        Self::from_config(&LightOrbitConfig::default())
    }
}

impl LightOrbit {
    /// Orbit at `angular_velocity` radians per second around `axis`
    ///
    /// A zero-length axis falls back to +Y.
    pub fn new(angular_velocity: f32, axis: Vec3) -> Self {
        let axis = Unit::try_new(axis, f32::EPSILON).unwrap_or_else(Vec3::y_axis);
        Self {
            angular_velocity,
            axis,
        }
    }

    /// Orbit described by the renderer configuration
    pub fn from_config(config: &LightOrbitConfig) -> Self {
        Self::new(config.angular_velocity, Vec3::from(config.axis))
    }

    /// Rotation for a frame lasting `frame_time` seconds
    pub fn rotation(&self, frame_time: f32) -> Rotation3<f32> {
        Rotation3::from_axis_angle(&self.axis, self.angular_velocity * frame_time)
    }

    /// Normalized rotation axis
    pub fn axis(&self) -> Vec3 {
        self.axis.into_inner()
    }
}

/// Light identifiers ordered farthest to nearest from `camera_position`
///
/// Equal distances keep scene iteration order.
pub fn sort_back_to_front(camera_position: &Vec3, objects: &SceneObjects) -> Vec<ObjectId> {
    let mut lights: Vec<(ObjectId, f32)> = objects
        .iter()
        .filter(|(_, object)| object.is_point_light())
        .map(|(id, object)| {
            let offset = camera_position - object.transform.translation;
            (id, offset.dot(&offset))
        })
        .collect();
    lights.sort_by(|a, b| b.1.total_cmp(&a.1));
    lights.into_iter().map(|(id, _)| id).collect()
}

/// Orbits point lights, fills the uniform block and draws light billboards
pub struct PointLightSystem<D: GpuDevice> {
    device: D,
    shaders: ShaderConfig,
    orbit: LightOrbit,
    pipeline_layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
}

impl<D: GpuDevice> PointLightSystem<D> {
    /// Create the billboard pipeline layout and pipeline
    ///
    /// The layout holds `global_set_layout` at set 0 and the
    /// [`PointLightPushConstants`] range.
    pub fn new(
        device: D,
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
        global_set_layout: vk::DescriptorSetLayout,
        shaders: ShaderConfig,
        orbit: LightOrbit,
    ) -> RenderResult<Self> {
        let pipeline_layout = device
            .create_pipeline_layout(&[global_set_layout], &[PointLightPushConstants::range()])
            .map_err(|e| {
                log::error!("Failed to create point light pipeline layout: {:?}", e);
                RenderError::PipelineLayoutCreationFailed(e)
            })?;

        let pipeline = match Self::create_pipeline(&device, &shaders, render_pass, extent, pipeline_layout) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                device.destroy_pipeline_layout(pipeline_layout);
                return Err(e);
            }
        };

        log::info!("Point light pipeline created ({})", shaders.vertex_shader_path);
        Ok(Self {
            device,
            shaders,
            orbit,
            pipeline_layout,
            pipeline,
        })
    }

    fn create_pipeline(
        device: &D,
        shaders: &ShaderConfig,
        render_pass: vk::RenderPass,
        extent: vk::Extent2D,
        pipeline_layout: vk::PipelineLayout,
    ) -> RenderResult<vk::Pipeline> {
        let mut config = PipelineConfig::default_for_extent(extent).with_targets(render_pass, pipeline_layout);
        config.enable_alpha_blending().clear_vertex_input();
        device.create_graphics_pipeline(shaders, &config)
    }

    /// Rebuild the pipeline for a recreated swapchain
    ///
    /// The caller must ensure the GPU no longer uses the old pipeline.
    pub fn recreate_pipeline(&mut self, render_pass: vk::RenderPass, extent: vk::Extent2D) -> RenderResult<()> {
        let pipeline = Self::create_pipeline(&self.device, &self.shaders, render_pass, extent, self.pipeline_layout)?;
        self.device.destroy_pipeline(self.pipeline);
        self.pipeline = pipeline;
        Ok(())
    }

    /// Orbit the lights and write them into `ubo`
    ///
    /// Must run before `ubo` is uploaded and before [`Self::render`].
    ///
    /// # Panics
    ///
    /// Panics when the scene holds more than [`MAX_LIGHTS`](crate::render::frame::MAX_LIGHTS)
    /// light-bearing objects.
    pub fn update(&self, frame: &mut FrameContext<'_>, ubo: &mut GlobalUbo) {
        let rotation = self.orbit.rotation(frame.frame_time);
        ubo.clear_point_lights();

        for (_, object) in frame.objects.iter_mut() {
            let Some(light) = object.point_light else {
                continue;
            };
            object.transform.translation = rotation * object.transform.translation;
            ubo.push_point_light(PointLight::new(
                object.transform.translation,
                object.color,
                light.light_intensity,
            ));
        }

        log::trace!("Frame {}: {} point lights", frame.frame_index, ubo.num_lights);
    }

    /// Draw every light billboard, farthest first
    ///
    /// Records into `frame.command_buffer`, which must be inside the render pass
    /// the pipeline was created for.
    pub fn render(&self, frame: &FrameContext<'_>) {
        let order = sort_back_to_front(&frame.camera.position(), &*frame.objects);
        let command_buffer = frame.command_buffer;

        self.device.cmd_bind_pipeline(command_buffer, self.pipeline);
        self.device.cmd_bind_descriptor_sets(
            command_buffer,
            self.pipeline_layout,
            0,
            &[frame.global_descriptor_set],
        );

        for id in &order {
            let Some(object) = frame.objects.get(*id) else {
                continue;
            };
            let Some(light) = object.point_light else {
                continue;
            };
            let push = PointLightPushConstants::from_object(object, light.light_intensity);
            self.device.cmd_push_constants(
                command_buffer,
                self.pipeline_layout,
                PUSH_CONSTANT_STAGES,
                0,
                bytemuck::bytes_of(&push),
            );
            self.device.cmd_draw(command_buffer, BILLBOARD_VERTEX_COUNT, 1, 0, 0);
        }

        log::trace!("Drew {} light billboards", order.len());
    }

    /// Billboard pipeline layout
    pub fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }

    /// Billboard pipeline
    pub fn pipeline(&self) -> vk::Pipeline {
        self.pipeline
    }

    /// Orbit applied in [`Self::update`]
    pub fn orbit(&self) -> &LightOrbit {
        &self.orbit
    }
}

impl<D: GpuDevice> Drop for PointLightSystem<D> {
    fn drop(&mut self) {
        self.device.destroy_pipeline(self.pipeline);
        self.device.destroy_pipeline_layout(self.pipeline_layout);
    }
}
