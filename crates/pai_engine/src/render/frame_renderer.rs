//! # Frame Renderer
//!
//! Owns the base geometry pipeline and drives the acquire, submit and present
//! protocol of the swapchain.
//!
//! ## Setup
//! 1. Generate the Sierpinski mesh and upload it
//! 2. Create an empty pipeline layout (no descriptor sets, no push constants)
//! 3. Create the pipeline for the swapchain render pass and extent
//! 4. Allocate one command buffer per swapchain image and record it
//!
//! ## Frame protocol
//! - Acquire: a suboptimal swapchain is tolerated, any error is fatal
//! - Submit/present: anything other than plain success is fatal
//! - Nothing is retried. Errors propagate to the host.
//!
//! Two loops are offered. [`FrameRenderer::run`] replays the per-image command
//! buffers recorded at setup. [`FrameRenderer::run_scene`] records a fresh
//! command buffer every frame so the point light system can animate and draw
//! its billboards on top of the base geometry. Those buffers, like the uniform
//! copies, belong to the swapchain's frame slot: the acquire that opens a
//! frame has already waited for the slot's previous submission, so the slot's
//! buffer is never re-begun while pending.

use ash::vk;

use crate::config::RendererConfig;
use crate::foundation::time::FrameTimer;
use crate::render::api::{GlobalUniforms, GpuDevice, RenderPassBegin, Swapchain, WindowHost};
use crate::render::frame::{FrameContext, GlobalUbo};
use crate::render::pipeline::PipelineConfig;
use crate::render::primitives::{sierpinski_mesh, sierpinski_vertex_count, Camera, Model};
use crate::render::systems::PointLightSystem;
use crate::render::{RenderError, RenderResult};
use crate::scene::SceneObjects;

/// Depth clear value of the depth attachment
const CLEAR_DEPTH: f32 = 1.0;

/// Stencil clear value of the depth attachment
const CLEAR_STENCIL: u32 = 0;

/// Base geometry pipeline, per-image command buffers and the frame loop
pub struct FrameRenderer<D: GpuDevice, S: Swapchain> {
    device: D,
    swapchain: S,
    config: RendererConfig,
    model: Model<D>,
    pipeline_layout: vk::PipelineLayout,
    pipeline: vk::Pipeline,
    command_buffers: Vec<vk::CommandBuffer>,
    scene_command_buffers: Vec<vk::CommandBuffer>,
    frames_rendered: u64,
}

impl<D: GpuDevice, S: Swapchain> FrameRenderer<D, S> {
    /// Build the mesh, pipeline and command buffers
    ///
    /// Objects created before a failure are released before the error is returned.
    pub fn new(device: D, swapchain: S, config: RendererConfig) -> RenderResult<Self> {
        let depth = config.mesh.sierpinski_depth;
        if !sierpinski_vertex_count(depth).is_some_and(|count| u32::try_from(count).is_ok()) {
            log::error!("Sierpinski depth {} produces too many vertices", depth);
            return Err(RenderError::MeshTooLarge { depth });
        }
        let vertices = sierpinski_mesh(&config.mesh);
        let model = Model::new(device.clone(), &vertices)?;
        log::info!(
            "{}: base mesh depth {} with {} vertices",
            config.application_name,
            config.mesh.sierpinski_depth,
            model.vertex_count()
        );

        let pipeline_layout = device.create_pipeline_layout(&[], &[]).map_err(|e| {
            log::error!("Failed to create pipeline layout: {:?}", e);
            RenderError::PipelineLayoutCreationFailed(e)
        })?;

        let pipeline = match Self::create_pipeline(&device, &swapchain, &config, pipeline_layout) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                log::error!("Failed to create base pipeline: {}", e);
                device.destroy_pipeline_layout(pipeline_layout);
                return Err(e);
            }
        };

        let mut renderer = Self {
            device,
            swapchain,
            config,
            model,
            pipeline_layout,
            pipeline,
            command_buffers: Vec::new(),
            scene_command_buffers: Vec::new(),
            frames_rendered: 0,
        };
        renderer.create_command_buffers()?;
        renderer.record_command_buffers()?;
        Ok(renderer)
    }

    fn create_pipeline(
        device: &D,
        swapchain: &S,
        config: &RendererConfig,
        pipeline_layout: vk::PipelineLayout,
    ) -> RenderResult<vk::Pipeline> {
        let pipeline_config = PipelineConfig::default_for_extent(swapchain.extent())
            .with_targets(swapchain.render_pass(), pipeline_layout);
        let pipeline = device.create_graphics_pipeline(&config.base_shaders, &pipeline_config)?;
        log::info!("Base pipeline created ({})", config.base_shaders.vertex_shader_path);
        Ok(pipeline)
    }

    fn allocate_command_buffers(device: &D, count: usize) -> RenderResult<Vec<vk::CommandBuffer>> {
        let count = u32::try_from(count)
            .map_err(|_| RenderError::CommandBufferAllocationFailed(vk::Result::ERROR_INITIALIZATION_FAILED))?;
        device.allocate_command_buffers(count).map_err(|e| {
            log::error!("Failed to allocate {} command buffers: {:?}", count, e);
            RenderError::CommandBufferAllocationFailed(e)
        })
    }

    fn create_command_buffers(&mut self) -> RenderResult<()> {
        self.command_buffers = Self::allocate_command_buffers(&self.device, self.swapchain.image_count())?;
        log::info!("Allocated {} command buffers", self.command_buffers.len());
        Ok(())
    }

    fn free_command_buffers(&mut self) {
        for buffers in [&mut self.command_buffers, &mut self.scene_command_buffers] {
            if !buffers.is_empty() {
                self.device.free_command_buffers(buffers);
                buffers.clear();
            }
        }
    }

    /// Command buffer of frame slot `slot`, allocated on the first scene frame
    fn scene_command_buffer(&mut self, slot: usize) -> RenderResult<vk::CommandBuffer> {
        if self.scene_command_buffers.is_empty() {
            self.scene_command_buffers =
                Self::allocate_command_buffers(&self.device, self.swapchain.frames_in_flight())?;
            log::debug!("Allocated {} scene command buffers", self.scene_command_buffers.len());
        }
        self.scene_command_buffers
            .get(slot)
            .copied()
            .ok_or(RenderError::FrameSlotOutOfRange {
                slot,
                frame_count: self.scene_command_buffers.len(),
            })
    }

    /// Record the base geometry into every command buffer
    pub fn record_command_buffers(&self) -> RenderResult<()> {
        for (image_index, command_buffer) in self.command_buffers.iter().enumerate() {
            self.record_command_buffer(*command_buffer, image_index, || {})?;
        }
        Ok(())
    }

    /// Record the render pass targeting image `image_index` into `command_buffer`
    ///
    /// `record_overlay` runs inside the render pass after the base mesh is drawn.
    fn record_command_buffer<F: FnOnce()>(
        &self,
        command_buffer: vk::CommandBuffer,
        image_index: usize,
        record_overlay: F,
    ) -> RenderResult<()> {
        self.device
            .begin_command_buffer(command_buffer)
            .map_err(|result| recording_failed(image_index, result))?;

        self.device
            .cmd_begin_render_pass(command_buffer, &self.render_pass_begin(image_index));
        self.device.cmd_bind_pipeline(command_buffer, self.pipeline);
        self.model.bind(command_buffer);
        self.model.draw(command_buffer);
        record_overlay();
        self.device.cmd_end_render_pass(command_buffer);

        self.device
            .end_command_buffer(command_buffer)
            .map_err(|result| recording_failed(image_index, result))
    }

    fn render_pass_begin(&self, image_index: usize) -> RenderPassBegin {
        RenderPassBegin {
            render_pass: self.swapchain.render_pass(),
            framebuffer: self.swapchain.framebuffer(image_index),
            extent: self.swapchain.extent(),
            clear_color: self.config.clear_color,
            clear_depth: CLEAR_DEPTH,
            clear_stencil: CLEAR_STENCIL,
        }
    }

    fn command_buffer(&self, image_index: usize) -> RenderResult<vk::CommandBuffer> {
        self.command_buffers
            .get(image_index)
            .copied()
            .ok_or(RenderError::ImageIndexOutOfRange {
                index: u32::try_from(image_index).unwrap_or(u32::MAX),
                image_count: self.command_buffers.len(),
            })
    }

    fn acquire_image(&mut self) -> RenderResult<u32> {
        match self.swapchain.acquire_next_image() {
            Ok((image_index, suboptimal)) => {
                if suboptimal {
                    log::debug!("Swapchain suboptimal on acquire, rendering image {} anyway", image_index);
                }
                if image_index as usize >= self.command_buffers.len() {
                    return Err(RenderError::ImageIndexOutOfRange {
                        index: image_index,
                        image_count: self.command_buffers.len(),
                    });
                }
                Ok(image_index)
            }
            Err(e) => {
                log::error!("Failed to acquire swap chain image: {:?}", e);
                Err(RenderError::SwapchainAcquireFailed(e))
            }
        }
    }

    fn submit(&mut self, command_buffer: vk::CommandBuffer, image_index: u32) -> RenderResult<()> {
        let result = match self.swapchain.submit_command_buffers(&[command_buffer], image_index) {
            Ok(false) => return Ok(()),
            Ok(true) => vk::Result::SUBOPTIMAL_KHR,
            Err(e) => e,
        };
        log::error!("Failed to present swap chain image {}: {:?}", image_index, result);
        Err(RenderError::SwapchainPresentFailed(result))
    }

    /// Acquire an image and submit its pre-recorded command buffer
    pub fn draw_frame(&mut self) -> RenderResult<()> {
        let image_index = self.acquire_image()?;
        let command_buffer = self.command_buffer(image_index as usize)?;
        self.submit(command_buffer, image_index)?;
        self.frames_rendered += 1;
        Ok(())
    }

    /// Render one frame of the base geometry with animated point lights
    ///
    /// The current frame slot's command buffer is re-recorded against the
    /// acquired image: base mesh first, then the light billboards in the same
    /// render pass. The slot's uniform copy is uploaded before anything is
    /// recorded.
    pub fn draw_scene_frame<U: GlobalUniforms>(
        &mut self,
        frame_time: f32,
        camera: &Camera,
        objects: &mut SceneObjects,
        uniforms: &mut U,
        point_lights: &PointLightSystem<D>,
    ) -> RenderResult<()> {
        let image_index = self.acquire_image()?;
        let frame_index = self.swapchain.current_frame();
        if frame_index >= uniforms.frame_count() {
            log::error!(
                "Frame slot {} has no uniform buffer ({} allocated)",
                frame_index,
                uniforms.frame_count()
            );
            return Err(RenderError::FrameSlotOutOfRange {
                slot: frame_index,
                frame_count: uniforms.frame_count(),
            });
        }
        let command_buffer = self.scene_command_buffer(frame_index)?;

        let mut frame = FrameContext {
            frame_index,
            frame_time,
            command_buffer,
            camera,
            global_descriptor_set: uniforms.descriptor_set(frame_index),
            objects,
        };

        let mut ubo = GlobalUbo::new(camera, self.config.ambient_light_color);
        point_lights.update(&mut frame, &mut ubo);
        uniforms.write(frame_index, &ubo)?;

        self.record_command_buffer(command_buffer, image_index as usize, || point_lights.render(&frame))?;
        self.submit(command_buffer, image_index)?;
        self.frames_rendered += 1;
        Ok(())
    }

    /// Replay the recorded command buffers until the window closes
    ///
    /// Waits for the device to go idle before returning, also on error.
    pub fn run<W: WindowHost>(&mut self, window: &mut W) -> RenderResult<()> {
        log::info!("Entering frame loop");
        let result = loop {
            if window.should_close() {
                break Ok(());
            }
            window.poll_events();
            if let Err(e) = self.draw_frame() {
                break Err(e);
            }
        };
        log::info!("Frame loop finished after {} frames", self.frames_rendered);
        result.and(self.wait_idle())
    }

    /// Render the scene with point lights until the window closes
    ///
    /// Frame time is measured between iterations. Waits for the device to go
    /// idle before returning, also on error.
    pub fn run_scene<W: WindowHost, U: GlobalUniforms>(
        &mut self,
        window: &mut W,
        camera: &Camera,
        objects: &mut SceneObjects,
        uniforms: &mut U,
        point_lights: &PointLightSystem<D>,
    ) -> RenderResult<()> {
        log::info!("Entering scene loop");
        let mut timer = FrameTimer::new();
        let result = loop {
            if window.should_close() {
                break Ok(());
            }
            window.poll_events();
            let frame_time = timer.tick();
            if let Err(e) = self.draw_scene_frame(frame_time, camera, objects, uniforms, point_lights) {
                break Err(e);
            }
        };
        log::info!(
            "Scene loop finished after {} frames ({:.2}s)",
            timer.frame_count(),
            timer.total_time()
        );
        result.and(self.wait_idle())
    }

    /// Rebuild swapchain-dependent state after the swapchain was recreated
    ///
    /// Waits for idle, rebuilds the pipeline for the new render pass and extent,
    /// then reallocates and re-records the command buffers. Scene command
    /// buffers are released and reallocated by the next scene frame.
    pub fn handle_swapchain_recreated(&mut self) -> RenderResult<()> {
        log::debug!(
            "Swapchain recreated: {} images, {}x{}",
            self.swapchain.image_count(),
            self.swapchain.extent().width,
            self.swapchain.extent().height
        );
        self.wait_idle()?;

        let pipeline = Self::create_pipeline(&self.device, &self.swapchain, &self.config, self.pipeline_layout)?;
        self.device.destroy_pipeline(self.pipeline);
        self.pipeline = pipeline;

        self.free_command_buffers();
        self.create_command_buffers()?;
        self.record_command_buffers()
    }

    /// Block until the device has finished all submitted work
    pub fn wait_idle(&self) -> RenderResult<()> {
        self.device.wait_idle().map_err(|e| {
            log::error!("Failed to wait for device idle: {:?}", e);
            RenderError::DeviceWaitIdleFailed(e)
        })
    }

    /// Per-image command buffers
    pub fn command_buffers(&self) -> &[vk::CommandBuffer] {
        &self.command_buffers
    }

    /// Per-slot command buffers of scene frames, empty before the first one
    pub fn scene_command_buffers(&self) -> &[vk::CommandBuffer] {
        &self.scene_command_buffers
    }

    /// Base geometry pipeline
    pub fn pipeline(&self) -> vk::Pipeline {
        self.pipeline
    }

    /// Base geometry pipeline layout
    pub fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }

    /// Uploaded base mesh
    pub fn model(&self) -> &Model<D> {
        &self.model
    }

    /// The swapchain
    pub fn swapchain(&self) -> &S {
        &self.swapchain
    }

    /// The swapchain, for hosts that recreate it in place
    pub fn swapchain_mut(&mut self) -> &mut S {
        &mut self.swapchain
    }

    /// Active configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Frames submitted so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl<D: GpuDevice, S: Swapchain> Drop for FrameRenderer<D, S> {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            log::warn!("Device wait idle failed during teardown: {:?}", e);
        }
        self.free_command_buffers();
        self.device.destroy_pipeline(self.pipeline);
        self.device.destroy_pipeline_layout(self.pipeline_layout);
    }
}

fn recording_failed(image_index: usize, result: vk::Result) -> RenderError {
    log::error!("Failed to record command buffer {}: {:?}", image_index, result);
    RenderError::CommandBufferRecordingFailed { image_index, result }
}
