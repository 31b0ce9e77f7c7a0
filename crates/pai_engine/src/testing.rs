//! Test doubles for the render collaborators
//!
//! [`RecordingDevice`] logs every call into a shared list so tests can assert
//! the exact command sequence. [`RecordingUniforms`] writes into the same log,
//! which makes upload-versus-record ordering observable. A
//! [`ScriptedSwapchain`] built with [`ScriptedSwapchain::logging_to`] adds its
//! acquires and submissions too, so [`begins_while_pending`] can replay the
//! fence protocol over one ordered log.

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::config::ShaderConfig;
use crate::render::api::{GlobalUniforms, GpuDevice, GpuVertexBuffer, RenderPassBegin, Swapchain, WindowHost};
use crate::render::frame::GlobalUbo;
use crate::render::pipeline::PipelineConfig;
use crate::render::{RenderError, RenderResult};

/// Pipeline creation as seen by the device
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineCall {
    pub pipeline: vk::Pipeline,
    pub vertex_shader: String,
    pub render_pass: vk::RenderPass,
    pub layout: vk::PipelineLayout,
    pub extent: vk::Extent2D,
    pub blend_enabled: bool,
    pub vertex_bindings: usize,
    pub vertex_attributes: usize,
}

/// One logged call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreatePipelineLayout {
        set_layouts: Vec<vk::DescriptorSetLayout>,
        push_constant_ranges: Vec<(vk::ShaderStageFlags, u32, u32)>,
    },
    DestroyPipelineLayout(vk::PipelineLayout),
    CreatePipeline(PipelineCall),
    DestroyPipeline(vk::Pipeline),
    CreateVertexBuffer { buffer: vk::Buffer, vertex_count: u32 },
    DestroyVertexBuffer(vk::Buffer),
    AllocateCommandBuffers(Vec<vk::CommandBuffer>),
    FreeCommandBuffers(Vec<vk::CommandBuffer>),
    Begin(vk::CommandBuffer),
    End(vk::CommandBuffer),
    BeginRenderPass { command_buffer: vk::CommandBuffer, begin: RenderPassBegin },
    EndRenderPass(vk::CommandBuffer),
    BindPipeline { command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline },
    BindVertexBuffers { command_buffer: vk::CommandBuffer, buffers: Vec<vk::Buffer> },
    BindDescriptorSets {
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: Vec<vk::DescriptorSet>,
    },
    PushConstants {
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: Vec<u8>,
    },
    Draw { command_buffer: vk::CommandBuffer, vertex_count: u32, instance_count: u32 },
    WaitIdle,
    UniformWrite { frame_index: usize, num_lights: i32 },
    Acquire { slot: usize, image_index: u32 },
    Submit { slot: usize, image_index: u32, command_buffers: Vec<vk::CommandBuffer> },
}

/// Command buffers begun while a submission containing them may still execute
///
/// Replays `calls` with per-slot fences: an acquire waits for its slot, and a
/// submission first waits for the last submission that targeted the same image.
pub fn begins_while_pending(calls: &[DeviceCall]) -> Vec<vk::CommandBuffer> {
    let mut pending: HashMap<usize, (u32, Vec<vk::CommandBuffer>)> = HashMap::new();
    let mut hazards = Vec::new();
    for call in calls {
        match call {
            DeviceCall::Acquire { slot, .. } => {
                pending.remove(slot);
            }
            DeviceCall::Begin(command_buffer) => {
                if pending.values().any(|(_, buffers)| buffers.contains(command_buffer)) {
                    hazards.push(*command_buffer);
                }
            }
            DeviceCall::Submit {
                slot,
                image_index,
                command_buffers,
            } => {
                pending.retain(|_, (image, _)| *image != *image_index);
                pending.insert(*slot, (*image_index, command_buffers.clone()));
            }
            _ => {}
        }
    }
    hazards
}

#[derive(Default)]
struct Failures {
    pipeline_layout: Option<vk::Result>,
    pipeline: bool,
    allocation: Option<vk::Result>,
    begin: Option<vk::Result>,
    end: Option<vk::Result>,
    wait_idle: Option<vk::Result>,
}

#[derive(Default)]
struct DeviceState {
    calls: Vec<DeviceCall>,
    next_handle: u64,
    uploaded_bytes: usize,
    failures: Failures,
}

impl DeviceState {
    fn handle(&mut self) -> u64 {
        self.next_handle += 1;
        0x1000 + self.next_handle
    }
}

/// [`GpuDevice`] that logs calls and hands out fake handles
#[derive(Clone, Default)]
pub struct RecordingDevice {
    state: Rc<RefCell<DeviceState>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn command_buffer(raw: u64) -> vk::CommandBuffer {
        vk::CommandBuffer::from_raw(raw)
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn log(&self, call: DeviceCall) {
        self.state.borrow_mut().calls.push(call);
    }

    pub fn uploaded_bytes(&self) -> usize {
        self.state.borrow().uploaded_bytes
    }

    pub fn fail_pipeline_layout(&self, result: vk::Result) {
        self.state.borrow_mut().failures.pipeline_layout = Some(result);
    }

    pub fn fail_pipeline_creation(&self) {
        self.state.borrow_mut().failures.pipeline = true;
    }

    pub fn fail_allocation(&self, result: vk::Result) {
        self.state.borrow_mut().failures.allocation = Some(result);
    }

    pub fn fail_begin(&self, result: vk::Result) {
        self.state.borrow_mut().failures.begin = Some(result);
    }

    pub fn fail_end(&self, result: vk::Result) {
        self.state.borrow_mut().failures.end = Some(result);
    }

    pub fn fail_wait_idle(&self, result: vk::Result) {
        self.state.borrow_mut().failures.wait_idle = Some(result);
    }
}

impl GpuDevice for RecordingDevice {
    fn create_pipeline_layout(
        &self,
        set_layouts: &[vk::DescriptorSetLayout],
        push_constant_ranges: &[vk::PushConstantRange],
    ) -> VkResult<vk::PipelineLayout> {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::CreatePipelineLayout {
            set_layouts: set_layouts.to_vec(),
            push_constant_ranges: push_constant_ranges
                .iter()
                .map(|range| (range.stage_flags, range.offset, range.size))
                .collect(),
        });
        if let Some(result) = state.failures.pipeline_layout {
            return Err(result);
        }
        Ok(vk::PipelineLayout::from_raw(state.handle()))
    }

    fn destroy_pipeline_layout(&self, layout: vk::PipelineLayout) {
        self.log(DeviceCall::DestroyPipelineLayout(layout));
    }

    fn create_graphics_pipeline(
        &self,
        shaders: &ShaderConfig,
        config: &PipelineConfig,
    ) -> RenderResult<vk::Pipeline> {
        let mut state = self.state.borrow_mut();
        if state.failures.pipeline {
            return Err(RenderError::PipelineCreationFailed("scripted failure".to_string()));
        }
        let pipeline = vk::Pipeline::from_raw(state.handle());
        state.calls.push(DeviceCall::CreatePipeline(PipelineCall {
            pipeline,
            vertex_shader: shaders.vertex_shader_path.clone(),
            render_pass: config.render_pass,
            layout: config.pipeline_layout,
            extent: config.scissor.extent,
            blend_enabled: config.color_blend_attachment.blend_enable == vk::TRUE,
            vertex_bindings: config.binding_descriptions.len(),
            vertex_attributes: config.attribute_descriptions.len(),
        }));
        Ok(pipeline)
    }

    fn destroy_pipeline(&self, pipeline: vk::Pipeline) {
        self.log(DeviceCall::DestroyPipeline(pipeline));
    }

    fn create_vertex_buffer(&self, bytes: &[u8], vertex_count: u32) -> RenderResult<GpuVertexBuffer> {
        let mut state = self.state.borrow_mut();
        let buffer = vk::Buffer::from_raw(state.handle());
        let memory = vk::DeviceMemory::from_raw(state.handle());
        state.uploaded_bytes += bytes.len();
        state.calls.push(DeviceCall::CreateVertexBuffer { buffer, vertex_count });
        Ok(GpuVertexBuffer {
            buffer,
            memory,
            vertex_count,
        })
    }

    fn destroy_vertex_buffer(&self, buffer: &GpuVertexBuffer) {
        self.log(DeviceCall::DestroyVertexBuffer(buffer.buffer));
    }

    fn allocate_command_buffers(&self, count: u32) -> VkResult<Vec<vk::CommandBuffer>> {
        let mut state = self.state.borrow_mut();
        if let Some(result) = state.failures.allocation {
            return Err(result);
        }
        let buffers: Vec<_> = (0..count)
            .map(|_| vk::CommandBuffer::from_raw(state.handle()))
            .collect();
        state.calls.push(DeviceCall::AllocateCommandBuffers(buffers.clone()));
        Ok(buffers)
    }

    fn free_command_buffers(&self, buffers: &[vk::CommandBuffer]) {
        self.log(DeviceCall::FreeCommandBuffers(buffers.to_vec()));
    }

    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::Begin(command_buffer));
        state.failures.begin.map_or(Ok(()), Err)
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::End(command_buffer));
        state.failures.end.map_or(Ok(()), Err)
    }

    fn cmd_begin_render_pass(&self, command_buffer: vk::CommandBuffer, begin: &RenderPassBegin) {
        self.log(DeviceCall::BeginRenderPass {
            command_buffer,
            begin: *begin,
        });
    }

    fn cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer) {
        self.log(DeviceCall::EndRenderPass(command_buffer));
    }

    fn cmd_bind_pipeline(&self, command_buffer: vk::CommandBuffer, pipeline: vk::Pipeline) {
        self.log(DeviceCall::BindPipeline {
            command_buffer,
            pipeline,
        });
    }

    fn cmd_bind_vertex_buffers(
        &self,
        command_buffer: vk::CommandBuffer,
        _first_binding: u32,
        buffers: &[vk::Buffer],
        _offsets: &[vk::DeviceSize],
    ) {
        self.log(DeviceCall::BindVertexBuffers {
            command_buffer,
            buffers: buffers.to_vec(),
        });
    }

    fn cmd_bind_descriptor_sets(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    ) {
        self.log(DeviceCall::BindDescriptorSets {
            command_buffer,
            layout,
            first_set,
            sets: sets.to_vec(),
        });
    }

    fn cmd_push_constants(
        &self,
        command_buffer: vk::CommandBuffer,
        layout: vk::PipelineLayout,
        stages: vk::ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) {
        self.log(DeviceCall::PushConstants {
            command_buffer,
            layout,
            stages,
            offset,
            data: data.to_vec(),
        });
    }

    fn cmd_draw(
        &self,
        command_buffer: vk::CommandBuffer,
        vertex_count: u32,
        instance_count: u32,
        _first_vertex: u32,
        _first_instance: u32,
    ) {
        self.log(DeviceCall::Draw {
            command_buffer,
            vertex_count,
            instance_count,
        });
    }

    fn wait_idle(&self) -> VkResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(DeviceCall::WaitIdle);
        state.failures.wait_idle.map_or(Ok(()), Err)
    }
}

/// [`Swapchain`] replaying queued acquire and present results
///
/// With an empty queue, acquire cycles through the images and present succeeds.
/// The frame slot advances on every submission.
pub struct ScriptedSwapchain {
    pub image_count: usize,
    pub frames_in_flight: usize,
    pub extent: vk::Extent2D,
    pub render_pass: vk::RenderPass,
    pub submissions: Vec<(Vec<vk::CommandBuffer>, u32)>,
    pub acquire_calls: usize,
    current_frame: usize,
    log: Option<RecordingDevice>,
    acquire_results: VecDeque<VkResult<(u32, bool)>>,
    present_results: VecDeque<VkResult<bool>>,
}

impl ScriptedSwapchain {
    pub fn new(image_count: usize) -> Self {
        Self {
            image_count,
            frames_in_flight: 2,
            extent: vk::Extent2D {
                width: 800,
                height: 600,
            },
            render_pass: vk::RenderPass::from_raw(0xAA),
            submissions: Vec::new(),
            acquire_calls: 0,
            current_frame: 0,
            log: None,
            acquire_results: VecDeque::new(),
            present_results: VecDeque::new(),
        }
    }

    /// Also log acquires and submissions into `device`'s call list
    pub fn logging_to(image_count: usize, device: &RecordingDevice) -> Self {
        Self {
            log: Some(device.clone()),
            ..Self::new(image_count)
        }
    }

    pub fn push_acquire(&mut self, result: VkResult<(u32, bool)>) {
        self.acquire_results.push_back(result);
    }

    pub fn push_present(&mut self, result: VkResult<bool>) {
        self.present_results.push_back(result);
    }

    pub fn framebuffer_handle(index: usize) -> vk::Framebuffer {
        vk::Framebuffer::from_raw(0xF00 + index as u64)
    }
}

impl Swapchain for ScriptedSwapchain {
    fn image_count(&self) -> usize {
        self.image_count
    }

    fn render_pass(&self) -> vk::RenderPass {
        self.render_pass
    }

    fn framebuffer(&self, index: usize) -> vk::Framebuffer {
        Self::framebuffer_handle(index)
    }

    fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    fn current_frame(&self) -> usize {
        self.current_frame
    }

    fn acquire_next_image(&mut self) -> VkResult<(u32, bool)> {
        let call = self.acquire_calls;
        self.acquire_calls += 1;
        let result = self
            .acquire_results
            .pop_front()
            .unwrap_or(Ok(((call % self.image_count.max(1)) as u32, false)));
        if let (Some(log), Ok((image_index, _))) = (&self.log, &result) {
            log.log(DeviceCall::Acquire {
                slot: self.current_frame,
                image_index: *image_index,
            });
        }
        result
    }

    fn submit_command_buffers(
        &mut self,
        command_buffers: &[vk::CommandBuffer],
        image_index: u32,
    ) -> VkResult<bool> {
        self.submissions.push((command_buffers.to_vec(), image_index));
        if let Some(log) = &self.log {
            log.log(DeviceCall::Submit {
                slot: self.current_frame,
                image_index,
                command_buffers: command_buffers.to_vec(),
            });
        }
        self.current_frame = (self.current_frame + 1) % self.frames_in_flight.max(1);
        self.present_results.pop_front().unwrap_or(Ok(false))
    }
}

/// [`WindowHost`] that closes after a fixed number of polls
pub struct ScriptedWindow {
    pub frames: usize,
    pub polls: usize,
}

impl ScriptedWindow {
    pub fn closing_after(frames: usize) -> Self {
        Self { frames, polls: 0 }
    }
}

impl WindowHost for ScriptedWindow {
    fn should_close(&self) -> bool {
        self.polls >= self.frames
    }

    fn poll_events(&mut self) {
        self.polls += 1;
    }
}

/// [`GlobalUniforms`] that keeps every written block
pub struct RecordingUniforms {
    device: RecordingDevice,
    frame_count: usize,
    pub writes: Vec<(usize, GlobalUbo)>,
}

impl RecordingUniforms {
    pub fn new(device: &RecordingDevice, frame_count: usize) -> Self {
        Self {
            device: device.clone(),
            frame_count,
            writes: Vec::new(),
        }
    }

    pub fn set_handle(frame_index: usize) -> vk::DescriptorSet {
        vk::DescriptorSet::from_raw(0x500 + frame_index as u64)
    }

    pub fn layout_handle() -> vk::DescriptorSetLayout {
        vk::DescriptorSetLayout::from_raw(0x400)
    }
}

impl GlobalUniforms for RecordingUniforms {
    fn frame_count(&self) -> usize {
        self.frame_count
    }

    fn descriptor_set_layout(&self) -> vk::DescriptorSetLayout {
        Self::layout_handle()
    }

    fn descriptor_set(&self, frame_index: usize) -> vk::DescriptorSet {
        Self::set_handle(frame_index)
    }

    fn write(&mut self, frame_index: usize, ubo: &GlobalUbo) -> RenderResult<()> {
        self.device.log(DeviceCall::UniformWrite {
            frame_index,
            num_lights: ubo.num_lights,
        });
        self.writes.push((frame_index, *ubo));
        Ok(())
    }
}
