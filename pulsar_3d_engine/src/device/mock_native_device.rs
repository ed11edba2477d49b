/// Mock NativeDevice for unit tests (no GPU required)
///
/// Mints fake handles from a counter, records every operation in a call
/// log, and lets tests script acquire/present outcomes. Renderer-level
/// logic (recording, replay, teardown ordering, frame pacing) is verified
/// against the call log.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::render::types::{
    Format, ImageLayout, ClearValue, Viewport, Rect2D, IndexType,
    MemoryLocation, BufferUsage, ImageUsage, CommandBufferUsage,
};
use super::handles::{
    RawHandle, NativeBuffer, NativeImage, NativePipeline, NativeFramebuffer,
    NativeRenderPass, NativeShaderModule, NativeSwapchain, NativeDescriptorSet,
    NativeDescriptorSetLayout, NativeCommandBuffer,
};
use super::native_device::{
    NativeDevice, AcquireResult, PresentResult, CreatedSwapchain,
    RenderPassDesc, PipelineStateDesc, DescriptorType,
};

#[derive(Default)]
struct MockState {
    next_handle: RawHandle,
    calls: Vec<String>,
    acquire_results: VecDeque<AcquireResult>,
    present_results: VecDeque<PresentResult>,
    mapped: HashMap<RawHandle, Vec<u8>>,
}

/// Scriptable fake backend
///
/// Clones share state, so a test can keep one handle while handing another
/// to a `Renderer` by value.
#[derive(Default, Clone)]
pub struct MockNativeDevice {
    state: Arc<Mutex<MockState>>,
}

impl MockNativeDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn mint(&self) -> RawHandle {
        let mut state = self.state.lock().unwrap();
        state.next_handle += 1;
        state.next_handle
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }

    /// Snapshot of the call log
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of logged calls whose name starts with `prefix`
    pub fn call_count(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Positions of calls starting with `prefix`, in log order
    pub fn call_positions(&self, prefix: &str) -> Vec<usize> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .enumerate()
            .filter(|(_, c)| c.starts_with(prefix))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Script the outcome of the next unscripted `acquire_next_image`
    pub fn queue_acquire_result(&self, result: AcquireResult) {
        self.state.lock().unwrap().acquire_results.push_back(result);
    }

    /// Script the outcome of the next unscripted `present`
    pub fn queue_present_result(&self, result: PresentResult) {
        self.state.lock().unwrap().present_results.push_back(result);
    }
}

impl NativeDevice for MockNativeDevice {
    fn create_buffer(
        &self,
        size: u64,
        _usage: BufferUsage,
        location: MemoryLocation,
    ) -> Result<NativeBuffer> {
        self.record(format!("create_buffer({size}, {location:?})"));
        Ok(NativeBuffer {
            buffer: self.mint(),
            memory: self.mint(),
        })
    }

    fn destroy_buffer(&self, buffer: NativeBuffer) -> Result<()> {
        self.record(format!("destroy_buffer({})", buffer.buffer));
        self.state.lock().unwrap().mapped.remove(&buffer.buffer);
        Ok(())
    }

    fn map_memory(&self, buffer: &NativeBuffer, size: u64) -> Result<*mut u8> {
        self.record(format!("map_memory({}, {size})", buffer.buffer));
        let mut state = self.state.lock().unwrap();
        let backing = state
            .mapped
            .entry(buffer.buffer)
            .or_insert_with(|| vec![0u8; size as usize]);
        Ok(backing.as_mut_ptr())
    }

    fn unmap_memory(&self, buffer: &NativeBuffer) -> Result<()> {
        self.record(format!("unmap_memory({})", buffer.buffer));
        Ok(())
    }

    fn upload_buffer(&self, buffer: &NativeBuffer, data: &[u8]) -> Result<()> {
        self.record(format!("upload_buffer({}, {} bytes)", buffer.buffer, data.len()));
        Ok(())
    }

    fn create_image(
        &self,
        width: u32,
        height: u32,
        format: Format,
        _usage: ImageUsage,
    ) -> Result<NativeImage> {
        self.record(format!("create_image({width}x{height}, {format:?})"));
        Ok(NativeImage {
            image: self.mint(),
            memory: self.mint(),
            view: 0,
        })
    }

    fn create_image_view(&self, image: &NativeImage, format: Format) -> Result<RawHandle> {
        self.record(format!("create_image_view({}, {format:?})", image.image));
        Ok(self.mint())
    }

    fn transition_image_layout(
        &self,
        image: &NativeImage,
        _format: Format,
        from: ImageLayout,
        to: ImageLayout,
    ) -> Result<()> {
        self.record(format!(
            "transition_image_layout({}, {from:?} -> {to:?})",
            image.image
        ));
        Ok(())
    }

    fn upload_image(
        &self,
        image: &NativeImage,
        _width: u32,
        _height: u32,
        data: &[u8],
    ) -> Result<()> {
        self.record(format!("upload_image({}, {} bytes)", image.image, data.len()));
        Ok(())
    }

    fn destroy_image(&self, image: NativeImage) -> Result<()> {
        self.record(format!("destroy_image({})", image.image));
        Ok(())
    }

    fn create_shader_module(&self, bytecode: &[u8]) -> Result<NativeShaderModule> {
        self.record(format!("create_shader_module({} bytes)", bytecode.len()));
        Ok(NativeShaderModule { module: self.mint() })
    }

    fn destroy_shader_module(&self, module: NativeShaderModule) -> Result<()> {
        self.record(format!("destroy_shader_module({})", module.module));
        Ok(())
    }

    fn create_pipeline(&self, _desc: &PipelineStateDesc) -> Result<NativePipeline> {
        self.record("create_pipeline".to_string());
        Ok(NativePipeline {
            pipeline: self.mint(),
            layout: self.mint(),
        })
    }

    fn destroy_pipeline(&self, pipeline: NativePipeline) -> Result<()> {
        self.record(format!("destroy_pipeline({})", pipeline.pipeline));
        Ok(())
    }

    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<NativeRenderPass> {
        self.record(format!(
            "create_render_pass({} attachments, {} subpasses)",
            desc.attachments.len(),
            desc.subpasses.len()
        ));
        Ok(NativeRenderPass { render_pass: self.mint() })
    }

    fn destroy_render_pass(&self, render_pass: NativeRenderPass) -> Result<()> {
        self.record(format!("destroy_render_pass({})", render_pass.render_pass));
        Ok(())
    }

    fn create_framebuffer(
        &self,
        render_pass: NativeRenderPass,
        attachment_views: &[RawHandle],
        width: u32,
        height: u32,
    ) -> Result<RawHandle> {
        self.record(format!(
            "create_framebuffer({}, {attachment_views:?}, {width}x{height})",
            render_pass.render_pass
        ));
        Ok(self.mint())
    }

    fn destroy_framebuffer(&self, framebuffer: NativeFramebuffer) -> Result<()> {
        self.record(format!("destroy_framebuffer({})", framebuffer.framebuffer));
        Ok(())
    }

    fn create_swapchain(&self, width: u32, height: u32) -> Result<CreatedSwapchain> {
        self.record(format!("create_swapchain({width}x{height})"));
        let swapchain = NativeSwapchain {
            swapchain: self.mint(),
            surface: self.mint(),
        };
        // Three images, like a typical mailbox swap chain
        let image_views = vec![self.mint(), self.mint(), self.mint()];
        Ok(CreatedSwapchain {
            swapchain,
            format: Format::B8G8R8A8_SRGB,
            width,
            height,
            image_views,
        })
    }

    fn destroy_swapchain(&self, swapchain: NativeSwapchain) -> Result<()> {
        self.record(format!("destroy_swapchain({})", swapchain.swapchain));
        Ok(())
    }

    fn create_descriptor_set_layout(
        &self,
        bindings: &[DescriptorType],
    ) -> Result<NativeDescriptorSetLayout> {
        self.record(format!("create_descriptor_set_layout({} bindings)", bindings.len()));
        Ok(NativeDescriptorSetLayout { layout: self.mint() })
    }

    fn destroy_descriptor_set_layout(&self, layout: NativeDescriptorSetLayout) -> Result<()> {
        self.record(format!("destroy_descriptor_set_layout({})", layout.layout));
        Ok(())
    }

    fn allocate_descriptor_set(
        &self,
        layout: NativeDescriptorSetLayout,
    ) -> Result<NativeDescriptorSet> {
        self.record(format!("allocate_descriptor_set({})", layout.layout));
        Ok(NativeDescriptorSet { set: self.mint() })
    }

    fn update_descriptor_set(&self, set: NativeDescriptorSet, image: &NativeImage) -> Result<()> {
        self.record(format!("update_descriptor_set({}, {})", set.set, image.image));
        Ok(())
    }

    fn allocate_command_buffer(&self) -> Result<NativeCommandBuffer> {
        self.record("allocate_command_buffer".to_string());
        Ok(NativeCommandBuffer { command_buffer: self.mint() })
    }

    fn free_command_buffer(&self, command_buffer: NativeCommandBuffer) -> Result<()> {
        self.record(format!("free_command_buffer({})", command_buffer.command_buffer));
        Ok(())
    }

    fn cmd_begin(&self, cmd: NativeCommandBuffer, usage: CommandBufferUsage) -> Result<()> {
        self.record(format!("cmd_begin({}, {usage:?})", cmd.command_buffer));
        Ok(())
    }

    fn cmd_end(&self, cmd: NativeCommandBuffer) -> Result<()> {
        self.record(format!("cmd_end({})", cmd.command_buffer));
        Ok(())
    }

    fn cmd_begin_render_pass(
        &self,
        cmd: NativeCommandBuffer,
        render_pass: NativeRenderPass,
        framebuffer: RawHandle,
        width: u32,
        height: u32,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        self.record(format!(
            "cmd_begin_render_pass({}, {}, {framebuffer}, {width}x{height}, {} clears)",
            cmd.command_buffer,
            render_pass.render_pass,
            clear_values.len()
        ));
        Ok(())
    }

    fn cmd_end_render_pass(&self, cmd: NativeCommandBuffer) -> Result<()> {
        self.record(format!("cmd_end_render_pass({})", cmd.command_buffer));
        Ok(())
    }

    fn cmd_bind_pipeline(&self, cmd: NativeCommandBuffer, pipeline: RawHandle) -> Result<()> {
        self.record(format!("cmd_bind_pipeline({}, {pipeline})", cmd.command_buffer));
        Ok(())
    }

    fn cmd_bind_vertex_buffers(
        &self,
        cmd: NativeCommandBuffer,
        buffers: &[RawHandle],
    ) -> Result<()> {
        self.record(format!(
            "cmd_bind_vertex_buffers({}, {buffers:?})",
            cmd.command_buffer
        ));
        Ok(())
    }

    fn cmd_bind_index_buffer(
        &self,
        cmd: NativeCommandBuffer,
        buffer: RawHandle,
        index_type: IndexType,
    ) -> Result<()> {
        self.record(format!(
            "cmd_bind_index_buffer({}, {buffer}, {index_type:?})",
            cmd.command_buffer
        ));
        Ok(())
    }

    fn cmd_bind_descriptor_sets(
        &self,
        cmd: NativeCommandBuffer,
        pipeline_layout: RawHandle,
        set: RawHandle,
    ) -> Result<()> {
        self.record(format!(
            "cmd_bind_descriptor_sets({}, {pipeline_layout}, {set})",
            cmd.command_buffer
        ));
        Ok(())
    }

    fn cmd_draw_indexed(
        &self,
        cmd: NativeCommandBuffer,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> Result<()> {
        self.record(format!(
            "cmd_draw_indexed({}, {index_count}, {first_index}, {vertex_offset})",
            cmd.command_buffer
        ));
        Ok(())
    }

    fn cmd_set_viewport(&self, cmd: NativeCommandBuffer, viewport: Viewport) -> Result<()> {
        self.record(format!(
            "cmd_set_viewport({}, {}x{})",
            cmd.command_buffer, viewport.width, viewport.height
        ));
        Ok(())
    }

    fn cmd_set_scissor(&self, cmd: NativeCommandBuffer, scissor: Rect2D) -> Result<()> {
        self.record(format!(
            "cmd_set_scissor({}, {}x{})",
            cmd.command_buffer, scissor.width, scissor.height
        ));
        Ok(())
    }

    fn wait_frame_fence(&self, swapchain: &NativeSwapchain) -> Result<()> {
        self.record(format!("wait_frame_fence({})", swapchain.swapchain));
        Ok(())
    }

    fn acquire_next_image(&self, swapchain: &NativeSwapchain) -> Result<AcquireResult> {
        self.record(format!("acquire_next_image({})", swapchain.swapchain));
        let scripted = self.state.lock().unwrap().acquire_results.pop_front();
        Ok(scripted.unwrap_or(AcquireResult::Acquired(0)))
    }

    fn submit_frame(&self, cmd: NativeCommandBuffer, swapchain: &NativeSwapchain) -> Result<()> {
        self.record(format!(
            "submit_frame({}, {})",
            cmd.command_buffer, swapchain.swapchain
        ));
        Ok(())
    }

    fn present(&self, swapchain: &NativeSwapchain, image_index: u32) -> Result<PresentResult> {
        self.record(format!("present({}, {image_index})", swapchain.swapchain));
        let scripted = self.state.lock().unwrap().present_results.pop_front();
        Ok(scripted.unwrap_or(PresentResult::Presented))
    }

    fn wait_idle(&self) -> Result<()> {
        self.record("wait_idle".to_string());
        Ok(())
    }
}
