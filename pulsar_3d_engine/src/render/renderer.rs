//! Renderer facade - resource creation, per-frame command recording, and
//! presentation over a swappable native device
//!
//! The facade owns the native device, the per-frame command list, and one
//! primary command buffer (one frame in flight: the frame fence is waited
//! before the command buffer is reused). All rendering calls happen on one
//! thread; the facade takes `&mut self` for anything that touches frame
//! state.
//!
//! Recording protocol per frame:
//! `begin_command_recording` -> `begin_render_pass` -> bind/draw calls ->
//! `end_render_pass` -> `end_command_recording` -> `swap_buffers`.

use winit::window::Window;

use crate::{engine_debug, engine_info};
use crate::error::{Error, Result};
use crate::config::Config;
use crate::command::catalog::{
    BeginCommandBuffer, BeginRenderPass, BindDescriptorSets, BindIndexBuffer, BindPipeline,
    BindVertexBuffers, DrawIndexed, EndCommandBuffer, EndRenderPass, SetScissor, SetViewport,
};
use crate::command::command_list::CommandList;
use crate::device::device_object::DeviceObject;
use crate::device::native_device::{
    AcquireResult, NativeDevice, PipelineStateDesc, PresentResult, RenderPassAttachmentDesc,
    SUBPASS_EXTERNAL, SubpassDependencyDesc,
};
use crate::device::visitors::{
    BufferExtractor, CommandBufferExtractor, DescriptorSetLayoutExtractor, DestroyVisitor,
    RenderPassExtractor, SwapchainExtractor,
};
use super::buffer::{Buffer, BufferKind};
use super::framebuffer::Framebuffer;
use super::pipeline::{Pipeline, PipelineDesc};
use super::render_pass::{AttachmentType, RenderPass, Subpass};
use super::swapchain::SwapchainBase;
use super::texture::Texture;
use super::types::{
    AccessMask, BufferUsage, CommandBufferUsage, Format, ImageLayout, ImageUsage,
    MemoryLocation, Rect2D, StageMask, Viewport,
};

/// The renderer facade
pub struct Renderer {
    device: Box<dyn NativeDevice>,
    config: Config,
    command_list: CommandList,
    command_buffer_object: DeviceObject,
    initialized: bool,
}

impl Renderer {
    /// Wrap a native device; no native calls happen until `initialize`
    pub fn new(device: Box<dyn NativeDevice>, config: Config) -> Self {
        Self {
            device,
            config,
            command_list: CommandList::new(),
            command_buffer_object: DeviceObject::default(),
            initialized: false,
        }
    }

    /// Allocate the frame command buffer and bring the renderer up
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if already initialized; otherwise whatever the
    /// native allocation reported.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(Error::InvalidOperation(
                "renderer initialized twice".to_string(),
            ));
        }
        let command_buffer = self.device.allocate_command_buffer()?;
        self.command_buffer_object.basify(command_buffer);
        self.initialized = true;
        engine_info!("pulsar3d::Renderer", "Renderer initialized: {}", self.config.app_name);
        Ok(())
    }

    /// Wait for the GPU to finish and release the frame command buffer
    ///
    /// Swap chains, buffers, textures, and pipelines must already have been
    /// destroyed by their owners.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if not initialized; otherwise whatever the native
    /// calls reported.
    pub fn deinitialize(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(Error::InvalidOperation(
                "renderer deinitialized without initialize".to_string(),
            ));
        }
        self.device.wait_idle()?;
        self.command_list.clear();
        DestroyVisitor::destroy(self.device.as_ref(), &mut self.command_buffer_object)?;
        self.initialized = false;
        engine_info!("pulsar3d::Renderer", "Renderer deinitialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn device(&self) -> &dyn NativeDevice {
        self.device.as_ref()
    }

    // ===== RESOURCE CREATION =====

    /// Create a swap chain at the given extent
    pub fn create_swapchain(&self, width: u32, height: u32) -> Result<SwapchainBase> {
        SwapchainBase::new(self.device.as_ref(), width, height)
    }

    /// Create a swap chain sized to the window's current inner extent
    pub fn create_swapchain_for_window(&self, window: &Window) -> Result<SwapchainBase> {
        let size = window.inner_size();
        self.create_swapchain(size.width, size.height)
    }

    /// Build and realize the standard forward render pass for a swap chain:
    /// color at attachment 0 (cleared, presented), shared depth at
    /// attachment 1, one subpass, one external dependency gating the color
    /// write on image availability
    pub fn create_forward_render_pass(&self, swapchain: &SwapchainBase) -> Result<RenderPass> {
        let mut render_pass = RenderPass::new();

        render_pass.add_attachment(RenderPassAttachmentDesc {
            format: swapchain.format(),
            initial_layout: ImageLayout::Undefined,
            final_layout: ImageLayout::PresentSrc,
        });
        render_pass.add_attachment(
            swapchain.depth_attachment().lock().unwrap().render_pass_desc(),
        );

        let mut subpass = Subpass::new();
        subpass.add_reference(0, AttachmentType::Color);
        subpass.add_reference(1, AttachmentType::DepthStencil);
        render_pass.add_subpass(subpass);

        render_pass.add_dependency(SubpassDependencyDesc {
            src_subpass: SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage_mask: StageMask::COLOR_ATTACHMENT_OUTPUT
                | StageMask::EARLY_FRAGMENT_TESTS,
            dst_stage_mask: StageMask::COLOR_ATTACHMENT_OUTPUT
                | StageMask::EARLY_FRAGMENT_TESTS,
            src_access_mask: AccessMask::empty(),
            dst_access_mask: AccessMask::COLOR_ATTACHMENT_WRITE
                | AccessMask::DEPTH_STENCIL_ATTACHMENT_WRITE,
        });

        render_pass.create(self.device.as_ref())?;
        Ok(render_pass)
    }

    /// Realize a caller-assembled render pass
    pub fn create_render_pass(&self, render_pass: &mut RenderPass) -> Result<()> {
        render_pass.create(self.device.as_ref())
    }

    /// Create a buffer stream, optionally filled with initial data
    ///
    /// Device-local buffers are filled through a staging buffer and are
    /// immutable afterwards; host-visible buffers are filled through a
    /// direct map and stay mappable.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if `data` is larger than the buffer; otherwise
    /// whatever the native calls reported.
    pub fn create_buffer(
        &self,
        kind: BufferKind,
        stride: u32,
        element_count: u32,
        location: MemoryLocation,
        data: Option<&[u8]>,
    ) -> Result<Buffer> {
        let mut buffer = Buffer::new(kind, stride, element_count, location);
        let size = buffer.size_bytes();

        let mut usage = kind.usage();
        if location == MemoryLocation::DeviceLocal {
            usage |= BufferUsage::TRANSFER_DST;
        }
        let native = self.device.create_buffer(size, usage, location)?;

        if let Some(data) = data {
            if data.len() as u64 > size {
                self.device.destroy_buffer(native)?;
                return Err(Error::InvalidOperation(format!(
                    "buffer data ({} bytes) exceeds buffer size ({size} bytes)",
                    data.len()
                )));
            }
            match location {
                MemoryLocation::DeviceLocal => self.device.upload_buffer(&native, data)?,
                MemoryLocation::HostVisible => {
                    let mapped = self.device.map_memory(&native, size)?;
                    // Mapped range is at least `size` bytes, checked above
                    unsafe {
                        std::ptr::copy_nonoverlapping(data.as_ptr(), mapped, data.len());
                    }
                    self.device.unmap_memory(&native)?;
                }
            }
        }

        buffer.device_object_mut().basify(native);
        Ok(buffer)
    }

    /// Map a host-visible buffer for CPU writes
    ///
    /// # Errors
    ///
    /// `InvalidOperation` for device-local buffers (immutable after
    /// creation) or unrealized buffers.
    pub fn map_memory(&self, buffer: &Buffer) -> Result<*mut u8> {
        if buffer.location() != MemoryLocation::HostVisible {
            return Err(Error::InvalidOperation(
                "mapped a device-local buffer".to_string(),
            ));
        }
        let native = BufferExtractor::extract(buffer.device_object())?;
        self.device.map_memory(&native, buffer.size_bytes())
    }

    /// Unmap a previously mapped buffer
    pub fn unmap_memory(&self, buffer: &Buffer) -> Result<()> {
        let native = BufferExtractor::extract(buffer.device_object())?;
        self.device.unmap_memory(&native)
    }

    /// Create a sampled texture from pixel data and bind it to a fresh
    /// descriptor set allocated from the pipeline's set layout
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the pipeline was built without descriptor
    /// bindings; otherwise whatever the native calls reported.
    pub fn create_texture(
        &self,
        width: u32,
        height: u32,
        format: Format,
        pixels: &[u8],
        pipeline: &Pipeline,
    ) -> Result<Texture> {
        let mut image = self.device.create_image(
            width,
            height,
            format,
            ImageUsage::SAMPLED | ImageUsage::TRANSFER_DST,
        )?;
        self.device.transition_image_layout(
            &image,
            format,
            ImageLayout::Undefined,
            ImageLayout::TransferDst,
        )?;
        self.device.upload_image(&image, width, height, pixels)?;
        self.device.transition_image_layout(
            &image,
            format,
            ImageLayout::TransferDst,
            ImageLayout::ShaderReadOnly,
        )?;
        image.view = self.device.create_image_view(&image, format)?;

        let layout = DescriptorSetLayoutExtractor::extract(pipeline.set_layout_object())?;
        let set = self.device.allocate_descriptor_set(layout)?;
        self.device.update_descriptor_set(set, &image)?;

        let mut texture = Texture::new(width, height, format);
        texture.image_object_mut().basify(image);
        texture.descriptor_set_object_mut().basify(set);
        Ok(texture)
    }

    /// Create a graphics pipeline (shader modules, optional set layout,
    /// pipeline layout, pipeline) against a realized render pass
    pub fn create_pipeline(
        &self,
        desc: &PipelineDesc,
        render_pass: &RenderPass,
    ) -> Result<Pipeline> {
        let vertex_module = self.device.create_shader_module(&desc.vertex_bytecode)?;
        let fragment_module = self.device.create_shader_module(&desc.fragment_bytecode)?;

        let mut pipeline = Pipeline::new();
        pipeline.vertex_module_object_mut().basify(vertex_module);
        pipeline.fragment_module_object_mut().basify(fragment_module);

        let set_layout = if desc.descriptor_bindings.is_empty() {
            None
        } else {
            let layout = self
                .device
                .create_descriptor_set_layout(&desc.descriptor_bindings)?;
            pipeline.set_layout_object_mut().basify(layout);
            Some(layout)
        };

        let native_render_pass = RenderPassExtractor::extract(render_pass.device_object())?;
        let native = self.device.create_pipeline(&PipelineStateDesc {
            vertex_module,
            fragment_module,
            vertex_stride: desc.vertex_stride,
            attributes: desc.attributes.clone(),
            render_pass: native_render_pass,
            set_layout,
        })?;
        pipeline.device_object_mut().basify(native);
        Ok(pipeline)
    }

    // ===== COMMAND RECORDING =====

    /// Start a fresh frame: drop any stale commands and record the
    /// command-buffer begin
    pub fn begin_command_recording(&mut self) -> Result<()> {
        self.require_initialized()?;
        self.command_list.clear();
        self.command_list
            .record(BeginCommandBuffer::new(CommandBufferUsage::ONE_TIME_SUBMIT));
        Ok(())
    }

    /// Record the command-buffer end
    pub fn end_command_recording(&mut self) -> Result<()> {
        self.require_initialized()?;
        self.command_list.record(EndCommandBuffer::new());
        Ok(())
    }

    /// Record a render-pass begin over one framebuffer; clear values travel
    /// in the framebuffer's attachment order
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the render pass or framebuffer has not been
    /// realized.
    pub fn begin_render_pass(
        &mut self,
        render_pass: &RenderPass,
        framebuffer: &Framebuffer,
    ) -> Result<()> {
        self.require_initialized()?;
        let command = BeginRenderPass::new(
            render_pass.device_object(),
            framebuffer.device_object(),
            framebuffer.width(),
            framebuffer.height(),
            framebuffer.clear_values(),
        )?;
        self.command_list.record(command);
        Ok(())
    }

    /// Record a render-pass end
    pub fn end_render_pass(&mut self) -> Result<()> {
        self.require_initialized()?;
        self.command_list.record(EndRenderPass::new());
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.command_list.record(SetViewport::new(viewport));
    }

    pub fn set_scissor(&mut self, scissor: Rect2D) {
        self.command_list.record(SetScissor::new(scissor));
    }

    /// Record a pipeline bind (handle snapshotted now)
    pub fn bind_pipeline(&mut self, pipeline: &Pipeline) -> Result<()> {
        self.command_list
            .record(BindPipeline::new(pipeline.device_object())?);
        Ok(())
    }

    /// Record a vertex-buffer bind for the given streams, at binding 0, in
    /// stream order
    pub fn bind_vertex_buffers(&mut self, buffers: &[&Buffer]) -> Result<()> {
        let objects: Vec<&DeviceObject> =
            buffers.iter().map(|buffer| buffer.device_object()).collect();
        self.command_list.record(BindVertexBuffers::new(&objects)?);
        Ok(())
    }

    /// Record an index-buffer bind; index width follows the stream's
    /// element stride
    pub fn bind_index_buffer(&mut self, buffer: &Buffer) -> Result<()> {
        self.command_list
            .record(BindIndexBuffer::new(buffer.device_object(), buffer.stride())?);
        Ok(())
    }

    /// Record a descriptor-set bind for a texture against a pipeline's
    /// layout
    pub fn bind_texture(&mut self, pipeline: &Pipeline, texture: &Texture) -> Result<()> {
        self.command_list.record(BindDescriptorSets::new(
            pipeline.device_object(),
            texture.descriptor_set_object(),
        )?);
        Ok(())
    }

    /// Record an indexed draw
    pub fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) {
        self.command_list
            .record(DrawIndexed::new(index_count, first_index, vertex_offset));
    }

    // ===== PRESENTATION =====

    /// Replay the recorded frame and present it
    ///
    /// Waits the previous frame's fence before acquiring (one frame in
    /// flight), replays the command list into the frame command buffer,
    /// submits, presents, and clears the list.
    ///
    /// # Errors
    ///
    /// `SwapchainOutOfDate` when acquisition reports the swap chain stale;
    /// the caller rebuilds it (`SwapchainBase::recreate`) and skips the
    /// frame. Other errors are native failures.
    pub fn swap_buffers(&mut self, swapchain: &SwapchainBase) -> Result<()> {
        self.require_initialized()?;
        let native_swapchain = SwapchainExtractor::extract(swapchain.device_object())?;

        self.device.wait_frame_fence(&native_swapchain)?;

        let image_index = match self.device.acquire_next_image(&native_swapchain)? {
            AcquireResult::Acquired(index) => index,
            AcquireResult::OutOfDate => {
                self.command_list.clear();
                return Err(Error::SwapchainOutOfDate);
            }
        };

        self.command_list
            .replay(self.device.as_ref(), &self.command_buffer_object)?;
        let command_buffer = CommandBufferExtractor::extract(&self.command_buffer_object)?;
        self.device.submit_frame(command_buffer, &native_swapchain)?;

        if self.device.present(&native_swapchain, image_index)? == PresentResult::Suboptimal {
            engine_debug!("pulsar3d::Renderer", "Swap chain suboptimal after present");
        }

        self.command_list.clear();
        Ok(())
    }

    // ===== DESTRUCTION =====

    /// Destroy the native resource held by any device object
    pub fn destroy_device_object(&self, object: &mut DeviceObject) -> Result<()> {
        DestroyVisitor::destroy(self.device.as_ref(), object)
    }

    /// Tear down a swap chain (idle wait, depth, framebuffers, swap chain)
    pub fn destroy_swapchain(&self, swapchain: &mut SwapchainBase) -> Result<()> {
        swapchain.destroy(self.device.as_ref())
    }

    /// Destroy a render pass's native resources
    pub fn destroy_render_pass(&self, render_pass: &mut RenderPass) -> Result<()> {
        DestroyVisitor::destroy(self.device.as_ref(), render_pass.device_object_mut())
    }

    /// Destroy a buffer's native resources
    pub fn destroy_buffer(&self, buffer: &mut Buffer) -> Result<()> {
        DestroyVisitor::destroy(self.device.as_ref(), buffer.device_object_mut())
    }

    /// Destroy a texture's image (its descriptor set is pool-owned)
    pub fn destroy_texture(&self, texture: &mut Texture) -> Result<()> {
        DestroyVisitor::destroy(self.device.as_ref(), texture.image_object_mut())?;
        DestroyVisitor::destroy(self.device.as_ref(), texture.descriptor_set_object_mut())
    }

    /// Destroy a pipeline and everything created alongside it
    pub fn destroy_pipeline(&self, pipeline: &mut Pipeline) -> Result<()> {
        DestroyVisitor::destroy(self.device.as_ref(), pipeline.device_object_mut())?;
        DestroyVisitor::destroy(self.device.as_ref(), pipeline.vertex_module_object_mut())?;
        DestroyVisitor::destroy(self.device.as_ref(), pipeline.fragment_module_object_mut())?;
        if !pipeline.set_layout_object().is_empty() {
            DestroyVisitor::destroy(self.device.as_ref(), pipeline.set_layout_object_mut())?;
        }
        Ok(())
    }

    /// Block until all GPU work completes
    pub fn wait_idle(&self) -> Result<()> {
        self.device.wait_idle()
    }

    fn require_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::InvalidOperation(
                "renderer used before initialize".to_string(),
            ))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
