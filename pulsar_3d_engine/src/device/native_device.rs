//! NativeDevice trait - the operation set the rendering core requires from
//! a native graphics API backend
//!
//! Any backend (Vulkan, Metal, D3D12, or a test mock) that satisfies this
//! operation set can back the core. Handles cross this boundary as opaque
//! `RawHandle`/native-handle-registry values; the core never interprets
//! them. All methods take `&self` - backends use interior mutability for
//! their bookkeeping (the rendering core itself is single-threaded).

use crate::error::Result;
use crate::render::types::{
    Format, ImageLayout, ClearValue, Viewport, Rect2D, IndexType,
    MemoryLocation, BufferUsage, ImageUsage, CommandBufferUsage,
    StageMask, AccessMask,
};
use super::handles::{
    RawHandle, NativeBuffer, NativeImage, NativePipeline, NativeRenderPass,
    NativeShaderModule, NativeSwapchain, NativeDescriptorSet,
    NativeDescriptorSetLayout, NativeCommandBuffer, NativeFramebuffer,
};

/// Result of acquiring the next swap chain image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireResult {
    /// An image was acquired at the given index
    Acquired(u32),
    /// The swap chain no longer matches the surface; rebuild it
    OutOfDate,
}

/// Result of presenting a swap chain image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentResult {
    /// Presentation succeeded
    Presented,
    /// Presentation succeeded but the swap chain is suboptimal; rebuild soon
    Suboptimal,
}

/// Everything the backend reports about a freshly created swap chain
#[derive(Debug, Clone)]
pub struct CreatedSwapchain {
    /// Swap chain + surface handles
    pub swapchain: NativeSwapchain,
    /// Color format of the swap chain images
    pub format: Format,
    /// Actual extent granted by the surface
    pub width: u32,
    pub height: u32,
    /// One image view per swap chain image, in image order. The images and
    /// their memory stay swap-chain-owned; only the views are handed out
    /// (each becomes part of a framebuffer's device object).
    pub image_views: Vec<RawHandle>,
}

/// One attachment description as consumed by render pass creation
///
/// Load/store ops are fixed by the core (load = Clear, store = Store,
/// stencil = DontCare), so only format and layouts travel here.
#[derive(Debug, Clone, Copy)]
pub struct RenderPassAttachmentDesc {
    pub format: Format,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

/// One subpass with its attachment references already partitioned by type
///
/// `depth_stencil` is an `Option` rather than a list: the native API
/// distinguishes "has no depth attachment" (null pointer) from "has zero
/// color attachments" (empty array), and that distinction must survive
/// translation.
#[derive(Debug, Clone, Default)]
pub struct SubpassDescription {
    pub input: Vec<u32>,
    pub color: Vec<u32>,
    pub depth_stencil: Option<u32>,
    pub resolve: Vec<u32>,
}

/// Subpass index marking a dependency on work outside the render pass
pub const SUBPASS_EXTERNAL: u32 = u32::MAX;

/// One subpass dependency, translated verbatim to the native API
/// (the by-region flag is always set by the backend)
#[derive(Debug, Clone, Copy)]
pub struct SubpassDependencyDesc {
    pub src_subpass: u32,
    pub dst_subpass: u32,
    pub src_stage_mask: StageMask,
    pub dst_stage_mask: StageMask,
    pub src_access_mask: AccessMask,
    pub dst_access_mask: AccessMask,
}

/// Complete render pass description handed to the backend
#[derive(Debug, Clone, Default)]
pub struct RenderPassDesc {
    pub attachments: Vec<RenderPassAttachmentDesc>,
    pub subpasses: Vec<SubpassDescription>,
    pub dependencies: Vec<SubpassDependencyDesc>,
}

/// One vertex attribute in a pipeline's vertex input state
#[derive(Debug, Clone, Copy)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: Format,
    pub offset: u32,
}

/// Graphics pipeline state description
///
/// Shader modules are created separately and referenced by handle; the core
/// passes SPIR-V bytecode through opaquely and performs no reflection.
#[derive(Debug, Clone)]
pub struct PipelineStateDesc {
    pub vertex_module: NativeShaderModule,
    pub fragment_module: NativeShaderModule,
    pub vertex_stride: u32,
    pub attributes: Vec<VertexAttribute>,
    pub render_pass: NativeRenderPass,
    pub set_layout: Option<NativeDescriptorSetLayout>,
}

/// Descriptor binding type for set layout creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorType {
    CombinedImageSampler,
    UniformBuffer,
}

/// Native graphics device operation set
///
/// Every fallible native call surfaces a typed `Error` instead of being
/// logged and swallowed; the renderer facade decides whether a failure is
/// recoverable (swap chain out of date) or fatal.
pub trait NativeDevice {
    // ===== BUFFERS =====

    /// Create a buffer and bind memory of the requested location
    fn create_buffer(
        &self,
        size: u64,
        usage: BufferUsage,
        location: MemoryLocation,
    ) -> Result<NativeBuffer>;

    /// Destroy a buffer and free its memory
    fn destroy_buffer(&self, buffer: NativeBuffer) -> Result<()>;

    /// Map host-visible buffer memory; the pointer stays valid until unmap
    fn map_memory(&self, buffer: &NativeBuffer, size: u64) -> Result<*mut u8>;

    /// Unmap previously mapped buffer memory
    fn unmap_memory(&self, buffer: &NativeBuffer) -> Result<()>;

    /// Upload data to a device-local buffer through a staging buffer and a
    /// scope command buffer (submits and waits before returning)
    fn upload_buffer(&self, buffer: &NativeBuffer, data: &[u8]) -> Result<()>;

    // ===== IMAGES =====

    /// Create an image with device-local memory (no view yet)
    fn create_image(
        &self,
        width: u32,
        height: u32,
        format: Format,
        usage: ImageUsage,
    ) -> Result<NativeImage>;

    /// Create an image view with the aspect mask matching the format
    /// (depth vs color)
    fn create_image_view(&self, image: &NativeImage, format: Format) -> Result<RawHandle>;

    /// Transition an image between layouts via a scope command buffer
    fn transition_image_layout(
        &self,
        image: &NativeImage,
        format: Format,
        from: ImageLayout,
        to: ImageLayout,
    ) -> Result<()>;

    /// Upload pixel data to an image through a staging buffer (image must be
    /// in TransferDst layout; submits and waits before returning)
    fn upload_image(
        &self,
        image: &NativeImage,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<()>;

    /// Destroy an image, its view, and free its memory
    fn destroy_image(&self, image: NativeImage) -> Result<()>;

    // ===== SHADERS AND PIPELINES =====

    /// Create a shader module from SPIR-V bytecode (passed through opaquely)
    fn create_shader_module(&self, bytecode: &[u8]) -> Result<NativeShaderModule>;

    /// Destroy a shader module
    fn destroy_shader_module(&self, module: NativeShaderModule) -> Result<()>;

    /// Create a graphics pipeline and its layout
    fn create_pipeline(&self, desc: &PipelineStateDesc) -> Result<NativePipeline>;

    /// Destroy a pipeline and its layout
    fn destroy_pipeline(&self, pipeline: NativePipeline) -> Result<()>;

    // ===== RENDER PASSES AND FRAMEBUFFERS =====

    /// Realize a native render pass from a complete description
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<NativeRenderPass>;

    /// Destroy a render pass
    fn destroy_render_pass(&self, render_pass: NativeRenderPass) -> Result<()>;

    /// Create a framebuffer over the ordered list of image views
    fn create_framebuffer(
        &self,
        render_pass: NativeRenderPass,
        attachment_views: &[RawHandle],
        width: u32,
        height: u32,
    ) -> Result<RawHandle>;

    /// Destroy a framebuffer and the image view it owns (if any)
    fn destroy_framebuffer(&self, framebuffer: NativeFramebuffer) -> Result<()>;

    // ===== SWAP CHAIN =====

    /// Create a swap chain over the surface the backend was constructed
    /// with, clamped to the surface's granted extent
    ///
    /// Returns `Error::Unsupported` when the surface cannot present on the
    /// device's queues - a recoverable condition the caller decides on.
    fn create_swapchain(&self, width: u32, height: u32) -> Result<CreatedSwapchain>;

    /// Destroy a swap chain, its synchronization primitives, and its surface
    fn destroy_swapchain(&self, swapchain: NativeSwapchain) -> Result<()>;

    // ===== DESCRIPTORS =====

    /// Create a descriptor set layout with one binding per entry,
    /// binding indices assigned in order
    fn create_descriptor_set_layout(
        &self,
        bindings: &[DescriptorType],
    ) -> Result<NativeDescriptorSetLayout>;

    /// Destroy a descriptor set layout
    fn destroy_descriptor_set_layout(&self, layout: NativeDescriptorSetLayout) -> Result<()>;

    /// Allocate a descriptor set from the backend's pool
    fn allocate_descriptor_set(
        &self,
        layout: NativeDescriptorSetLayout,
    ) -> Result<NativeDescriptorSet>;

    /// Point binding 0 of a descriptor set at a sampled image
    /// (combined image sampler; the backend owns the sampler)
    fn update_descriptor_set(
        &self,
        set: NativeDescriptorSet,
        image: &NativeImage,
    ) -> Result<()>;

    // ===== COMMAND BUFFERS =====

    /// Allocate a primary command buffer from the backend's pool
    fn allocate_command_buffer(&self) -> Result<NativeCommandBuffer>;

    /// Return a command buffer to the backend's pool
    fn free_command_buffer(&self, command_buffer: NativeCommandBuffer) -> Result<()>;

    // ===== COMMAND RECORDING =====

    fn cmd_begin(&self, cmd: NativeCommandBuffer, usage: CommandBufferUsage) -> Result<()>;

    fn cmd_end(&self, cmd: NativeCommandBuffer) -> Result<()>;

    /// Begin a render pass; clear values are matched to attachments
    /// positionally
    fn cmd_begin_render_pass(
        &self,
        cmd: NativeCommandBuffer,
        render_pass: NativeRenderPass,
        framebuffer: RawHandle,
        width: u32,
        height: u32,
        clear_values: &[ClearValue],
    ) -> Result<()>;

    fn cmd_end_render_pass(&self, cmd: NativeCommandBuffer) -> Result<()>;

    fn cmd_bind_pipeline(&self, cmd: NativeCommandBuffer, pipeline: RawHandle) -> Result<()>;

    /// Bind vertex buffers starting at binding 0
    fn cmd_bind_vertex_buffers(
        &self,
        cmd: NativeCommandBuffer,
        buffers: &[RawHandle],
    ) -> Result<()>;

    fn cmd_bind_index_buffer(
        &self,
        cmd: NativeCommandBuffer,
        buffer: RawHandle,
        index_type: IndexType,
    ) -> Result<()>;

    fn cmd_bind_descriptor_sets(
        &self,
        cmd: NativeCommandBuffer,
        pipeline_layout: RawHandle,
        set: RawHandle,
    ) -> Result<()>;

    /// Issue an indexed draw (instance count 1, first instance 0)
    fn cmd_draw_indexed(
        &self,
        cmd: NativeCommandBuffer,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> Result<()>;

    fn cmd_set_viewport(&self, cmd: NativeCommandBuffer, viewport: Viewport) -> Result<()>;

    fn cmd_set_scissor(&self, cmd: NativeCommandBuffer, scissor: Rect2D) -> Result<()>;

    // ===== FRAME PACING =====

    /// Block until the previous frame's fence for this swap chain signals,
    /// then reset it. One frame in flight per swap chain; the wait uses an
    /// effectively-infinite timeout, so a GPU hang stalls the renderer.
    fn wait_frame_fence(&self, swapchain: &NativeSwapchain) -> Result<()>;

    /// Acquire the next swap chain image (signals the image-available
    /// semaphore)
    fn acquire_next_image(&self, swapchain: &NativeSwapchain) -> Result<AcquireResult>;

    /// Submit the frame's command buffer, waiting on image-available and
    /// signaling render-finished plus the frame fence
    fn submit_frame(
        &self,
        cmd: NativeCommandBuffer,
        swapchain: &NativeSwapchain,
    ) -> Result<()>;

    /// Present the given image, waiting on render-finished
    fn present(&self, swapchain: &NativeSwapchain, image_index: u32) -> Result<PresentResult>;

    /// Block until all GPU work completes
    fn wait_idle(&self) -> Result<()>;
}
