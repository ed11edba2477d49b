//! Command catalog - the concrete command payload types
//!
//! Each payload is a small immutable value with `on_execute` (record into a
//! native command buffer) and nothing else. Payload constructors that
//! reference GPU resources take `DeviceObject`s and run the typed
//! extraction visitor immediately: native handles are captured at
//! construction time, never at execution time. That binds each command to
//! whatever was alive when the list was built - the caller keeps the source
//! device objects alive for the frame, and later mutation of those objects
//! cannot retarget an already-recorded command.

use crate::error::Result;
use crate::device::device_object::DeviceObject;
use crate::device::handles::{RawHandle, NativeCommandBuffer, NativeRenderPass};
use crate::device::native_device::NativeDevice;
use crate::device::visitors::{
    BufferExtractor, FramebufferExtractor, PipelineExtractor, RenderPassExtractor,
    DescriptorSetExtractor,
};
use crate::render::types::{ClearValue, CommandBufferUsage, IndexType, Rect2D, Viewport};

// ============================================================================
// Begin / End command buffer
// ============================================================================

/// Begin command buffer recording with the captured usage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeginCommandBuffer {
    usage: CommandBufferUsage,
}

impl BeginCommandBuffer {
    pub fn new(usage: CommandBufferUsage) -> Self {
        Self { usage }
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_begin(cmd, self.usage)
    }
}

/// End command buffer recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndCommandBuffer;

impl EndCommandBuffer {
    pub fn new() -> Self {
        Self
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_end(cmd)
    }
}

// ============================================================================
// Begin / End render pass
// ============================================================================

/// Begin a render pass over a framebuffer
///
/// Render pass and framebuffer handles are extracted from their device
/// objects at construction. Clear values travel in attachment-insertion
/// order; the native call matches them to attachments positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct BeginRenderPass {
    render_pass: NativeRenderPass,
    framebuffer: RawHandle,
    width: u32,
    height: u32,
    clear_values: Vec<ClearValue>,
}

impl BeginRenderPass {
    /// # Errors
    ///
    /// `InvalidOperation` if either device object holds the wrong payload
    /// kind (or none).
    pub fn new(
        render_pass_object: &DeviceObject,
        framebuffer_object: &DeviceObject,
        width: u32,
        height: u32,
        clear_values: Vec<ClearValue>,
    ) -> Result<Self> {
        let render_pass = RenderPassExtractor::extract(render_pass_object)?;
        let framebuffer = FramebufferExtractor::extract(framebuffer_object)?;
        Ok(Self {
            render_pass,
            framebuffer: framebuffer.framebuffer,
            width,
            height,
            clear_values,
        })
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_begin_render_pass(
            cmd,
            self.render_pass,
            self.framebuffer,
            self.width,
            self.height,
            &self.clear_values,
        )
    }
}

/// End the current render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndRenderPass;

impl EndRenderPass {
    pub fn new() -> Self {
        Self
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_end_render_pass(cmd)
    }
}

// ============================================================================
// Bind commands
// ============================================================================

/// Bind a graphics pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindPipeline {
    pipeline: RawHandle,
}

impl BindPipeline {
    /// # Errors
    ///
    /// `InvalidOperation` if `pipeline_object` holds no pipeline payload.
    pub fn new(pipeline_object: &DeviceObject) -> Result<Self> {
        let pipeline = PipelineExtractor::extract(pipeline_object)?;
        Ok(Self { pipeline: pipeline.pipeline })
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_bind_pipeline(cmd, self.pipeline)
    }
}

/// Bind vertex buffers at binding 0, in the given stream order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindVertexBuffers {
    buffers: Vec<RawHandle>,
}

impl BindVertexBuffers {
    /// # Errors
    ///
    /// `InvalidOperation` if any object holds no buffer payload.
    pub fn new(buffer_objects: &[&DeviceObject]) -> Result<Self> {
        let mut buffers = Vec::with_capacity(buffer_objects.len());
        for object in buffer_objects {
            buffers.push(BufferExtractor::extract(object)?.buffer);
        }
        Ok(Self { buffers })
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_bind_vertex_buffers(cmd, &self.buffers)
    }
}

/// Bind an index buffer; index width chosen by the stream's element stride
/// (2-byte stride reads 16-bit indices, anything else 32-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindIndexBuffer {
    buffer: RawHandle,
    index_type: IndexType,
}

impl BindIndexBuffer {
    /// # Errors
    ///
    /// `InvalidOperation` if `buffer_object` holds no buffer payload.
    pub fn new(buffer_object: &DeviceObject, element_stride: u32) -> Result<Self> {
        let buffer = BufferExtractor::extract(buffer_object)?;
        let index_type = if element_stride == 2 {
            IndexType::U16
        } else {
            IndexType::U32
        };
        Ok(Self {
            buffer: buffer.buffer,
            index_type,
        })
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_bind_index_buffer(cmd, self.buffer, self.index_type)
    }
}

/// Bind one descriptor set against a pipeline's layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindDescriptorSets {
    pipeline_layout: RawHandle,
    set: RawHandle,
}

impl BindDescriptorSets {
    /// # Errors
    ///
    /// `InvalidOperation` if either object holds the wrong payload kind.
    pub fn new(pipeline_object: &DeviceObject, set_object: &DeviceObject) -> Result<Self> {
        let pipeline = PipelineExtractor::extract(pipeline_object)?;
        let set = DescriptorSetExtractor::extract(set_object)?;
        Ok(Self {
            pipeline_layout: pipeline.layout,
            set: set.set,
        })
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_bind_descriptor_sets(cmd, self.pipeline_layout, self.set)
    }
}

// ============================================================================
// Draw and dynamic state
// ============================================================================

/// Issue an indexed draw (instance count 1, first instance 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawIndexed {
    index_count: u32,
    first_index: u32,
    vertex_offset: i32,
}

impl DrawIndexed {
    pub fn new(index_count: u32, first_index: u32, vertex_offset: i32) -> Self {
        Self {
            index_count,
            first_index,
            vertex_offset,
        }
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_draw_indexed(cmd, self.index_count, self.first_index, self.vertex_offset)
    }
}

/// Set the dynamic viewport state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetViewport {
    viewport: Viewport,
}

impl SetViewport {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_set_viewport(cmd, self.viewport)
    }
}

/// Set the dynamic scissor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetScissor {
    scissor: Rect2D,
}

impl SetScissor {
    pub fn new(scissor: Rect2D) -> Self {
        Self { scissor }
    }

    pub fn on_execute(&self, device: &dyn NativeDevice, cmd: NativeCommandBuffer) -> Result<()> {
        device.cmd_set_scissor(cmd, self.scissor)
    }
}
