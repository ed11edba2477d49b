//! DeviceObject - type-erased owning container for one native resource
//!
//! A `DeviceObject` holds exactly one native-handle-registry value at a time
//! (or nothing). Renderer-level wrappers (Buffer, Attachment, RenderPass,
//! SwapchainBase, Pipeline, ...) each own one and never touch raw handles
//! directly; the only sanctioned way to read the payload is visitor dispatch
//! through `accept`, which stays exhaustive as kinds are added.
//!
//! Dropping a `DeviceObject` never releases the native GPU resource. The
//! owner must ask the renderer for explicit destruction
//! (`Renderer::destroy_device_object`), because native teardown requires a
//! live device and completed GPU work.

use crate::error::{Error, Result};
use super::handles::{
    NativeBuffer, NativeImage, NativePipeline, NativeFramebuffer, NativeRenderPass,
    NativeShaderModule, NativeSwapchain, NativeDescriptorSet, NativeDescriptorSetLayout,
    NativeCommandBuffer,
};
use super::visitors::DeviceObjectVisitor;

/// Type-erased owning handle to exactly one native GPU resource value
///
/// Move-only: native handles must never be silently duplicated, that would
/// create double-free hazards. Use `take()` to move the payload out and
/// leave the source empty.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum DeviceObject {
    /// No payload. Visiting this state is a caller error.
    #[default]
    Empty,
    Buffer(NativeBuffer),
    Image(NativeImage),
    Pipeline(NativePipeline),
    Framebuffer(NativeFramebuffer),
    RenderPass(NativeRenderPass),
    ShaderModule(NativeShaderModule),
    Swapchain(NativeSwapchain),
    DescriptorSet(NativeDescriptorSet),
    DescriptorSetLayout(NativeDescriptorSetLayout),
    CommandBuffer(NativeCommandBuffer),
}

impl DeviceObject {
    /// Place a new payload into this object, dropping any previous payload
    ///
    /// The previous payload's native resource is NOT released; callers that
    /// still own a live native resource must destroy it first.
    pub fn basify<P: Into<DeviceObject>>(&mut self, payload: P) {
        *self = payload.into();
    }

    /// Move the payload out, leaving this object empty
    ///
    /// A subsequent `accept` on this object takes the empty branch.
    pub fn take(&mut self) -> DeviceObject {
        std::mem::take(self)
    }

    /// Whether this object currently holds no payload
    pub fn is_empty(&self) -> bool {
        matches!(self, DeviceObject::Empty)
    }

    /// Human-readable name of the stored kind (diagnostics only)
    pub fn kind_name(&self) -> &'static str {
        match self {
            DeviceObject::Empty => "Empty",
            DeviceObject::Buffer(_) => "Buffer",
            DeviceObject::Image(_) => "Image",
            DeviceObject::Pipeline(_) => "Pipeline",
            DeviceObject::Framebuffer(_) => "Framebuffer",
            DeviceObject::RenderPass(_) => "RenderPass",
            DeviceObject::ShaderModule(_) => "ShaderModule",
            DeviceObject::Swapchain(_) => "Swapchain",
            DeviceObject::DescriptorSet(_) => "DescriptorSet",
            DeviceObject::DescriptorSetLayout(_) => "DescriptorSetLayout",
            DeviceObject::CommandBuffer(_) => "CommandBuffer",
        }
    }

    /// Double-dispatch entry point: forward to the visitor method matching
    /// the stored payload kind
    ///
    /// # Errors
    ///
    /// Visiting an empty object signals `InvalidOperation` - it must fail
    /// loudly rather than silently produce null handles.
    pub fn accept(&self, visitor: &mut dyn DeviceObjectVisitor) -> Result<()> {
        match self {
            DeviceObject::Empty => Err(Error::InvalidOperation(
                "visited an empty device object".to_string(),
            )),
            DeviceObject::Buffer(buffer) => {
                visitor.visit_buffer(buffer);
                Ok(())
            }
            DeviceObject::Image(image) => {
                visitor.visit_image(image);
                Ok(())
            }
            DeviceObject::Pipeline(pipeline) => {
                visitor.visit_pipeline(pipeline);
                Ok(())
            }
            DeviceObject::Framebuffer(framebuffer) => {
                visitor.visit_framebuffer(framebuffer);
                Ok(())
            }
            DeviceObject::RenderPass(render_pass) => {
                visitor.visit_render_pass(render_pass);
                Ok(())
            }
            DeviceObject::ShaderModule(module) => {
                visitor.visit_shader_module(module);
                Ok(())
            }
            DeviceObject::Swapchain(swapchain) => {
                visitor.visit_swapchain(swapchain);
                Ok(())
            }
            DeviceObject::DescriptorSet(set) => {
                visitor.visit_descriptor_set(set);
                Ok(())
            }
            DeviceObject::DescriptorSetLayout(layout) => {
                visitor.visit_descriptor_set_layout(layout);
                Ok(())
            }
            DeviceObject::CommandBuffer(command_buffer) => {
                visitor.visit_command_buffer(command_buffer);
                Ok(())
            }
        }
    }
}

// From impls so wrappers can basify() any handle-registry value directly

impl From<NativeBuffer> for DeviceObject {
    fn from(value: NativeBuffer) -> Self {
        DeviceObject::Buffer(value)
    }
}

impl From<NativeImage> for DeviceObject {
    fn from(value: NativeImage) -> Self {
        DeviceObject::Image(value)
    }
}

impl From<NativePipeline> for DeviceObject {
    fn from(value: NativePipeline) -> Self {
        DeviceObject::Pipeline(value)
    }
}

impl From<NativeFramebuffer> for DeviceObject {
    fn from(value: NativeFramebuffer) -> Self {
        DeviceObject::Framebuffer(value)
    }
}

impl From<NativeRenderPass> for DeviceObject {
    fn from(value: NativeRenderPass) -> Self {
        DeviceObject::RenderPass(value)
    }
}

impl From<NativeShaderModule> for DeviceObject {
    fn from(value: NativeShaderModule) -> Self {
        DeviceObject::ShaderModule(value)
    }
}

impl From<NativeSwapchain> for DeviceObject {
    fn from(value: NativeSwapchain) -> Self {
        DeviceObject::Swapchain(value)
    }
}

impl From<NativeDescriptorSet> for DeviceObject {
    fn from(value: NativeDescriptorSet) -> Self {
        DeviceObject::DescriptorSet(value)
    }
}

impl From<NativeDescriptorSetLayout> for DeviceObject {
    fn from(value: NativeDescriptorSetLayout) -> Self {
        DeviceObject::DescriptorSetLayout(value)
    }
}

impl From<NativeCommandBuffer> for DeviceObject {
    fn from(value: NativeCommandBuffer) -> Self {
        DeviceObject::CommandBuffer(value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "device_object_tests.rs"]
mod tests;
