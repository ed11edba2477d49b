//! Device object visitors
//!
//! The visitor protocol is the only sanctioned way to read a
//! `DeviceObject`'s payload. Every visitor implements every payload-kind
//! method - there are no default bodies, so adding a new kind to
//! `DeviceObject` without updating every visitor is a compile error. That
//! exhaustiveness is the safety net that replaces runtime type checks.
//!
//! Three visitor families exist:
//! - typed extraction (one per kind): all methods no-ops except the matching
//!   one, which captures the handle value. Extracting the wrong kind leaves
//!   the sentinel `None`, never a wrong-type read.
//! - destruction: each branch issues exactly the native destroy calls for
//!   that kind.
//! - counting: per-kind tallies for diagnostics.

use crate::error::{Error, Result};
use super::handles::{
    NativeBuffer, NativeImage, NativePipeline, NativeFramebuffer, NativeRenderPass,
    NativeShaderModule, NativeSwapchain, NativeDescriptorSet, NativeDescriptorSetLayout,
    NativeCommandBuffer,
};
use super::device_object::DeviceObject;
use super::native_device::NativeDevice;

/// Visitor over every concrete payload kind a `DeviceObject` can hold
///
/// All methods are required: exhaustiveness is enforced by the compiler.
pub trait DeviceObjectVisitor {
    fn visit_buffer(&mut self, buffer: &NativeBuffer);
    fn visit_image(&mut self, image: &NativeImage);
    fn visit_pipeline(&mut self, pipeline: &NativePipeline);
    fn visit_framebuffer(&mut self, framebuffer: &NativeFramebuffer);
    fn visit_render_pass(&mut self, render_pass: &NativeRenderPass);
    fn visit_shader_module(&mut self, module: &NativeShaderModule);
    fn visit_swapchain(&mut self, swapchain: &NativeSwapchain);
    fn visit_descriptor_set(&mut self, set: &NativeDescriptorSet);
    fn visit_descriptor_set_layout(&mut self, layout: &NativeDescriptorSetLayout);
    fn visit_command_buffer(&mut self, command_buffer: &NativeCommandBuffer);
}

// ============================================================================
// Typed extraction visitors
// ============================================================================

/// Defines an extraction visitor: a struct whose only non-no-op branch
/// captures one payload kind, plus an `extract` helper that visits a
/// device object and returns the captured value (or an error if the
/// object held a different kind). The no-op branches are spelled out per
/// invocation so that every extractor still implements the full visitor
/// trait explicitly.
macro_rules! extraction_visitor {
    (
        $name:ident ($kind:literal) captures $handle:ty = $capture:ident;
        ignores { $($noop:ident: $noop_ty:ty),* $(,)? }
    ) => {
        #[derive(Debug, Default)]
        pub struct $name {
            /// The captured handle value; `None` until the matching kind
            /// is visited ("not found" sentinel)
            pub found: Option<$handle>,
        }

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Visit `object` and return the captured handle value
            ///
            /// # Errors
            ///
            /// `InvalidOperation` if the object is empty or holds a
            /// different payload kind.
            pub fn extract(object: &DeviceObject) -> Result<$handle> {
                let mut visitor = Self::new();
                object.accept(&mut visitor)?;
                visitor.found.ok_or_else(|| {
                    Error::InvalidOperation(format!(
                        concat!("expected a ", $kind, " payload, device object holds {}"),
                        object.kind_name()
                    ))
                })
            }
        }

        impl DeviceObjectVisitor for $name {
            fn $capture(&mut self, value: &$handle) {
                self.found = Some(*value);
            }

            $(
                fn $noop(&mut self, _: &$noop_ty) {}
            )*
        }
    };
}

extraction_visitor!(
    BufferExtractor("buffer") captures NativeBuffer = visit_buffer;
    ignores {
        visit_image: NativeImage,
        visit_pipeline: NativePipeline,
        visit_framebuffer: NativeFramebuffer,
        visit_render_pass: NativeRenderPass,
        visit_shader_module: NativeShaderModule,
        visit_swapchain: NativeSwapchain,
        visit_descriptor_set: NativeDescriptorSet,
        visit_descriptor_set_layout: NativeDescriptorSetLayout,
        visit_command_buffer: NativeCommandBuffer,
    }
);

extraction_visitor!(
    ImageExtractor("image") captures NativeImage = visit_image;
    ignores {
        visit_buffer: NativeBuffer,
        visit_pipeline: NativePipeline,
        visit_framebuffer: NativeFramebuffer,
        visit_render_pass: NativeRenderPass,
        visit_shader_module: NativeShaderModule,
        visit_swapchain: NativeSwapchain,
        visit_descriptor_set: NativeDescriptorSet,
        visit_descriptor_set_layout: NativeDescriptorSetLayout,
        visit_command_buffer: NativeCommandBuffer,
    }
);

extraction_visitor!(
    PipelineExtractor("pipeline") captures NativePipeline = visit_pipeline;
    ignores {
        visit_buffer: NativeBuffer,
        visit_image: NativeImage,
        visit_framebuffer: NativeFramebuffer,
        visit_render_pass: NativeRenderPass,
        visit_shader_module: NativeShaderModule,
        visit_swapchain: NativeSwapchain,
        visit_descriptor_set: NativeDescriptorSet,
        visit_descriptor_set_layout: NativeDescriptorSetLayout,
        visit_command_buffer: NativeCommandBuffer,
    }
);

extraction_visitor!(
    FramebufferExtractor("framebuffer") captures NativeFramebuffer = visit_framebuffer;
    ignores {
        visit_buffer: NativeBuffer,
        visit_image: NativeImage,
        visit_pipeline: NativePipeline,
        visit_render_pass: NativeRenderPass,
        visit_shader_module: NativeShaderModule,
        visit_swapchain: NativeSwapchain,
        visit_descriptor_set: NativeDescriptorSet,
        visit_descriptor_set_layout: NativeDescriptorSetLayout,
        visit_command_buffer: NativeCommandBuffer,
    }
);

extraction_visitor!(
    RenderPassExtractor("render pass") captures NativeRenderPass = visit_render_pass;
    ignores {
        visit_buffer: NativeBuffer,
        visit_image: NativeImage,
        visit_pipeline: NativePipeline,
        visit_framebuffer: NativeFramebuffer,
        visit_shader_module: NativeShaderModule,
        visit_swapchain: NativeSwapchain,
        visit_descriptor_set: NativeDescriptorSet,
        visit_descriptor_set_layout: NativeDescriptorSetLayout,
        visit_command_buffer: NativeCommandBuffer,
    }
);

extraction_visitor!(
    ShaderModuleExtractor("shader module") captures NativeShaderModule = visit_shader_module;
    ignores {
        visit_buffer: NativeBuffer,
        visit_image: NativeImage,
        visit_pipeline: NativePipeline,
        visit_framebuffer: NativeFramebuffer,
        visit_render_pass: NativeRenderPass,
        visit_swapchain: NativeSwapchain,
        visit_descriptor_set: NativeDescriptorSet,
        visit_descriptor_set_layout: NativeDescriptorSetLayout,
        visit_command_buffer: NativeCommandBuffer,
    }
);

extraction_visitor!(
    SwapchainExtractor("swap chain") captures NativeSwapchain = visit_swapchain;
    ignores {
        visit_buffer: NativeBuffer,
        visit_image: NativeImage,
        visit_pipeline: NativePipeline,
        visit_framebuffer: NativeFramebuffer,
        visit_render_pass: NativeRenderPass,
        visit_shader_module: NativeShaderModule,
        visit_descriptor_set: NativeDescriptorSet,
        visit_descriptor_set_layout: NativeDescriptorSetLayout,
        visit_command_buffer: NativeCommandBuffer,
    }
);

extraction_visitor!(
    DescriptorSetExtractor("descriptor set") captures NativeDescriptorSet = visit_descriptor_set;
    ignores {
        visit_buffer: NativeBuffer,
        visit_image: NativeImage,
        visit_pipeline: NativePipeline,
        visit_framebuffer: NativeFramebuffer,
        visit_render_pass: NativeRenderPass,
        visit_shader_module: NativeShaderModule,
        visit_swapchain: NativeSwapchain,
        visit_descriptor_set_layout: NativeDescriptorSetLayout,
        visit_command_buffer: NativeCommandBuffer,
    }
);

extraction_visitor!(
    DescriptorSetLayoutExtractor("descriptor set layout")
        captures NativeDescriptorSetLayout = visit_descriptor_set_layout;
    ignores {
        visit_buffer: NativeBuffer,
        visit_image: NativeImage,
        visit_pipeline: NativePipeline,
        visit_framebuffer: NativeFramebuffer,
        visit_render_pass: NativeRenderPass,
        visit_shader_module: NativeShaderModule,
        visit_swapchain: NativeSwapchain,
        visit_descriptor_set: NativeDescriptorSet,
        visit_command_buffer: NativeCommandBuffer,
    }
);

extraction_visitor!(
    CommandBufferExtractor("command buffer") captures NativeCommandBuffer = visit_command_buffer;
    ignores {
        visit_buffer: NativeBuffer,
        visit_image: NativeImage,
        visit_pipeline: NativePipeline,
        visit_framebuffer: NativeFramebuffer,
        visit_render_pass: NativeRenderPass,
        visit_shader_module: NativeShaderModule,
        visit_swapchain: NativeSwapchain,
        visit_descriptor_set: NativeDescriptorSet,
        visit_descriptor_set_layout: NativeDescriptorSetLayout,
    }
);

// ============================================================================
// Destruction visitor
// ============================================================================

/// Issues the matching native destroy call(s) for whatever payload kind the
/// visited device object holds
///
/// Must stay exhaustive: a new payload kind without a destruction branch is
/// a latent resource leak, which is why the visitor trait has no default
/// method bodies. The first destroy error is kept; later branches never run
/// because one visit dispatches exactly once.
pub struct DestroyVisitor<'a> {
    device: &'a dyn NativeDevice,
    result: Result<()>,
}

impl<'a> DestroyVisitor<'a> {
    pub fn new(device: &'a dyn NativeDevice) -> Self {
        Self {
            device,
            result: Ok(()),
        }
    }

    /// Destroy the native resource held by `object` and leave it empty
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the object is empty; otherwise whatever the
    /// native destroy call reported.
    pub fn destroy(device: &'a dyn NativeDevice, object: &mut DeviceObject) -> Result<()> {
        let mut visitor = Self::new(device);
        object.accept(&mut visitor)?;
        *object = DeviceObject::Empty;
        visitor.result
    }
}

impl DeviceObjectVisitor for DestroyVisitor<'_> {
    fn visit_buffer(&mut self, buffer: &NativeBuffer) {
        self.result = self.device.destroy_buffer(*buffer);
    }

    fn visit_image(&mut self, image: &NativeImage) {
        self.result = self.device.destroy_image(*image);
    }

    fn visit_pipeline(&mut self, pipeline: &NativePipeline) {
        self.result = self.device.destroy_pipeline(*pipeline);
    }

    fn visit_framebuffer(&mut self, framebuffer: &NativeFramebuffer) {
        self.result = self.device.destroy_framebuffer(*framebuffer);
    }

    fn visit_render_pass(&mut self, render_pass: &NativeRenderPass) {
        self.result = self.device.destroy_render_pass(*render_pass);
    }

    fn visit_shader_module(&mut self, module: &NativeShaderModule) {
        self.result = self.device.destroy_shader_module(*module);
    }

    fn visit_swapchain(&mut self, swapchain: &NativeSwapchain) {
        self.result = self.device.destroy_swapchain(*swapchain);
    }

    fn visit_descriptor_set(&mut self, _set: &NativeDescriptorSet) {
        // Descriptor sets are pool-owned; freed when the pool is destroyed
        self.result = Ok(());
    }

    fn visit_descriptor_set_layout(&mut self, layout: &NativeDescriptorSetLayout) {
        self.result = self.device.destroy_descriptor_set_layout(*layout);
    }

    fn visit_command_buffer(&mut self, command_buffer: &NativeCommandBuffer) {
        self.result = self.device.free_command_buffer(*command_buffer);
    }
}

// ============================================================================
// Counting visitor
// ============================================================================

/// Accumulates per-kind totals across visited device objects (diagnostics)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CountVisitor {
    pub buffers: u32,
    pub images: u32,
    pub pipelines: u32,
    pub framebuffers: u32,
    pub render_passes: u32,
    pub shader_modules: u32,
    pub swapchains: u32,
    pub descriptor_sets: u32,
    pub descriptor_set_layouts: u32,
    pub command_buffers: u32,
}

impl CountVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total objects counted across all kinds
    pub fn total(&self) -> u32 {
        self.buffers
            + self.images
            + self.pipelines
            + self.framebuffers
            + self.render_passes
            + self.shader_modules
            + self.swapchains
            + self.descriptor_sets
            + self.descriptor_set_layouts
            + self.command_buffers
    }
}

impl DeviceObjectVisitor for CountVisitor {
    fn visit_buffer(&mut self, _buffer: &NativeBuffer) {
        self.buffers += 1;
    }

    fn visit_image(&mut self, _image: &NativeImage) {
        self.images += 1;
    }

    fn visit_pipeline(&mut self, _pipeline: &NativePipeline) {
        self.pipelines += 1;
    }

    fn visit_framebuffer(&mut self, _framebuffer: &NativeFramebuffer) {
        self.framebuffers += 1;
    }

    fn visit_render_pass(&mut self, _render_pass: &NativeRenderPass) {
        self.render_passes += 1;
    }

    fn visit_shader_module(&mut self, _module: &NativeShaderModule) {
        self.shader_modules += 1;
    }

    fn visit_swapchain(&mut self, _swapchain: &NativeSwapchain) {
        self.swapchains += 1;
    }

    fn visit_descriptor_set(&mut self, _set: &NativeDescriptorSet) {
        self.descriptor_sets += 1;
    }

    fn visit_descriptor_set_layout(&mut self, _layout: &NativeDescriptorSetLayout) {
        self.descriptor_set_layouts += 1;
    }

    fn visit_command_buffer(&mut self, _command_buffer: &NativeCommandBuffer) {
        self.command_buffers += 1;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "visitors_tests.rs"]
mod tests;
