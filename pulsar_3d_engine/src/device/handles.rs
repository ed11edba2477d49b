//! Native handle registry
//!
//! Thin per-kind structs grouping the raw native handles needed to use and
//! destroy one GPU resource. Handles are opaque `u64` values: every Vulkan
//! non-dispatchable handle has that representation, and a mock backend can
//! mint them freely for tests. A null handle is `0`.

/// Opaque native handle (backend-defined meaning, `0` = null)
pub type RawHandle = u64;

/// The null native handle
pub const NULL_HANDLE: RawHandle = 0;

/// Buffer handle plus its backing memory allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeBuffer {
    pub buffer: RawHandle,
    pub memory: RawHandle,
}

/// Image handle, backing memory, and the image view created over it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeImage {
    pub image: RawHandle,
    pub memory: RawHandle,
    pub view: RawHandle,
}

/// Pipeline handle plus its pipeline layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativePipeline {
    pub pipeline: RawHandle,
    pub layout: RawHandle,
}

/// Framebuffer handle plus the swap-chain image view it was created over
///
/// Swap-chain images belong to the native swap chain, but the view wrapped
/// around each one is created per framebuffer and torn down with it. `view`
/// is null for framebuffers built purely from attachment-owned views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeFramebuffer {
    pub framebuffer: RawHandle,
    pub view: RawHandle,
}

/// Render pass handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeRenderPass {
    pub render_pass: RawHandle,
}

/// Shader module handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeShaderModule {
    pub module: RawHandle,
}

/// Swap chain handle plus the presentation surface it was created from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeSwapchain {
    pub swapchain: RawHandle,
    pub surface: RawHandle,
}

/// Descriptor set handle (pool-owned, freed with its pool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeDescriptorSet {
    pub set: RawHandle,
}

/// Descriptor set layout handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeDescriptorSetLayout {
    pub layout: RawHandle,
}

/// Command buffer handle (pool-owned)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NativeCommandBuffer {
    pub command_buffer: RawHandle,
}
