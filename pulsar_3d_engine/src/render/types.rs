//! Common rendering value types shared by the device layer and the
//! render model: pixel formats, image layouts, clear values, dynamic
//! state rectangles, and usage/synchronization flags.

use bitflags::bitflags;

/// Pixel format
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    R8G8B8A8_UNORM,
    B8G8R8A8_UNORM,
    B8G8R8A8_SRGB,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,
    D32_SFLOAT,
    D24_UNORM_S8_UINT,
}

impl Format {
    /// Whether this format backs a depth/stencil attachment
    pub fn is_depth(&self) -> bool {
        matches!(self, Format::D32_SFLOAT | Format::D24_UNORM_S8_UINT)
    }

    /// Size of one texel/element in bytes
    pub fn size_bytes(&self) -> u32 {
        match self {
            Format::R8G8B8A8_UNORM | Format::B8G8R8A8_UNORM | Format::B8G8R8A8_SRGB => 4,
            Format::R32G32_SFLOAT => 8,
            Format::R32G32B32_SFLOAT => 12,
            Format::R32G32B32A32_SFLOAT => 16,
            Format::D32_SFLOAT => 4,
            Format::D24_UNORM_S8_UINT => 4,
        }
    }
}

/// Image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    /// Undefined layout (initial state)
    Undefined,
    /// Layout for color attachment
    ColorAttachment,
    /// Layout for depth/stencil attachment
    DepthStencilAttachment,
    /// Layout for shader read-only access
    ShaderReadOnly,
    /// Layout for transfer source
    TransferSrc,
    /// Layout for transfer destination
    TransferDst,
    /// Layout for presenting to swapchain
    PresentSrc,
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// 2D rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Index element width for index buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

/// Where a buffer's memory lives
///
/// DeviceLocal buffers are written once through a staging buffer at creation
/// time and are immutable afterwards. HostVisible buffers support persistent
/// mapping via `map_memory`/`unmap_memory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLocation {
    DeviceLocal,
    HostVisible,
}

bitflags! {
    /// Buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BufferUsage: u32 {
        const VERTEX = 1 << 0;
        const INDEX = 1 << 1;
        const UNIFORM = 1 << 2;
        const TRANSFER_SRC = 1 << 3;
        const TRANSFER_DST = 1 << 4;
    }
}

bitflags! {
    /// Image usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ImageUsage: u32 {
        const COLOR_ATTACHMENT = 1 << 0;
        const DEPTH_STENCIL_ATTACHMENT = 1 << 1;
        const SAMPLED = 1 << 2;
        const TRANSFER_DST = 1 << 3;
    }
}

bitflags! {
    /// Command buffer usage flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandBufferUsage: u32 {
        const ONE_TIME_SUBMIT = 1 << 0;
        const SIMULTANEOUS_USE = 1 << 1;
    }
}

bitflags! {
    /// Pipeline stage mask for subpass dependencies
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StageMask: u32 {
        const COLOR_ATTACHMENT_OUTPUT = 1 << 0;
        const EARLY_FRAGMENT_TESTS = 1 << 1;
        const FRAGMENT_SHADER = 1 << 2;
        const BOTTOM_OF_PIPE = 1 << 3;
    }
}

bitflags! {
    /// Memory access mask for subpass dependencies
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessMask: u32 {
        const COLOR_ATTACHMENT_WRITE = 1 << 0;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 1 << 1;
        const SHADER_READ = 1 << 2;
        const MEMORY_READ = 1 << 3;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
