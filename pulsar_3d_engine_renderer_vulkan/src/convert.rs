/// Conversions from engine value types to their Vulkan equivalents
///
/// Every function here is pure; keeping them out of the device code makes
/// them testable without a GPU.

use pulsar_3d_engine::pulsar3d::device::DescriptorType;
use pulsar_3d_engine::pulsar3d::render::{
    AccessMask, BufferUsage, ClearValue, CommandBufferUsage, Format,
    ImageLayout, ImageUsage, IndexType, StageMask,
};
use ash::vk;

/// Convert an engine pixel format to a Vulkan format
pub(crate) fn format_to_vk(format: Format) -> vk::Format {
    match format {
        Format::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        Format::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        Format::B8G8R8A8_SRGB => vk::Format::B8G8R8A8_SRGB,
        Format::R32G32_SFLOAT => vk::Format::R32G32_SFLOAT,
        Format::R32G32B32_SFLOAT => vk::Format::R32G32B32_SFLOAT,
        Format::R32G32B32A32_SFLOAT => vk::Format::R32G32B32A32_SFLOAT,
        Format::D32_SFLOAT => vk::Format::D32_SFLOAT,
        Format::D24_UNORM_S8_UINT => vk::Format::D24_UNORM_S8_UINT,
    }
}

/// Convert a Vulkan surface format back to an engine format
///
/// Surfaces only ever report color formats; anything unexpected falls back
/// to B8G8R8A8_SRGB.
pub(crate) fn vk_format_to_format(format: vk::Format) -> Format {
    match format {
        vk::Format::R8G8B8A8_UNORM => Format::R8G8B8A8_UNORM,
        vk::Format::B8G8R8A8_UNORM => Format::B8G8R8A8_UNORM,
        vk::Format::B8G8R8A8_SRGB => Format::B8G8R8A8_SRGB,
        _ => Format::B8G8R8A8_SRGB,
    }
}

/// Convert an engine image layout to a Vulkan image layout
pub(crate) fn layout_to_vk(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::ColorAttachment => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthStencilAttachment => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        ImageLayout::ShaderReadOnly => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ImageLayout::TransferSrc => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        ImageLayout::TransferDst => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

/// Aspect mask matching a format: depth formats get DEPTH (plus STENCIL
/// when the format carries one), everything else COLOR
pub(crate) fn aspect_mask_for(format: Format) -> vk::ImageAspectFlags {
    match format {
        Format::D32_SFLOAT => vk::ImageAspectFlags::DEPTH,
        Format::D24_UNORM_S8_UINT => {
            vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
        }
        _ => vk::ImageAspectFlags::COLOR,
    }
}

/// Convert engine buffer usage flags to Vulkan buffer usage flags
pub(crate) fn buffer_usage_to_vk(usage: BufferUsage) -> vk::BufferUsageFlags {
    let mut flags = vk::BufferUsageFlags::empty();
    if usage.contains(BufferUsage::VERTEX) {
        flags |= vk::BufferUsageFlags::VERTEX_BUFFER;
    }
    if usage.contains(BufferUsage::INDEX) {
        flags |= vk::BufferUsageFlags::INDEX_BUFFER;
    }
    if usage.contains(BufferUsage::UNIFORM) {
        flags |= vk::BufferUsageFlags::UNIFORM_BUFFER;
    }
    if usage.contains(BufferUsage::TRANSFER_SRC) {
        flags |= vk::BufferUsageFlags::TRANSFER_SRC;
    }
    if usage.contains(BufferUsage::TRANSFER_DST) {
        flags |= vk::BufferUsageFlags::TRANSFER_DST;
    }
    flags
}

/// Convert engine image usage flags to Vulkan image usage flags
pub(crate) fn image_usage_to_vk(usage: ImageUsage) -> vk::ImageUsageFlags {
    let mut flags = vk::ImageUsageFlags::empty();
    if usage.contains(ImageUsage::COLOR_ATTACHMENT) {
        flags |= vk::ImageUsageFlags::COLOR_ATTACHMENT;
    }
    if usage.contains(ImageUsage::DEPTH_STENCIL_ATTACHMENT) {
        flags |= vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT;
    }
    if usage.contains(ImageUsage::SAMPLED) {
        flags |= vk::ImageUsageFlags::SAMPLED;
    }
    if usage.contains(ImageUsage::TRANSFER_DST) {
        flags |= vk::ImageUsageFlags::TRANSFER_DST;
    }
    flags
}

/// Convert engine command buffer usage flags to Vulkan usage flags
pub(crate) fn command_buffer_usage_to_vk(usage: CommandBufferUsage) -> vk::CommandBufferUsageFlags {
    let mut flags = vk::CommandBufferUsageFlags::empty();
    if usage.contains(CommandBufferUsage::ONE_TIME_SUBMIT) {
        flags |= vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT;
    }
    if usage.contains(CommandBufferUsage::SIMULTANEOUS_USE) {
        flags |= vk::CommandBufferUsageFlags::SIMULTANEOUS_USE;
    }
    flags
}

/// Convert engine pipeline stage flags to Vulkan pipeline stage flags
pub(crate) fn stage_mask_to_vk(mask: StageMask) -> vk::PipelineStageFlags {
    let mut flags = vk::PipelineStageFlags::empty();
    if mask.contains(StageMask::COLOR_ATTACHMENT_OUTPUT) {
        flags |= vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT;
    }
    if mask.contains(StageMask::EARLY_FRAGMENT_TESTS) {
        flags |= vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS;
    }
    if mask.contains(StageMask::FRAGMENT_SHADER) {
        flags |= vk::PipelineStageFlags::FRAGMENT_SHADER;
    }
    if mask.contains(StageMask::BOTTOM_OF_PIPE) {
        flags |= vk::PipelineStageFlags::BOTTOM_OF_PIPE;
    }
    flags
}

/// Convert engine access flags to Vulkan access flags
pub(crate) fn access_mask_to_vk(mask: AccessMask) -> vk::AccessFlags {
    let mut flags = vk::AccessFlags::empty();
    if mask.contains(AccessMask::COLOR_ATTACHMENT_WRITE) {
        flags |= vk::AccessFlags::COLOR_ATTACHMENT_WRITE;
    }
    if mask.contains(AccessMask::DEPTH_STENCIL_ATTACHMENT_WRITE) {
        flags |= vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE;
    }
    if mask.contains(AccessMask::SHADER_READ) {
        flags |= vk::AccessFlags::SHADER_READ;
    }
    if mask.contains(AccessMask::MEMORY_READ) {
        flags |= vk::AccessFlags::MEMORY_READ;
    }
    flags
}

/// Convert an engine index element width to a Vulkan index type
pub(crate) fn index_type_to_vk(index_type: IndexType) -> vk::IndexType {
    match index_type {
        IndexType::U16 => vk::IndexType::UINT16,
        IndexType::U32 => vk::IndexType::UINT32,
    }
}

/// Convert an engine descriptor binding type to a Vulkan descriptor type
pub(crate) fn descriptor_type_to_vk(descriptor_type: DescriptorType) -> vk::DescriptorType {
    match descriptor_type {
        DescriptorType::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        DescriptorType::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
    }
}

/// Pick the surface format to render to: B8G8R8A8_SRGB with a non-linear
/// sRGB color space when offered, otherwise the first reported format
///
/// `None` when the surface reports no formats at all.
pub(crate) fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|f| {
            f.format == vk::Format::B8G8R8A8_SRGB
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first())
        .copied()
}

/// Convert an engine clear value to a Vulkan clear value
pub(crate) fn clear_value_to_vk(clear: ClearValue) -> vk::ClearValue {
    match clear {
        ClearValue::Color(rgba) => vk::ClearValue {
            color: vk::ClearColorValue { float32: rgba },
        },
        ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth, stencil },
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
