//! Unit tests for engine-to-Vulkan conversion functions
//!
//! Pure conversions, no GPU required.

use super::*;

// ============================================================================
// FORMAT CONVERSION TESTS
// ============================================================================

#[test]
fn test_format_to_vk_color_formats() {
    assert_eq!(format_to_vk(Format::R8G8B8A8_UNORM), vk::Format::R8G8B8A8_UNORM);
    assert_eq!(format_to_vk(Format::B8G8R8A8_UNORM), vk::Format::B8G8R8A8_UNORM);
    assert_eq!(format_to_vk(Format::B8G8R8A8_SRGB), vk::Format::B8G8R8A8_SRGB);
}

#[test]
fn test_format_to_vk_vertex_formats() {
    assert_eq!(format_to_vk(Format::R32G32_SFLOAT), vk::Format::R32G32_SFLOAT);
    assert_eq!(format_to_vk(Format::R32G32B32_SFLOAT), vk::Format::R32G32B32_SFLOAT);
    assert_eq!(
        format_to_vk(Format::R32G32B32A32_SFLOAT),
        vk::Format::R32G32B32A32_SFLOAT
    );
}

#[test]
fn test_format_to_vk_depth_formats() {
    assert_eq!(format_to_vk(Format::D32_SFLOAT), vk::Format::D32_SFLOAT);
    assert_eq!(
        format_to_vk(Format::D24_UNORM_S8_UINT),
        vk::Format::D24_UNORM_S8_UINT
    );
}

#[test]
fn test_vk_format_round_trip_for_surface_formats() {
    for format in [
        Format::R8G8B8A8_UNORM,
        Format::B8G8R8A8_UNORM,
        Format::B8G8R8A8_SRGB,
    ] {
        assert_eq!(vk_format_to_format(format_to_vk(format)), format);
    }
}

#[test]
fn test_vk_format_to_format_unknown_falls_back() {
    assert_eq!(
        vk_format_to_format(vk::Format::R16G16B16A16_SFLOAT),
        Format::B8G8R8A8_SRGB
    );
}

// ============================================================================
// LAYOUT AND ASPECT TESTS
// ============================================================================

#[test]
fn test_layout_to_vk() {
    assert_eq!(layout_to_vk(ImageLayout::Undefined), vk::ImageLayout::UNDEFINED);
    assert_eq!(
        layout_to_vk(ImageLayout::ColorAttachment),
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL
    );
    assert_eq!(
        layout_to_vk(ImageLayout::DepthStencilAttachment),
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    );
    assert_eq!(
        layout_to_vk(ImageLayout::ShaderReadOnly),
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL
    );
    assert_eq!(
        layout_to_vk(ImageLayout::TransferSrc),
        vk::ImageLayout::TRANSFER_SRC_OPTIMAL
    );
    assert_eq!(
        layout_to_vk(ImageLayout::TransferDst),
        vk::ImageLayout::TRANSFER_DST_OPTIMAL
    );
    assert_eq!(layout_to_vk(ImageLayout::PresentSrc), vk::ImageLayout::PRESENT_SRC_KHR);
}

#[test]
fn test_aspect_mask_for_depth_formats() {
    assert_eq!(aspect_mask_for(Format::D32_SFLOAT), vk::ImageAspectFlags::DEPTH);
    assert_eq!(
        aspect_mask_for(Format::D24_UNORM_S8_UINT),
        vk::ImageAspectFlags::DEPTH | vk::ImageAspectFlags::STENCIL
    );
}

#[test]
fn test_aspect_mask_for_color_formats() {
    assert_eq!(aspect_mask_for(Format::B8G8R8A8_SRGB), vk::ImageAspectFlags::COLOR);
    assert_eq!(aspect_mask_for(Format::R8G8B8A8_UNORM), vk::ImageAspectFlags::COLOR);
}

// ============================================================================
// FLAG CONVERSION TESTS
// ============================================================================

#[test]
fn test_buffer_usage_to_vk_single_flags() {
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::VERTEX),
        vk::BufferUsageFlags::VERTEX_BUFFER
    );
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::INDEX),
        vk::BufferUsageFlags::INDEX_BUFFER
    );
    assert_eq!(
        buffer_usage_to_vk(BufferUsage::UNIFORM),
        vk::BufferUsageFlags::UNIFORM_BUFFER
    );
}

#[test]
fn test_buffer_usage_to_vk_combined_flags() {
    let flags = buffer_usage_to_vk(BufferUsage::VERTEX | BufferUsage::TRANSFER_DST);
    assert!(flags.contains(vk::BufferUsageFlags::VERTEX_BUFFER));
    assert!(flags.contains(vk::BufferUsageFlags::TRANSFER_DST));
    assert!(!flags.contains(vk::BufferUsageFlags::INDEX_BUFFER));
}

#[test]
fn test_image_usage_to_vk() {
    let flags = image_usage_to_vk(ImageUsage::SAMPLED | ImageUsage::TRANSFER_DST);
    assert!(flags.contains(vk::ImageUsageFlags::SAMPLED));
    assert!(flags.contains(vk::ImageUsageFlags::TRANSFER_DST));
    assert!(!flags.contains(vk::ImageUsageFlags::COLOR_ATTACHMENT));

    assert_eq!(
        image_usage_to_vk(ImageUsage::DEPTH_STENCIL_ATTACHMENT),
        vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
    );
}

#[test]
fn test_command_buffer_usage_to_vk() {
    assert_eq!(
        command_buffer_usage_to_vk(CommandBufferUsage::ONE_TIME_SUBMIT),
        vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT
    );
    assert_eq!(
        command_buffer_usage_to_vk(CommandBufferUsage::SIMULTANEOUS_USE),
        vk::CommandBufferUsageFlags::SIMULTANEOUS_USE
    );
}

#[test]
fn test_stage_mask_to_vk() {
    let flags = stage_mask_to_vk(
        StageMask::COLOR_ATTACHMENT_OUTPUT | StageMask::EARLY_FRAGMENT_TESTS,
    );
    assert!(flags.contains(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT));
    assert!(flags.contains(vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS));
    assert!(!flags.contains(vk::PipelineStageFlags::FRAGMENT_SHADER));
}

#[test]
fn test_access_mask_to_vk() {
    let flags = access_mask_to_vk(
        AccessMask::COLOR_ATTACHMENT_WRITE | AccessMask::DEPTH_STENCIL_ATTACHMENT_WRITE,
    );
    assert!(flags.contains(vk::AccessFlags::COLOR_ATTACHMENT_WRITE));
    assert!(flags.contains(vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE));
    assert_eq!(access_mask_to_vk(AccessMask::empty()), vk::AccessFlags::empty());
}

// ============================================================================
// MISC CONVERSION TESTS
// ============================================================================

#[test]
fn test_index_type_to_vk() {
    assert_eq!(index_type_to_vk(IndexType::U16), vk::IndexType::UINT16);
    assert_eq!(index_type_to_vk(IndexType::U32), vk::IndexType::UINT32);
}

#[test]
fn test_descriptor_type_to_vk() {
    assert_eq!(
        descriptor_type_to_vk(DescriptorType::CombinedImageSampler),
        vk::DescriptorType::COMBINED_IMAGE_SAMPLER
    );
    assert_eq!(
        descriptor_type_to_vk(DescriptorType::UniformBuffer),
        vk::DescriptorType::UNIFORM_BUFFER
    );
}

#[test]
fn test_choose_surface_format_prefers_srgb_bgra() {
    let formats = [
        vk::SurfaceFormatKHR {
            format: vk::Format::R8G8B8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
        vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
    ];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::B8G8R8A8_SRGB);
    assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
}

#[test]
fn test_choose_surface_format_falls_back_to_first() {
    let formats = [
        vk::SurfaceFormatKHR {
            format: vk::Format::R8G8B8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
        vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
    ];
    assert_eq!(
        choose_surface_format(&formats).unwrap().format,
        vk::Format::R8G8B8A8_UNORM
    );
}

#[test]
fn test_choose_surface_format_empty_is_none() {
    assert!(choose_surface_format(&[]).is_none());
}

#[test]
fn test_clear_value_to_vk_color() {
    let clear = clear_value_to_vk(ClearValue::Color([0.1, 0.2, 0.3, 1.0]));
    unsafe {
        assert_eq!(clear.color.float32, [0.1, 0.2, 0.3, 1.0]);
    }
}

#[test]
fn test_clear_value_to_vk_depth_stencil() {
    let clear = clear_value_to_vk(ClearValue::DepthStencil { depth: 1.0, stencil: 0 });
    unsafe {
        assert_eq!(clear.depth_stencil.depth, 1.0);
        assert_eq!(clear.depth_stencil.stencil, 0);
    }
}
