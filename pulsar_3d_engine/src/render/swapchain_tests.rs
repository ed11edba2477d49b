//! Unit tests for swap chain construction and teardown ordering

use crate::device::mock_native_device::MockNativeDevice;
use crate::device::native_device::RenderPassAttachmentDesc;
use crate::device::visitors::FramebufferExtractor;
use crate::render::render_pass::{AttachmentType, RenderPass, Subpass};
use crate::render::swapchain::SwapchainBase;
use crate::render::types::{ClearValue, Format, ImageLayout};

fn realized_render_pass(device: &MockNativeDevice, format: Format) -> RenderPass {
    let mut render_pass = RenderPass::new();
    render_pass.add_attachment(RenderPassAttachmentDesc {
        format,
        initial_layout: ImageLayout::Undefined,
        final_layout: ImageLayout::PresentSrc,
    });
    render_pass.add_attachment(RenderPassAttachmentDesc {
        format: Format::D32_SFLOAT,
        initial_layout: ImageLayout::Undefined,
        final_layout: ImageLayout::DepthStencilAttachment,
    });
    let mut subpass = Subpass::new();
    subpass.add_reference(0, AttachmentType::Color);
    subpass.add_reference(1, AttachmentType::DepthStencil);
    render_pass.add_subpass(subpass);
    render_pass.create(device).unwrap();
    render_pass
}

const CLEAR: ClearValue = ClearValue::Color([0.0, 0.0, 0.0, 1.0]);

#[test]
fn test_new_reports_granted_extent_and_images() {
    let device = MockNativeDevice::new();
    let swapchain = SwapchainBase::new(&device, 800, 600).unwrap();

    assert_eq!(swapchain.width(), 800);
    assert_eq!(swapchain.height(), 600);
    assert_eq!(swapchain.image_count(), 3);
    assert!(!swapchain.device_object().is_empty());
    assert!(!swapchain.depth_attachment().lock().unwrap().is_realized());
}

#[test]
fn test_build_framebuffers_one_per_image_color_then_depth() {
    let device = MockNativeDevice::new();
    let mut swapchain = SwapchainBase::new(&device, 800, 600).unwrap();
    let render_pass = realized_render_pass(&device, swapchain.format());

    swapchain
        .build_framebuffers(&device, &render_pass, CLEAR)
        .unwrap();

    assert_eq!(swapchain.framebuffers().len(), 3);
    for framebuffer in swapchain.framebuffers() {
        assert_eq!(framebuffer.attachment_count(), 2);
        assert_eq!(
            framebuffer.clear_values(),
            vec![CLEAR, ClearValue::DepthStencil { depth: 1.0, stencil: 0 }]
        );
    }
    // One depth image for all three framebuffers
    assert_eq!(device.call_count("create_image("), 1);
    assert_eq!(device.call_count("create_framebuffer"), 3);
}

#[test]
fn test_destroy_order_idle_depth_framebuffers_swapchain() {
    let device = MockNativeDevice::new();
    let mut swapchain = SwapchainBase::new(&device, 800, 600).unwrap();
    let render_pass = realized_render_pass(&device, swapchain.format());
    swapchain
        .build_framebuffers(&device, &render_pass, CLEAR)
        .unwrap();

    let framebuffer_handles: Vec<u64> = swapchain
        .framebuffers()
        .iter()
        .map(|fb| {
            FramebufferExtractor::extract(fb.device_object())
                .unwrap()
                .framebuffer
        })
        .collect();

    device.clear_calls();
    swapchain.destroy(&device).unwrap();

    let calls = device.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0], "wait_idle");
    assert!(calls[1].starts_with("destroy_image("));
    for (i, handle) in framebuffer_handles.iter().enumerate() {
        assert_eq!(calls[2 + i], format!("destroy_framebuffer({handle})"));
    }
    assert!(calls[5].starts_with("destroy_swapchain("));
    assert!(swapchain.device_object().is_empty());
}

#[test]
fn test_destroy_before_framebuffers_only_waits_and_drops_swapchain() {
    let device = MockNativeDevice::new();
    let mut swapchain = SwapchainBase::new(&device, 800, 600).unwrap();

    device.clear_calls();
    swapchain.destroy(&device).unwrap();

    let calls = device.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], "wait_idle");
    assert!(calls[1].starts_with("destroy_swapchain("));
}

#[test]
fn test_recreate_rebuilds_at_new_extent() {
    let device = MockNativeDevice::new();
    let mut swapchain = SwapchainBase::new(&device, 800, 600).unwrap();
    let render_pass = realized_render_pass(&device, swapchain.format());
    swapchain
        .build_framebuffers(&device, &render_pass, CLEAR)
        .unwrap();

    swapchain
        .recreate(&device, 1024, 768, &render_pass, CLEAR)
        .unwrap();

    assert_eq!(swapchain.width(), 1024);
    assert_eq!(swapchain.height(), 768);
    assert_eq!(swapchain.framebuffers().len(), 3);
    // Old swap chain fully torn down before the new one exists
    assert_eq!(device.call_count("destroy_swapchain"), 1);
    assert_eq!(device.call_count("create_swapchain"), 2);
}
