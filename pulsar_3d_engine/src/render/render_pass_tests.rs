//! Unit tests for render pass assembly and subpass reference partitioning

use crate::device::mock_native_device::MockNativeDevice;
use crate::device::native_device::RenderPassAttachmentDesc;
use crate::device::visitors::RenderPassExtractor;
use crate::render::render_pass::{AttachmentType, RenderPass, Subpass};
use crate::render::types::{Format, ImageLayout};

fn color_desc() -> RenderPassAttachmentDesc {
    RenderPassAttachmentDesc {
        format: Format::B8G8R8A8_SRGB,
        initial_layout: ImageLayout::Undefined,
        final_layout: ImageLayout::PresentSrc,
    }
}

fn depth_desc() -> RenderPassAttachmentDesc {
    RenderPassAttachmentDesc {
        format: Format::D32_SFLOAT,
        initial_layout: ImageLayout::Undefined,
        final_layout: ImageLayout::DepthStencilAttachment,
    }
}

#[test]
fn test_partition_distinguishes_missing_depth_from_empty_lists() {
    let mut subpass = Subpass::new();
    subpass.add_reference(0, AttachmentType::Color);
    subpass.add_reference(1, AttachmentType::DepthStencil);

    let description = subpass.partition().unwrap();
    assert_eq!(description.color, vec![0]);
    assert_eq!(description.depth_stencil, Some(1));
    // Zero input/resolve references: empty lists, never None-like markers
    assert!(description.input.is_empty());
    assert!(description.resolve.is_empty());
}

#[test]
fn test_partition_without_depth_yields_none() {
    let mut subpass = Subpass::new();
    subpass.add_reference(0, AttachmentType::Color);

    let description = subpass.partition().unwrap();
    assert_eq!(description.color, vec![0]);
    assert_eq!(description.depth_stencil, None);
}

#[test]
fn test_partition_preserves_declaration_order() {
    let mut subpass = Subpass::new();
    subpass.add_reference(2, AttachmentType::Color);
    subpass.add_reference(0, AttachmentType::Color);
    subpass.add_reference(1, AttachmentType::Input);

    let description = subpass.partition().unwrap();
    assert_eq!(description.color, vec![2, 0]);
    assert_eq!(description.input, vec![1]);
}

#[test]
fn test_partition_rejects_second_depth_reference() {
    let mut subpass = Subpass::new();
    subpass.add_reference(0, AttachmentType::DepthStencil);
    subpass.add_reference(1, AttachmentType::DepthStencil);
    assert!(subpass.partition().is_err());
}

#[test]
fn test_create_requires_an_attachment() {
    let device = MockNativeDevice::new();
    let mut render_pass = RenderPass::new();
    render_pass.add_subpass(Subpass::new());

    assert!(render_pass.create(&device).is_err());
    assert!(device.calls().is_empty());
}

#[test]
fn test_create_requires_a_subpass() {
    let device = MockNativeDevice::new();
    let mut render_pass = RenderPass::new();
    render_pass.add_attachment(color_desc());

    assert!(render_pass.create(&device).is_err());
    assert!(device.calls().is_empty());
}

#[test]
fn test_create_realizes_into_device_object() {
    let device = MockNativeDevice::new();
    let mut render_pass = RenderPass::new();
    render_pass.add_attachment(color_desc());
    render_pass.add_attachment(depth_desc());
    let mut subpass = Subpass::new();
    subpass.add_reference(0, AttachmentType::Color);
    subpass.add_reference(1, AttachmentType::DepthStencil);
    render_pass.add_subpass(subpass);

    render_pass.create(&device).unwrap();

    let native = RenderPassExtractor::extract(render_pass.device_object()).unwrap();
    assert_ne!(native.render_pass, 0);
    assert_eq!(
        device.calls(),
        vec!["create_render_pass(2 attachments, 1 subpasses)".to_string()]
    );
}
