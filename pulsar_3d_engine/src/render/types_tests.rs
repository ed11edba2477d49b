//! Unit tests for common rendering value types

use crate::render::types::{Format, BufferUsage, StageMask};

#[test]
fn test_depth_format_classification() {
    assert!(Format::D32_SFLOAT.is_depth());
    assert!(Format::D24_UNORM_S8_UINT.is_depth());
    assert!(!Format::R8G8B8A8_UNORM.is_depth());
    assert!(!Format::B8G8R8A8_UNORM.is_depth());
    assert!(!Format::R32G32B32_SFLOAT.is_depth());
}

#[test]
fn test_format_size_bytes() {
    assert_eq!(Format::R8G8B8A8_UNORM.size_bytes(), 4);
    assert_eq!(Format::B8G8R8A8_SRGB.size_bytes(), 4);
    assert_eq!(Format::R32G32_SFLOAT.size_bytes(), 8);
    assert_eq!(Format::R32G32B32_SFLOAT.size_bytes(), 12);
    assert_eq!(Format::R32G32B32A32_SFLOAT.size_bytes(), 16);
    assert_eq!(Format::D32_SFLOAT.size_bytes(), 4);
}

#[test]
fn test_buffer_usage_flags_combine() {
    let usage = BufferUsage::VERTEX | BufferUsage::TRANSFER_DST;
    assert!(usage.contains(BufferUsage::VERTEX));
    assert!(usage.contains(BufferUsage::TRANSFER_DST));
    assert!(!usage.contains(BufferUsage::INDEX));
}

#[test]
fn test_stage_mask_flags_disjoint() {
    let stages = StageMask::COLOR_ATTACHMENT_OUTPUT | StageMask::EARLY_FRAGMENT_TESTS;
    assert_eq!(stages.bits().count_ones(), 2);
}
