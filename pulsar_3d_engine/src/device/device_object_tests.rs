//! Unit tests for the type-erased device object container

use crate::device::device_object::DeviceObject;
use crate::device::handles::{NativeBuffer, NativeImage, NativeSwapchain};
use crate::device::visitors::CountVisitor;
use crate::error::Error;

#[test]
fn test_default_is_empty() {
    let object = DeviceObject::default();
    assert!(object.is_empty());
    assert_eq!(object.kind_name(), "Empty");
}

#[test]
fn test_basify_stores_payload() {
    let mut object = DeviceObject::default();
    object.basify(NativeBuffer { buffer: 1, memory: 2 });
    assert!(!object.is_empty());
    assert_eq!(object.kind_name(), "Buffer");
    assert_eq!(object, DeviceObject::Buffer(NativeBuffer { buffer: 1, memory: 2 }));
}

#[test]
fn test_basify_replaces_previous_payload() {
    let mut object = DeviceObject::default();
    object.basify(NativeBuffer { buffer: 1, memory: 2 });
    object.basify(NativeImage { image: 3, memory: 4, view: 5 });
    assert_eq!(object.kind_name(), "Image");
}

#[test]
fn test_take_moves_payload_out() {
    let mut object = DeviceObject::default();
    object.basify(NativeSwapchain { swapchain: 9, surface: 10 });

    let taken = object.take();
    assert_eq!(taken.kind_name(), "Swapchain");
    assert!(object.is_empty());
}

#[test]
fn test_visiting_empty_object_fails() {
    let object = DeviceObject::default();
    let mut visitor = CountVisitor::new();
    let result = object.accept(&mut visitor);
    assert!(matches!(result, Err(Error::InvalidOperation(_))));
    assert_eq!(visitor.total(), 0);
}

#[test]
fn test_visiting_taken_object_fails() {
    let mut object = DeviceObject::default();
    object.basify(NativeBuffer::default());
    let _ = object.take();

    let mut visitor = CountVisitor::new();
    assert!(object.accept(&mut visitor).is_err());
}

#[test]
fn test_accept_dispatches_to_matching_branch() {
    let mut object = DeviceObject::default();
    object.basify(NativeImage { image: 7, memory: 8, view: 9 });

    let mut visitor = CountVisitor::new();
    object.accept(&mut visitor).unwrap();
    assert_eq!(visitor.images, 1);
    assert_eq!(visitor.total(), 1);
}

#[test]
fn test_accept_dispatches_exactly_once() {
    let mut object = DeviceObject::default();
    object.basify(NativeBuffer::default());

    let mut visitor = CountVisitor::new();
    object.accept(&mut visitor).unwrap();
    object.accept(&mut visitor).unwrap();
    assert_eq!(visitor.buffers, 2);
    assert_eq!(visitor.total(), 2);
}
