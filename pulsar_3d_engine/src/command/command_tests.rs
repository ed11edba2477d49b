//! Unit tests for Command construction-time snapshotting and execution

use crate::command::catalog::{
    BeginCommandBuffer, BindIndexBuffer, BindPipeline, BindVertexBuffers, DrawIndexed,
};
use crate::command::command::Command;
use crate::device::device_object::DeviceObject;
use crate::device::handles::{NativeBuffer, NativeCommandBuffer, NativeImage, NativePipeline};
use crate::device::mock_native_device::MockNativeDevice;
use crate::error::Error;
use crate::render::types::CommandBufferUsage;

fn command_buffer_object(handle: u64) -> DeviceObject {
    let mut object = DeviceObject::default();
    object.basify(NativeCommandBuffer { command_buffer: handle });
    object
}

#[test]
fn test_execute_extracts_command_buffer_handle() {
    let device = MockNativeDevice::new();
    let cmd = command_buffer_object(77);

    let command: Command = BeginCommandBuffer::new(CommandBufferUsage::ONE_TIME_SUBMIT).into();
    command.execute(&device, &cmd).unwrap();

    assert_eq!(device.call_count("cmd_begin(77"), 1);
}

#[test]
fn test_execute_against_non_command_buffer_object_fails() {
    let device = MockNativeDevice::new();
    let mut not_a_command_buffer = DeviceObject::default();
    not_a_command_buffer.basify(NativeBuffer { buffer: 1, memory: 2 });

    let command: Command = DrawIndexed::new(6, 0, 0).into();
    let result = command.execute(&device, &not_a_command_buffer);

    assert!(matches!(result, Err(Error::InvalidOperation(_))));
    assert!(device.calls().is_empty());
}

#[test]
fn test_execute_against_empty_object_fails() {
    let device = MockNativeDevice::new();
    let empty = DeviceObject::default();

    let command: Command = DrawIndexed::new(6, 0, 0).into();
    assert!(command.execute(&device, &empty).is_err());
}

#[test]
fn test_bind_pipeline_snapshots_handle_at_construction() {
    let device = MockNativeDevice::new();
    let cmd = command_buffer_object(1);

    let mut pipeline_object = DeviceObject::default();
    pipeline_object.basify(NativePipeline { pipeline: 10, layout: 11 });
    let command: Command = BindPipeline::new(&pipeline_object).unwrap().into();

    // Mutating the source object after construction must not retarget the
    // already-recorded command.
    pipeline_object.basify(NativePipeline { pipeline: 99, layout: 98 });

    command.execute(&device, &cmd).unwrap();
    assert_eq!(device.calls(), vec!["cmd_bind_pipeline(1, 10)".to_string()]);
}

#[test]
fn test_bind_pipeline_requires_pipeline_payload() {
    let mut image_object = DeviceObject::default();
    image_object.basify(NativeImage::default());
    assert!(BindPipeline::new(&image_object).is_err());
}

#[test]
fn test_bind_vertex_buffers_snapshots_every_stream() {
    let device = MockNativeDevice::new();
    let cmd = command_buffer_object(1);

    let mut a = DeviceObject::default();
    a.basify(NativeBuffer { buffer: 20, memory: 21 });
    let mut b = DeviceObject::default();
    b.basify(NativeBuffer { buffer: 30, memory: 31 });

    let command: Command = BindVertexBuffers::new(&[&a, &b]).unwrap().into();
    let _ = a.take();
    let _ = b.take();

    command.execute(&device, &cmd).unwrap();
    assert_eq!(
        device.calls(),
        vec!["cmd_bind_vertex_buffers(1, [20, 30])".to_string()]
    );
}

#[test]
fn test_bind_vertex_buffers_rejects_non_buffer_stream() {
    let mut buffer = DeviceObject::default();
    buffer.basify(NativeBuffer::default());
    let mut image = DeviceObject::default();
    image.basify(NativeImage::default());

    assert!(BindVertexBuffers::new(&[&buffer, &image]).is_err());
}

#[test]
fn test_index_width_chosen_by_element_stride() {
    let device = MockNativeDevice::new();
    let cmd = command_buffer_object(1);

    let mut buffer = DeviceObject::default();
    buffer.basify(NativeBuffer { buffer: 40, memory: 41 });

    let narrow: Command = BindIndexBuffer::new(&buffer, 2).unwrap().into();
    let wide: Command = BindIndexBuffer::new(&buffer, 4).unwrap().into();
    narrow.execute(&device, &cmd).unwrap();
    wide.execute(&device, &cmd).unwrap();

    assert_eq!(
        device.calls(),
        vec![
            "cmd_bind_index_buffer(1, 40, U16)".to_string(),
            "cmd_bind_index_buffer(1, 40, U32)".to_string(),
        ]
    );
}

#[test]
fn test_descriptions_name_the_operation() {
    let draw: Command = DrawIndexed::new(3, 0, 0).into();
    let begin: Command = BeginCommandBuffer::new(CommandBufferUsage::ONE_TIME_SUBMIT).into();
    assert_eq!(draw.description(), "DrawIndexed");
    assert_eq!(begin.description(), "BeginCommandBuffer");
}
