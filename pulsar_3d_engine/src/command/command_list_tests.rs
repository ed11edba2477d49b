//! Unit tests for FIFO command list replay

use crate::command::catalog::{
    BeginCommandBuffer, BindIndexBuffer, BindPipeline, DrawIndexed, EndCommandBuffer,
};
use crate::command::command_list::CommandList;
use crate::device::device_object::DeviceObject;
use crate::device::handles::{NativeBuffer, NativeCommandBuffer, NativePipeline};
use crate::device::mock_native_device::MockNativeDevice;
use crate::render::types::CommandBufferUsage;

fn command_buffer_object(handle: u64) -> DeviceObject {
    let mut object = DeviceObject::default();
    object.basify(NativeCommandBuffer { command_buffer: handle });
    object
}

#[test]
fn test_replay_preserves_record_order() {
    let device = MockNativeDevice::new();
    let cmd = command_buffer_object(5);

    let mut pipeline_object = DeviceObject::default();
    pipeline_object.basify(NativePipeline { pipeline: 10, layout: 11 });
    let mut index_object = DeviceObject::default();
    index_object.basify(NativeBuffer { buffer: 20, memory: 21 });

    let mut list = CommandList::new();
    list.record(BeginCommandBuffer::new(CommandBufferUsage::ONE_TIME_SUBMIT));
    list.record(BindPipeline::new(&pipeline_object).unwrap());
    list.record(BindIndexBuffer::new(&index_object, 2).unwrap());
    list.record(DrawIndexed::new(6, 0, 0));
    list.record(EndCommandBuffer::new());
    assert_eq!(list.len(), 5);

    list.replay(&device, &cmd).unwrap();

    assert_eq!(
        device.calls(),
        vec![
            "cmd_begin(5, CommandBufferUsage(ONE_TIME_SUBMIT))".to_string(),
            "cmd_bind_pipeline(5, 10)".to_string(),
            "cmd_bind_index_buffer(5, 20, U16)".to_string(),
            "cmd_draw_indexed(5, 6, 0, 0)".to_string(),
            "cmd_end(5)".to_string(),
        ]
    );
}

#[test]
fn test_replay_uses_construction_time_handles() {
    let device = MockNativeDevice::new();
    let cmd = command_buffer_object(5);

    let mut pipeline_object = DeviceObject::default();
    pipeline_object.basify(NativePipeline { pipeline: 10, layout: 11 });

    let mut list = CommandList::new();
    list.record(BindPipeline::new(&pipeline_object).unwrap());

    // Swap the payload after recording; the list must still replay the
    // handles that were alive when it was built.
    pipeline_object.basify(NativePipeline { pipeline: 77, layout: 78 });
    list.replay(&device, &cmd).unwrap();

    assert_eq!(device.calls(), vec!["cmd_bind_pipeline(5, 10)".to_string()]);
}

#[test]
fn test_replay_empty_list_is_a_no_op() {
    let device = MockNativeDevice::new();
    let cmd = command_buffer_object(5);

    let list = CommandList::new();
    list.replay(&device, &cmd).unwrap();
    assert!(device.calls().is_empty());
}

#[test]
fn test_replay_against_wrong_object_records_nothing() {
    let device = MockNativeDevice::new();
    let mut not_a_command_buffer = DeviceObject::default();
    not_a_command_buffer.basify(NativeBuffer::default());

    let mut list = CommandList::new();
    list.record(DrawIndexed::new(3, 0, 0));

    assert!(list.replay(&device, &not_a_command_buffer).is_err());
    assert!(device.calls().is_empty());
}

#[test]
fn test_clear_drops_all_commands() {
    let mut list = CommandList::new();
    list.record(DrawIndexed::new(3, 0, 0));
    list.record(EndCommandBuffer::new());
    assert!(!list.is_empty());

    list.clear();
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
}

#[test]
fn test_descriptions_follow_record_order() {
    let mut list = CommandList::new();
    list.record(BeginCommandBuffer::new(CommandBufferUsage::ONE_TIME_SUBMIT));
    list.record(DrawIndexed::new(3, 0, 0));
    list.record(EndCommandBuffer::new());

    assert_eq!(
        list.descriptions(),
        vec!["BeginCommandBuffer", "DrawIndexed", "EndCommandBuffer"]
    );
}
