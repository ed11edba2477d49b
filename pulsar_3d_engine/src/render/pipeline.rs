//! Pipeline - renderer-level wrapper for a graphics pipeline and the
//! objects created alongside it

use crate::device::device_object::DeviceObject;
use crate::device::native_device::{DescriptorType, VertexAttribute};

/// Everything the renderer needs to build a graphics pipeline
///
/// Shader bytecode is SPIR-V handed through opaquely from the asset layer;
/// the core performs no reflection. Descriptor bindings get binding
/// indices in declaration order.
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    pub vertex_bytecode: Vec<u8>,
    pub fragment_bytecode: Vec<u8>,
    pub vertex_stride: u32,
    pub attributes: Vec<VertexAttribute>,
    pub descriptor_bindings: Vec<DescriptorType>,
}

/// A realized graphics pipeline
///
/// Owns the pipeline device object plus the shader modules and optional
/// descriptor set layout created for it; all of them need explicit
/// destruction through the renderer.
#[derive(Debug, Default)]
pub struct Pipeline {
    device_object: DeviceObject,
    vertex_module_object: DeviceObject,
    fragment_module_object: DeviceObject,
    set_layout_object: DeviceObject,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn device_object(&self) -> &DeviceObject {
        &self.device_object
    }

    pub fn device_object_mut(&mut self) -> &mut DeviceObject {
        &mut self.device_object
    }

    pub fn vertex_module_object(&self) -> &DeviceObject {
        &self.vertex_module_object
    }

    pub fn vertex_module_object_mut(&mut self) -> &mut DeviceObject {
        &mut self.vertex_module_object
    }

    pub fn fragment_module_object(&self) -> &DeviceObject {
        &self.fragment_module_object
    }

    pub fn fragment_module_object_mut(&mut self) -> &mut DeviceObject {
        &mut self.fragment_module_object
    }

    /// Empty when the pipeline was built without descriptor bindings
    pub fn set_layout_object(&self) -> &DeviceObject {
        &self.set_layout_object
    }

    pub fn set_layout_object_mut(&mut self) -> &mut DeviceObject {
        &mut self.set_layout_object
    }
}
