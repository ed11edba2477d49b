//! Buffer - renderer-level wrapper for a GPU buffer stream

use crate::device::device_object::DeviceObject;
use super::types::{BufferUsage, MemoryLocation};

/// What a buffer stream feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
    Uniform,
}

impl BufferKind {
    /// The native usage bits for this kind (transfer-dst is added by the
    /// renderer for device-local buffers, which are filled via staging)
    pub fn usage(&self) -> BufferUsage {
        match self {
            BufferKind::Vertex => BufferUsage::VERTEX,
            BufferKind::Index => BufferUsage::INDEX,
            BufferKind::Uniform => BufferUsage::UNIFORM,
        }
    }
}

/// One typed GPU buffer stream
///
/// Device-local buffers are written once at creation through a staging
/// buffer and are immutable afterwards; host-visible buffers support
/// mapping for per-frame updates. The element stride also selects the
/// index width when the stream is bound as an index buffer (2-byte stride
/// reads 16-bit indices).
#[derive(Debug)]
pub struct Buffer {
    kind: BufferKind,
    stride: u32,
    element_count: u32,
    location: MemoryLocation,
    device_object: DeviceObject,
}

impl Buffer {
    pub fn new(kind: BufferKind, stride: u32, element_count: u32, location: MemoryLocation) -> Self {
        Self {
            kind,
            stride,
            element_count,
            location,
            device_object: DeviceObject::default(),
        }
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn element_count(&self) -> u32 {
        self.element_count
    }

    pub fn location(&self) -> MemoryLocation {
        self.location
    }

    pub fn size_bytes(&self) -> u64 {
        u64::from(self.stride) * u64::from(self.element_count)
    }

    pub fn device_object(&self) -> &DeviceObject {
        &self.device_object
    }

    pub fn device_object_mut(&mut self) -> &mut DeviceObject {
        &mut self.device_object
    }
}
