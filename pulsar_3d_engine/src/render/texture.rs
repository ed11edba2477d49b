//! Texture - a sampled image plus the descriptor set that binds it

use crate::device::device_object::DeviceObject;
use super::types::Format;

/// Sampled 2D texture
///
/// Owns two device objects: the native image (image/memory/view triple)
/// and the descriptor set pointing binding 0 at it. The descriptor set is
/// pool-owned on the native side, so destroying it through the renderer is
/// a no-op; the image must be destroyed explicitly.
#[derive(Debug)]
pub struct Texture {
    width: u32,
    height: u32,
    format: Format,
    image_object: DeviceObject,
    descriptor_set_object: DeviceObject,
}

impl Texture {
    pub fn new(width: u32, height: u32, format: Format) -> Self {
        Self {
            width,
            height,
            format,
            image_object: DeviceObject::default(),
            descriptor_set_object: DeviceObject::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn image_object(&self) -> &DeviceObject {
        &self.image_object
    }

    pub fn image_object_mut(&mut self) -> &mut DeviceObject {
        &mut self.image_object
    }

    pub fn descriptor_set_object(&self) -> &DeviceObject {
        &self.descriptor_set_object
    }

    pub fn descriptor_set_object_mut(&mut self) -> &mut DeviceObject {
        &mut self.descriptor_set_object
    }
}
