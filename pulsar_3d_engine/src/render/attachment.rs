//! Attachable / Attachment - descriptions of image-view-backed render
//! targets
//!
//! `Attachable` is the base description (extent, format, usage) of anything
//! that can back an image view. `Attachment` adds the clear value and the
//! layouts the render pass transitions through, plus the device object that
//! ends up owning the native image once the attachment is realized.
//!
//! Swap-chain color attachments are a special case: their images belong to
//! the native swap chain and only a view is handed in from outside, so
//! realization is skipped and the view is adopted as-is.

use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::device::device_object::DeviceObject;
use crate::device::handles::RawHandle;
use crate::device::native_device::{NativeDevice, RenderPassAttachmentDesc};
use crate::device::visitors::ImageExtractor;
use super::types::{ClearValue, Format, ImageLayout, ImageUsage};

/// Shared handle to an attachment (the depth attachment is shared across
/// all of a swap chain's framebuffers)
pub type SharedAttachment = Arc<Mutex<Attachment>>;

/// Base description of anything that can back an image view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachable {
    pub width: u32,
    pub height: u32,
    pub format: Format,
    pub usage: ImageUsage,
}

impl Attachable {
    pub fn new(width: u32, height: u32, format: Format, usage: ImageUsage) -> Self {
        Self {
            width,
            height,
            format,
            usage,
        }
    }
}

/// One render target: an attachable plus clear value, layouts, and the
/// device object owning the realized native image
#[derive(Debug)]
pub struct Attachment {
    attachable: Attachable,
    clear_value: ClearValue,
    initial_layout: ImageLayout,
    final_layout: ImageLayout,
    /// View handed in from outside (swap-chain-owned image); realization
    /// is skipped when set
    external_view: Option<RawHandle>,
    device_object: DeviceObject,
}

impl Attachment {
    /// Attachment backed by an image this attachment will own
    pub fn new(
        attachable: Attachable,
        clear_value: ClearValue,
        initial_layout: ImageLayout,
        final_layout: ImageLayout,
    ) -> Self {
        Self {
            attachable,
            clear_value,
            initial_layout,
            final_layout,
            external_view: None,
            device_object: DeviceObject::default(),
        }
    }

    /// Attachment over a swap-chain-owned image view
    pub fn from_external_view(
        attachable: Attachable,
        clear_value: ClearValue,
        view: RawHandle,
        final_layout: ImageLayout,
    ) -> Self {
        Self {
            attachable,
            clear_value,
            initial_layout: ImageLayout::Undefined,
            final_layout,
            external_view: Some(view),
            device_object: DeviceObject::default(),
        }
    }

    /// Shared depth attachment with the conventional depth clear (1.0 / 0)
    pub fn shared_depth(width: u32, height: u32, format: Format) -> SharedAttachment {
        Arc::new(Mutex::new(Attachment::new(
            Attachable::new(width, height, format, ImageUsage::DEPTH_STENCIL_ATTACHMENT),
            ClearValue::DepthStencil {
                depth: 1.0,
                stencil: 0,
            },
            ImageLayout::Undefined,
            ImageLayout::DepthStencilAttachment,
        )))
    }

    pub fn attachable(&self) -> &Attachable {
        &self.attachable
    }

    pub fn format(&self) -> Format {
        self.attachable.format
    }

    pub fn clear_value(&self) -> ClearValue {
        self.clear_value
    }

    pub fn initial_layout(&self) -> ImageLayout {
        self.initial_layout
    }

    pub fn final_layout(&self) -> ImageLayout {
        self.final_layout
    }

    pub fn is_external(&self) -> bool {
        self.external_view.is_some()
    }

    /// Whether the native backing already exists (external view adopted or
    /// image realized)
    pub fn is_realized(&self) -> bool {
        self.external_view.is_some() || !self.device_object.is_empty()
    }

    /// The attachment description consumed by render pass creation
    pub fn render_pass_desc(&self) -> RenderPassAttachmentDesc {
        RenderPassAttachmentDesc {
            format: self.attachable.format,
            initial_layout: self.initial_layout,
            final_layout: self.final_layout,
        }
    }

    /// Realize the native backing and return the view to build a
    /// framebuffer over
    ///
    /// External-view attachments return the adopted view untouched.
    /// Already-realized attachments (the shared depth attachment after its
    /// first framebuffer) return the existing view. Otherwise: allocate a
    /// device-local image, transition it straight from Undefined to its
    /// working layout (depth attachments to DepthStencilAttachment, color
    /// attachments to ShaderReadOnly - color targets double as sampled
    /// textures), create a view with the matching aspect, and store the
    /// image/memory/view triple in this attachment's device object.
    ///
    /// # Errors
    ///
    /// Whatever the native image/view creation reported.
    pub fn realize(&mut self, device: &dyn NativeDevice) -> Result<RawHandle> {
        if let Some(view) = self.external_view {
            return Ok(view);
        }
        if !self.device_object.is_empty() {
            return Ok(ImageExtractor::extract(&self.device_object)?.view);
        }

        let format = self.attachable.format;
        let mut image = device.create_image(
            self.attachable.width,
            self.attachable.height,
            format,
            self.attachable.usage,
        )?;

        let target_layout = if format.is_depth() {
            ImageLayout::DepthStencilAttachment
        } else {
            ImageLayout::ShaderReadOnly
        };
        device.transition_image_layout(&image, format, ImageLayout::Undefined, target_layout)?;

        image.view = device.create_image_view(&image, format)?;
        let view = image.view;
        self.device_object.basify(image);
        Ok(view)
    }

    /// The realized view handle
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the attachment has not been realized.
    pub fn view(&self) -> Result<RawHandle> {
        if let Some(view) = self.external_view {
            return Ok(view);
        }
        Ok(ImageExtractor::extract(&self.device_object)?.view)
    }

    pub fn device_object(&self) -> &DeviceObject {
        &self.device_object
    }

    pub fn device_object_mut(&mut self) -> &mut DeviceObject {
        &mut self.device_object
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "attachment_tests.rs"]
mod tests;
