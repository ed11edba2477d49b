//! Framebuffer - an ordered list of attachments realized into one native
//! framebuffer
//!
//! Attachment insertion order is load-bearing: it is the attachment index
//! order used when building the native framebuffer AND the order of the
//! clear-value array handed to the render-pass-begin call, which matches
//! clear values to attachments positionally. Reordering one without the
//! other is a correctness bug, so both derive from the same list here.

use crate::error::{Error, Result};
use crate::device::device_object::DeviceObject;
use crate::device::handles::{NativeFramebuffer, NativeRenderPass, RawHandle, NULL_HANDLE};
use crate::device::native_device::NativeDevice;
use super::attachment::SharedAttachment;
use super::types::ClearValue;

/// Ordered set of attachments plus the device object for the native
/// framebuffer built over them
#[derive(Debug, Default)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    attachments: Vec<SharedAttachment>,
    device_object: DeviceObject,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            attachments: Vec::new(),
            device_object: DeviceObject::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Append an attachment; its index is fixed by insertion order
    pub fn add_attachment(&mut self, attachment: SharedAttachment) {
        self.attachments.push(attachment);
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    pub fn attachments(&self) -> &[SharedAttachment] {
        &self.attachments
    }

    /// Clear values in attachment-insertion order
    pub fn clear_values(&self) -> Vec<ClearValue> {
        self.attachments
            .iter()
            .map(|attachment| attachment.lock().unwrap().clear_value())
            .collect()
    }

    /// Realize every attachment, then the native framebuffer over their
    /// views (in insertion order)
    ///
    /// Attachments already realized (the shared depth attachment after its
    /// first framebuffer) are left untouched. If an attachment adopted a
    /// swap-chain image view, that view becomes owned by this framebuffer's
    /// device object and is destroyed with it.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if no attachments were added; otherwise whatever
    /// native creation reported.
    pub fn create(
        &mut self,
        device: &dyn NativeDevice,
        render_pass: NativeRenderPass,
    ) -> Result<()> {
        if self.attachments.is_empty() {
            return Err(Error::InvalidOperation(
                "framebuffer created with no attachments".to_string(),
            ));
        }

        let mut views: Vec<RawHandle> = Vec::with_capacity(self.attachments.len());
        let mut owned_view = NULL_HANDLE;
        for attachment in &self.attachments {
            let mut attachment = attachment.lock().unwrap();
            let view = attachment.realize(device)?;
            if attachment.is_external() && owned_view == NULL_HANDLE {
                owned_view = view;
            }
            views.push(view);
        }

        let framebuffer = device.create_framebuffer(render_pass, &views, self.width, self.height)?;
        self.device_object.basify(NativeFramebuffer {
            framebuffer,
            view: owned_view,
        });
        Ok(())
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
#[path = "framebuffer_tests.rs"]
mod tests;
