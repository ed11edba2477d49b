//! SwapChainBase - the presentable surface, its per-image framebuffers,
//! and the shared depth attachment
//!
//! Teardown order is the critical invariant here: wait for the device to go
//! idle, destroy the shared depth attachment's native resources, destroy
//! every framebuffer's native resources in framebuffer order, then destroy
//! the swap chain itself. The GPU must have finished with a resource before
//! it is destroyed, and the device must still be alive for every destroy
//! call.

use crate::engine_trace;
use crate::error::Result;
use crate::device::device_object::DeviceObject;
use crate::device::handles::RawHandle;
use crate::device::native_device::NativeDevice;
use crate::device::visitors::{DestroyVisitor, RenderPassExtractor};
use super::attachment::{Attachable, Attachment, SharedAttachment};
use super::framebuffer::Framebuffer;
use super::render_pass::RenderPass;
use super::types::{ClearValue, Format, ImageLayout, ImageUsage};

/// Depth format used for every swap chain's shared depth attachment
pub const SWAPCHAIN_DEPTH_FORMAT: Format = Format::D32_SFLOAT;

/// Swap chain plus everything built per swap-chain image
#[derive(Debug)]
pub struct SwapchainBase {
    device_object: DeviceObject,
    format: Format,
    width: u32,
    height: u32,
    /// Views over the swap-chain-owned images, in image order; consumed
    /// when framebuffers are built
    image_views: Vec<RawHandle>,
    depth_attachment: SharedAttachment,
    framebuffers: Vec<Framebuffer>,
}

impl SwapchainBase {
    /// Create the native swap chain and the (unrealized) shared depth
    /// attachment sized to the granted extent
    ///
    /// # Errors
    ///
    /// `Unsupported` when the surface cannot present; otherwise whatever
    /// native creation reported.
    pub fn new(device: &dyn NativeDevice, width: u32, height: u32) -> Result<Self> {
        let created = device.create_swapchain(width, height)?;
        engine_trace!(
            "pulsar3d::SwapchainBase",
            "Swap chain created: {}x{}, {:?}, {} images",
            created.width,
            created.height,
            created.format,
            created.image_views.len()
        );

        let depth_attachment =
            Attachment::shared_depth(created.width, created.height, SWAPCHAIN_DEPTH_FORMAT);

        let mut device_object = DeviceObject::default();
        device_object.basify(created.swapchain);

        Ok(Self {
            device_object,
            format: created.format,
            width: created.width,
            height: created.height,
            image_views: created.image_views,
            depth_attachment,
            framebuffers: Vec::new(),
        })
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn image_count(&self) -> usize {
        self.image_views.len()
    }

    pub fn depth_attachment(&self) -> &SharedAttachment {
        &self.depth_attachment
    }

    pub fn framebuffers(&self) -> &[Framebuffer] {
        &self.framebuffers
    }

    pub fn framebuffer(&self, image_index: u32) -> Option<&Framebuffer> {
        self.framebuffers.get(image_index as usize)
    }

    pub fn device_object(&self) -> &DeviceObject {
        &self.device_object
    }

    /// Build one framebuffer per swap-chain image over the realized render
    /// pass: the image's color view at attachment 0, the shared depth
    /// attachment at attachment 1 (matching the attachment order of
    /// render passes built for this swap chain)
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the render pass has not been realized;
    /// otherwise whatever native creation reported.
    pub fn build_framebuffers(
        &mut self,
        device: &dyn NativeDevice,
        render_pass: &RenderPass,
        clear_color: ClearValue,
    ) -> Result<()> {
        let native_render_pass = RenderPassExtractor::extract(render_pass.device_object())?;

        self.framebuffers.clear();
        for view in &self.image_views {
            let color = Attachment::from_external_view(
                Attachable::new(self.width, self.height, self.format, ImageUsage::COLOR_ATTACHMENT),
                clear_color,
                *view,
                ImageLayout::PresentSrc,
            );

            let mut framebuffer = Framebuffer::new(self.width, self.height);
            framebuffer.add_attachment(std::sync::Arc::new(std::sync::Mutex::new(color)));
            framebuffer.add_attachment(self.depth_attachment.clone());
            framebuffer.create(device, native_render_pass)?;
            self.framebuffers.push(framebuffer);
        }
        Ok(())
    }

    /// Tear down every native resource owned by this swap chain, in the
    /// only safe order
    ///
    /// # Errors
    ///
    /// The first failing native call; teardown stops there.
    pub fn destroy(&mut self, device: &dyn NativeDevice) -> Result<()> {
        device.wait_idle()?;

        {
            let mut depth = self.depth_attachment.lock().unwrap();
            if !depth.device_object().is_empty() {
                DestroyVisitor::destroy(device, depth.device_object_mut())?;
            }
        }

        for framebuffer in &mut self.framebuffers {
            if !framebuffer.device_object().is_empty() {
                DestroyVisitor::destroy(device, framebuffer.device_object_mut())?;
            }
        }
        self.framebuffers.clear();
        self.image_views.clear();

        if !self.device_object.is_empty() {
            DestroyVisitor::destroy(device, &mut self.device_object)?;
        }
        engine_trace!("pulsar3d::SwapchainBase", "Swap chain destroyed");
        Ok(())
    }

    /// Tear down and rebuild after a resize or an out-of-date report
    ///
    /// # Errors
    ///
    /// Teardown or recreation failures; on failure the swap chain is left
    /// destroyed.
    pub fn recreate(
        &mut self,
        device: &dyn NativeDevice,
        width: u32,
        height: u32,
        render_pass: &RenderPass,
        clear_color: ClearValue,
    ) -> Result<()> {
        self.destroy(device)?;
        *self = SwapchainBase::new(device, width, height)?;
        self.build_framebuffers(device, render_pass, clear_color)?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "swapchain_tests.rs"]
mod tests;
