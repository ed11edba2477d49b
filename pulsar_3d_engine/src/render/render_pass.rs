//! RenderPass - ordered attachment/subpass/dependency lists realized into
//! one native render pass

use crate::error::{Error, Result};
use crate::device::device_object::DeviceObject;
use crate::device::native_device::{
    NativeDevice, RenderPassAttachmentDesc, RenderPassDesc, SubpassDependencyDesc,
    SubpassDescription,
};

/// How a subpass uses one attachment reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentType {
    Input,
    Color,
    DepthStencil,
    Resolve,
}

/// One attachment reference inside a subpass (index into the render pass's
/// attachment list)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubpassAttachmentRef {
    pub attachment: u32,
    pub attachment_type: AttachmentType,
}

/// One subpass: the attachment references it declares, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Subpass {
    references: Vec<SubpassAttachmentRef>,
}

impl Subpass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_reference(&mut self, attachment: u32, attachment_type: AttachmentType) {
        self.references.push(SubpassAttachmentRef {
            attachment,
            attachment_type,
        });
    }

    pub fn references(&self) -> &[SubpassAttachmentRef] {
        &self.references
    }

    /// Partition the declared references into the four independent lists
    /// the native API consumes
    ///
    /// "No depth attachment" (None) is distinct from "zero color
    /// attachments" (empty list); the native API represents the former as a
    /// null pointer and the latter as an empty array.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if more than one depth/stencil reference is
    /// declared.
    pub fn partition(&self) -> Result<SubpassDescription> {
        let mut description = SubpassDescription::default();
        for reference in &self.references {
            match reference.attachment_type {
                AttachmentType::Input => description.input.push(reference.attachment),
                AttachmentType::Color => description.color.push(reference.attachment),
                AttachmentType::Resolve => description.resolve.push(reference.attachment),
                AttachmentType::DepthStencil => {
                    if description.depth_stencil.is_some() {
                        return Err(Error::InvalidOperation(
                            "subpass declares more than one depth/stencil attachment".to_string(),
                        ));
                    }
                    description.depth_stencil = Some(reference.attachment);
                }
            }
        }
        Ok(description)
    }
}

/// Render pass under construction, then realized
///
/// Attachments, subpasses, and dependencies are appended during setup;
/// `create` realizes the native render pass once into this object's device
/// object. The active framebuffer index is rebound every frame by the
/// renderer before recording and is not owned here.
#[derive(Debug, Default)]
pub struct RenderPass {
    attachments: Vec<RenderPassAttachmentDesc>,
    subpasses: Vec<Subpass>,
    dependencies: Vec<SubpassDependencyDesc>,
    device_object: DeviceObject,
}

impl RenderPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_attachment(&mut self, attachment: RenderPassAttachmentDesc) {
        self.attachments.push(attachment);
    }

    pub fn add_subpass(&mut self, subpass: Subpass) {
        self.subpasses.push(subpass);
    }

    pub fn add_dependency(&mut self, dependency: SubpassDependencyDesc) {
        self.dependencies.push(dependency);
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    pub fn subpass_count(&self) -> usize {
        self.subpasses.len()
    }

    /// The complete native description this render pass realizes to
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if there is no subpass or no attachment (a
    /// precondition violation by the caller, not a runtime condition), or
    /// if any subpass declares more than one depth/stencil reference.
    pub fn build_desc(&self) -> Result<RenderPassDesc> {
        if self.attachments.is_empty() {
            return Err(Error::InvalidOperation(
                "render pass created with no attachments".to_string(),
            ));
        }
        if self.subpasses.is_empty() {
            return Err(Error::InvalidOperation(
                "render pass created with no subpasses".to_string(),
            ));
        }

        let mut subpasses = Vec::with_capacity(self.subpasses.len());
        for subpass in &self.subpasses {
            subpasses.push(subpass.partition()?);
        }

        Ok(RenderPassDesc {
            attachments: self.attachments.clone(),
            subpasses,
            dependencies: self.dependencies.clone(),
        })
    }

    /// Realize the native render pass into this object's device object
    ///
    /// # Errors
    ///
    /// Precondition failures from `build_desc`, or whatever native creation
    /// reported.
    pub fn create(&mut self, device: &dyn NativeDevice) -> Result<()> {
        let desc = self.build_desc()?;
        let render_pass = device.create_render_pass(&desc)?;
        self.device_object.basify(render_pass);
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
#[path = "render_pass_tests.rs"]
mod tests;
