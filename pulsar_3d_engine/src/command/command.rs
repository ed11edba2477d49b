//! Command - the type-erased, replayable unit of GPU command-buffer work
//!
//! A `Command` holds exactly one catalog payload: an immutable value
//! capturing the arguments of one native operation, with every native
//! handle snapshotted when the payload was constructed. Commands are
//! appended to a `CommandList` during recording and executed exactly once,
//! in list order, against one native command buffer; the list is cleared
//! after submission, so no command outlives its frame.

use crate::error::Result;
use crate::device::device_object::DeviceObject;
use crate::device::native_device::NativeDevice;
use crate::device::visitors::CommandBufferExtractor;
use super::catalog::{
    BeginCommandBuffer, EndCommandBuffer, BeginRenderPass, EndRenderPass,
    BindPipeline, BindVertexBuffers, BindIndexBuffer, BindDescriptorSets,
    DrawIndexed, SetViewport, SetScissor,
};

/// One recorded GPU operation (move-only, payload frozen at construction)
#[derive(Debug, PartialEq)]
pub enum Command {
    Begin(BeginCommandBuffer),
    End(EndCommandBuffer),
    BeginRenderPass(BeginRenderPass),
    EndRenderPass(EndRenderPass),
    BindPipeline(BindPipeline),
    BindVertexBuffers(BindVertexBuffers),
    BindIndexBuffer(BindIndexBuffer),
    BindDescriptorSets(BindDescriptorSets),
    DrawIndexed(DrawIndexed),
    SetViewport(SetViewport),
    SetScissor(SetScissor),
}

impl Command {
    /// Record this command into the native command buffer held by
    /// `command_buffer_object`
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if `command_buffer_object` does not hold a
    /// command-buffer payload; otherwise whatever the native call reported.
    pub fn execute(
        &self,
        device: &dyn NativeDevice,
        command_buffer_object: &DeviceObject,
    ) -> Result<()> {
        let cmd = CommandBufferExtractor::extract(command_buffer_object)?;
        match self {
            Command::Begin(payload) => payload.on_execute(device, cmd),
            Command::End(payload) => payload.on_execute(device, cmd),
            Command::BeginRenderPass(payload) => payload.on_execute(device, cmd),
            Command::EndRenderPass(payload) => payload.on_execute(device, cmd),
            Command::BindPipeline(payload) => payload.on_execute(device, cmd),
            Command::BindVertexBuffers(payload) => payload.on_execute(device, cmd),
            Command::BindIndexBuffer(payload) => payload.on_execute(device, cmd),
            Command::BindDescriptorSets(payload) => payload.on_execute(device, cmd),
            Command::DrawIndexed(payload) => payload.on_execute(device, cmd),
            Command::SetViewport(payload) => payload.on_execute(device, cmd),
            Command::SetScissor(payload) => payload.on_execute(device, cmd),
        }
    }

    /// Human-readable operation name (trace/debug only, never control flow)
    pub fn description(&self) -> &'static str {
        match self {
            Command::Begin(_) => "BeginCommandBuffer",
            Command::End(_) => "EndCommandBuffer",
            Command::BeginRenderPass(_) => "BeginRenderPass",
            Command::EndRenderPass(_) => "EndRenderPass",
            Command::BindPipeline(_) => "BindPipeline",
            Command::BindVertexBuffers(_) => "BindVertexBuffers",
            Command::BindIndexBuffer(_) => "BindIndexBuffer",
            Command::BindDescriptorSets(_) => "BindDescriptorSets",
            Command::DrawIndexed(_) => "DrawIndexed",
            Command::SetViewport(_) => "SetViewport",
            Command::SetScissor(_) => "SetScissor",
        }
    }
}

// From impls so payloads can be recorded without naming the variant

impl From<BeginCommandBuffer> for Command {
    fn from(payload: BeginCommandBuffer) -> Self {
        Command::Begin(payload)
    }
}

impl From<EndCommandBuffer> for Command {
    fn from(payload: EndCommandBuffer) -> Self {
        Command::End(payload)
    }
}

impl From<BeginRenderPass> for Command {
    fn from(payload: BeginRenderPass) -> Self {
        Command::BeginRenderPass(payload)
    }
}

impl From<EndRenderPass> for Command {
    fn from(payload: EndRenderPass) -> Self {
        Command::EndRenderPass(payload)
    }
}

impl From<BindPipeline> for Command {
    fn from(payload: BindPipeline) -> Self {
        Command::BindPipeline(payload)
    }
}

impl From<BindVertexBuffers> for Command {
    fn from(payload: BindVertexBuffers) -> Self {
        Command::BindVertexBuffers(payload)
    }
}

impl From<BindIndexBuffer> for Command {
    fn from(payload: BindIndexBuffer) -> Self {
        Command::BindIndexBuffer(payload)
    }
}

impl From<BindDescriptorSets> for Command {
    fn from(payload: BindDescriptorSets) -> Self {
        Command::BindDescriptorSets(payload)
    }
}

impl From<DrawIndexed> for Command {
    fn from(payload: DrawIndexed) -> Self {
        Command::DrawIndexed(payload)
    }
}

impl From<SetViewport> for Command {
    fn from(payload: SetViewport) -> Self {
        Command::SetViewport(payload)
    }
}

impl From<SetScissor> for Command {
    fn from(payload: SetScissor) -> Self {
        Command::SetScissor(payload)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
