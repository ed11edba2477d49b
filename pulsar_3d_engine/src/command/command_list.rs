//! CommandList - the ordered per-frame list of recorded commands
//!
//! Commands are appended during recording and replayed FIFO against one
//! native command buffer at submission. The list is cleared after each
//! frame; commands never survive their frame.

use crate::error::Result;
use crate::device::device_object::DeviceObject;
use crate::device::native_device::NativeDevice;
use super::command::Command;

/// FIFO command list for one frame
#[derive(Debug, Default)]
pub struct CommandList {
    commands: Vec<Command>,
}

impl CommandList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command (any catalog payload converts into `Command`)
    pub fn record<C: Into<Command>>(&mut self, command: C) {
        self.commands.push(command.into());
    }

    /// Execute every recorded command, in record order, against the native
    /// command buffer held by `command_buffer_object`
    ///
    /// Stops at the first failing command.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if `command_buffer_object` holds no command-buffer
    /// payload; otherwise the first native recording error.
    pub fn replay(
        &self,
        device: &dyn NativeDevice,
        command_buffer_object: &DeviceObject,
    ) -> Result<()> {
        for command in &self.commands {
            command.execute(device, command_buffer_object)?;
        }
        Ok(())
    }

    /// Drop all recorded commands (end of frame)
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Descriptions of the recorded commands, in record order (trace only)
    pub fn descriptions(&self) -> Vec<&'static str> {
        self.commands.iter().map(Command::description).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "command_list_tests.rs"]
mod tests;
