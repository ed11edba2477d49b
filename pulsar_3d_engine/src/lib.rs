/*!
# Pulsar 3D Engine

Core rendering abstractions for the Pulsar 3D engine.

This crate provides the backend-agnostic rendering core: a type-erased
device-object container with exhaustive visitor dispatch, a replayable GPU
command list, the attachment/framebuffer/render-pass model, swap-chain
lifecycle management, and a renderer facade over a swappable native device.
Backend implementations (Vulkan today; any native API exposing the
`NativeDevice` operation set) provide the GPU side.

## Architecture

- **DeviceObject**: type-erased owner of exactly one native GPU resource
- **DeviceObjectVisitor**: the only sanctioned way to read a payload
- **Command / CommandList**: per-frame recorded GPU work, replayed FIFO
- **Attachment / Framebuffer / RenderPass**: the render target model
- **SwapchainBase**: presentable images plus ordered teardown
- **Renderer**: the facade orchestrating all of the above
- **NativeDevice**: the operation set a backend must satisfy
*/

// Internal modules
mod error;
mod engine;
mod config;
pub mod log;
pub mod device;
pub mod command;
pub mod render;

// Main pulsar3d namespace module
pub mod pulsar3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine logging entry points
    pub use crate::engine::Engine;

    // Renderer configuration
    pub use crate::config::Config;

    // Renderer facade
    pub use crate::render::renderer::Renderer;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Device sub-module: handles, device objects, visitors, backend trait
    pub mod device {
        pub use crate::device::*;
    }

    // Command sub-module: command catalog and per-frame list
    pub mod command {
        pub use crate::command::*;
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::render::*;
    }
}

// Re-export math library at crate root
pub use glam;
