/*!
# Pulsar 3D Engine - Vulkan Backend

Vulkan implementation of the `NativeDevice` operation set for the Pulsar 3D
rendering engine, built on the Ash bindings.

The backend binds to one window at construction (instance, physical/logical
device, queues, pools) and then satisfies every native operation the
rendering core issues: resource creation/destruction, command recording,
and per-swap-chain frame pacing with a single frame in flight.

```no_run
use pulsar_3d_engine::pulsar3d::{Config, Renderer};
use pulsar_3d_engine_renderer_vulkan::VulkanDevice;

# fn run(window: &winit::window::Window) -> pulsar_3d_engine::pulsar3d::Result<()> {
let device = VulkanDevice::new(window, Config::default())?;
let mut renderer = Renderer::new(Box::new(device), Config::default());
renderer.initialize()?;
# Ok(())
# }
```
*/

// Vulkan implementation modules
mod vulkan;
mod vulkan_device;
mod convert;
mod debug;

pub use vulkan::VulkanDevice;
