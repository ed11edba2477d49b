/// Render module - renderer-level resource wrappers (buffers, textures,
/// attachments, framebuffers, render passes, swap chains, pipelines) and
/// the renderer facade

// Module declarations
pub mod types;
pub mod attachment;
pub mod buffer;
pub mod texture;
pub mod pipeline;
pub mod framebuffer;
pub mod render_pass;
pub mod swapchain;
pub mod renderer;

// Re-export the render surface
pub use types::*;
pub use attachment::*;
pub use buffer::*;
pub use texture::*;
pub use pipeline::*;
pub use framebuffer::*;
pub use render_pass::*;
pub use swapchain::*;
pub use renderer::*;
