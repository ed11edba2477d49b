/// Device module - native handle registry, type-erased device objects,
/// visitor dispatch, and the backend operation set

// Module declarations
pub mod handles;
pub mod device_object;
pub mod visitors;
pub mod native_device;
#[cfg(test)]
pub mod mock_native_device;

// Re-export the device layer surface
pub use handles::*;
pub use device_object::*;
pub use visitors::*;
pub use native_device::*;
